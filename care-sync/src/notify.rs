use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// How long a notification stays visible unless dismissed first.
pub const DISPLAY_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
}

/// Transient user-facing messages.
///
/// Each entry is retracted automatically once its lifetime elapses, unless
/// a manual `dismiss` wins the race; either way removal is idempotent.
/// Expiry timers run on the ambient Tokio runtime.
#[derive(Clone)]
pub struct Notifier {
    entries: Arc<DashMap<u64, Notice>>,
    next_id: Arc<AtomicU64>,
    lifetime: Duration,
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_lifetime(DISPLAY_LIFETIME)
    }

    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(0)),
            lifetime,
        }
    }

    /// Show a message. Returns the id a caller can use to dismiss it
    /// before the timer does.
    pub fn push(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.entries.insert(
            id,
            Notice {
                id,
                message: message.into(),
                severity,
            },
        );

        let entries = Arc::clone(&self.entries);
        let lifetime = self.lifetime;
        tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            entries.remove(&id);
        });

        id
    }

    /// Remove a notification. A no-op when the timer (or an earlier
    /// dismiss) already removed it.
    pub fn dismiss(&self, id: u64) {
        self.entries.remove(&id);
    }

    /// Currently visible notifications, most recent first.
    pub fn visible(&self) -> Vec<Notice> {
        let mut notices: Vec<Notice> = self.entries.iter().map(|e| e.value().clone()).collect();
        notices.sort_by(|a, b| b.id.cmp(&a.id));
        notices
    }

    /// Remove and return everything currently visible, most recent first.
    pub fn drain(&self) -> Vec<Notice> {
        let ids: Vec<u64> = self.entries.iter().map(|e| *e.key()).collect();
        let mut notices: Vec<Notice> = ids
            .into_iter()
            .filter_map(|id| self.entries.remove(&id).map(|(_, notice)| notice))
            .collect();
        notices.sort_by(|a, b| b.id.cmp(&a.id));
        notices
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn notifications_expire_after_their_lifetime() {
        let notifier = Notifier::new();
        notifier.push("Login successful!", Severity::Success);
        assert_eq!(notifier.visible().len(), 1);

        tokio::time::sleep(Duration::from_millis(4_999)).await;
        assert_eq!(notifier.visible().len(), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(notifier.visible().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_dismissal_races_the_timer_safely() {
        let notifier = Notifier::new();
        let id = notifier.push("Saved", Severity::Info);

        notifier.dismiss(id);
        assert!(notifier.visible().is_empty());

        // double dismissal is a no-op
        notifier.dismiss(id);

        // the timer firing afterwards must not mind the entry being gone
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(notifier.visible().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_expiry_then_dismissal_is_a_no_op() {
        let notifier = Notifier::new();
        let id = notifier.push("Saved", Severity::Info);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(notifier.visible().is_empty());

        notifier.dismiss(id);
        assert!(notifier.visible().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn newest_notifications_come_first() {
        let notifier = Notifier::new();
        notifier.push("first", Severity::Info);
        notifier.push("second", Severity::Warning);
        notifier.push("third", Severity::Danger);

        let messages: Vec<String> = notifier.visible().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["third", "second", "first"]);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_empties_the_channel() {
        let notifier = Notifier::new();
        notifier.push("first", Severity::Info);
        notifier.push("second", Severity::Success);

        let drained = notifier.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "second");
        assert!(notifier.visible().is_empty());
    }
}
