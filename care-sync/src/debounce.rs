use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Quiet period a query must survive before it is dispatched.
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

type Dispatch = Arc<dyn Fn(SearchTicket, String) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Identifies one dispatched query. A result may only be applied while its
/// ticket is still the latest issued; anything older lost the race to a
/// newer keystroke and must be discarded, not rendered.
#[derive(Clone)]
pub struct SearchTicket {
    seq: u64,
    latest: Arc<AtomicU64>,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_latest(&self) -> bool {
        self.seq == self.latest.load(Ordering::SeqCst)
    }
}

/// Collapses bursts of input events into one dispatch per quiet period.
///
/// Every `input` cancels the previous *pending* invocation and restarts
/// the timer; a dispatch that already started is never cancelled, stale
/// completions are instead filtered through [`SearchTicket::is_latest`].
/// The timing policy is entity-agnostic: construct one per search box and
/// hand it whichever repository call it should drive.
pub struct SearchDebouncer {
    quiet: Duration,
    latest: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
    dispatch: Dispatch,
}

impl SearchDebouncer {
    pub fn new<F, Fut>(dispatch: F) -> Self
    where
        F: Fn(SearchTicket, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::with_quiet_period(QUIET_PERIOD, dispatch)
    }

    pub fn with_quiet_period<F, Fut>(quiet: Duration, dispatch: F) -> Self
    where
        F: Fn(SearchTicket, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let dispatch: Dispatch = Arc::new(move |ticket, query| Box::pin(dispatch(ticket, query)));
        Self {
            quiet,
            latest: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
            dispatch,
        }
    }

    /// Register a keystroke. Restarts the quiet-period timer; only the
    /// last query within an idle window is ever sent.
    pub fn input(&self, query: &str) {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let ticket = SearchTicket {
            seq,
            latest: Arc::clone(&self.latest),
        };
        let quiet = self.quiet;
        let dispatch = Arc::clone(&self.dispatch);
        let query = query.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            // past the quiet period the query counts as sent: detach the
            // dispatch so a later abort can only ever cancel the timer
            tokio::spawn(dispatch(ticket, query));
        });

        if let Some(previous) = self.pending.lock().unwrap().replace(handle) {
            previous.abort();
        }
    }

    /// Sequence number of the most recently accepted input.
    pub fn latest_seq(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Instant, advance, sleep};

    fn recording_debouncer() -> (SearchDebouncer, Arc<Mutex<Vec<(String, Duration)>>>, Instant) {
        let calls: Arc<Mutex<Vec<(String, Duration)>>> = Arc::new(Mutex::new(Vec::new()));
        let started = Instant::now();
        let debouncer = SearchDebouncer::new({
            let calls = Arc::clone(&calls);
            move |_ticket, query| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.lock().unwrap().push((query, started.elapsed()));
                }
            }
        });
        (debouncer, calls, started)
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_collapse_to_one_call_per_quiet_period() {
        let (debouncer, calls, _) = recording_debouncer();

        debouncer.input("j"); // t = 0
        sleep(Duration::from_millis(100)).await;
        debouncer.input("jo"); // t = 100
        sleep(Duration::from_millis(50)).await;
        debouncer.input("joh"); // t = 150
        sleep(Duration::from_millis(470)).await;
        debouncer.input("john"); // t = 620
        sleep(Duration::from_millis(400)).await; // well past the last timer

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ("joh".to_string(), Duration::from_millis(450)));
        assert_eq!(calls[1], ("john".to_string(), Duration::from_millis(920)));
    }

    #[tokio::test(start_paused = true)]
    async fn a_quiet_keystroke_dispatches_exactly_once() {
        let (debouncer, calls, _) = recording_debouncer();

        debouncer.input("maria");
        sleep(Duration::from_millis(1_000)).await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "maria");
        assert_eq!(calls[0].1, Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn tickets_from_superseded_inputs_are_stale() {
        let seen: Arc<Mutex<Vec<SearchTicket>>> = Arc::new(Mutex::new(Vec::new()));
        let debouncer = SearchDebouncer::with_quiet_period(Duration::from_millis(10), {
            let seen = Arc::clone(&seen);
            move |ticket, _query| {
                let seen = Arc::clone(&seen);
                async move {
                    seen.lock().unwrap().push(ticket);
                }
            }
        });

        debouncer.input("slow");
        sleep(Duration::from_millis(50)).await; // first dispatch completes
        debouncer.input("fast");
        sleep(Duration::from_millis(50)).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        // the earlier response may arrive after the newer one was issued;
        // its ticket no longer passes the guard
        assert!(!seen[0].is_latest());
        assert!(seen[1].is_latest());
        assert_eq!(debouncer.latest_seq(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn advancing_exactly_to_the_deadline_fires() {
        let (debouncer, calls, _) = recording_debouncer();

        debouncer.input("ada");
        advance(Duration::from_millis(300)).await;
        // give the detached dispatch a turn
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        assert_eq!(calls.lock().unwrap().len(), 1);
    }
}
