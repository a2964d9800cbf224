use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::debounce::{SearchDebouncer, SearchTicket};
use crate::error::{Result, SyncError};
use crate::http::ApiClient;
use crate::models::{
    LoginRequest, LoginResponse, NewDoctor, NewMapping, NewPatient, RegisterRequest,
};
use crate::notify::{Notifier, Severity};
use crate::repository::{DoctorRepository, MappingRepository, PatientRepository};
use crate::session::{Session, SessionStore};
use crate::view::{self, DashboardCounts, DoctorView, ListView, MappingView, PatientView};

/// Everything the rendering layer needs: the three rendered lists and the
/// dashboard counts. Always a disposable snapshot of backend state, never
/// a source of truth.
#[derive(Debug, Clone)]
pub struct UiState {
    pub patients: ListView<PatientView>,
    pub doctors: ListView<DoctorView>,
    pub mappings: ListView<MappingView>,
    pub counts: DashboardCounts,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            patients: view::patient_views(&[]),
            doctors: view::doctor_views(&[]),
            mappings: view::mapping_views(&[]),
            counts: DashboardCounts::default(),
        }
    }
}

/// What a delete confirmation is about to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Patient(i64),
    Doctor(i64),
    Mapping(i64),
}

impl DeleteTarget {
    fn noun(&self) -> &'static str {
        match self {
            DeleteTarget::Patient(_) => "patient",
            DeleteTarget::Doctor(_) => "doctor",
            DeleteTarget::Mapping(_) => "mapping",
        }
    }
}

/// A delete that has been requested but not sent.
///
/// Nothing crosses the wire until `confirm()` is awaited; dropping the
/// value (or calling `cancel`) sends nothing. This replaces a blocking
/// confirmation dialog with an explicit suspension point the caller
/// controls.
pub struct DeleteConfirmation<'a> {
    app: &'a AdminApp,
    target: DeleteTarget,
}

impl DeleteConfirmation<'_> {
    pub fn target(&self) -> DeleteTarget {
        self.target
    }

    pub fn prompt(&self) -> String {
        match self.target {
            DeleteTarget::Mapping(_) => "Are you sure you want to remove this mapping?".to_string(),
            target => format!("Are you sure you want to delete this {}?", target.noun()),
        }
    }

    pub async fn confirm(self) -> Result<()> {
        self.app.execute_delete(self.target).await
    }

    pub fn cancel(self) {}
}

/// The session/data-synchronization façade.
///
/// Owns the HTTP client, the injected session store, the repositories,
/// the notification channel and the rendered [`UiState`]. All sequencing
/// rules live here: writes are fire-and-confirm (re-fetch after success,
/// previous render untouched on failure), a dashboard refresh replaces
/// counts and lists only once all three concurrent fetches resolve, and
/// stale search responses are discarded by ticket.
pub struct AdminApp {
    api: Arc<ApiClient>,
    store: Arc<dyn SessionStore>,
    pub patients: PatientRepository,
    pub doctors: DoctorRepository,
    pub mappings: MappingRepository,
    pub notifier: Notifier,
    state: RwLock<UiState>,
}

impl AdminApp {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        let api = Arc::new(ApiClient::new(base_url, Arc::clone(&store)));
        Self {
            patients: PatientRepository::new(Arc::clone(&api)),
            doctors: DoctorRepository::new(Arc::clone(&api)),
            mappings: MappingRepository::new(Arc::clone(&api)),
            notifier: Notifier::new(),
            state: RwLock::new(UiState::default()),
            api,
            store,
        }
    }

    /// Snapshot of the rendered state.
    pub fn ui(&self) -> UiState {
        self.state.read().unwrap().clone()
    }

    pub async fn session(&self) -> Option<Session> {
        self.store.current().await
    }

    /// Start-of-run restoration: load the persisted session and validate
    /// it with one authenticated call. Rejection falls back to anonymous
    /// cleanly; an unreachable backend keeps the session for the next
    /// attempt.
    pub async fn bootstrap(&self) {
        let Some(session) = self.store.restore().await else {
            return;
        };
        info!(user = %session.user.email, "restored persisted session");

        match self.patients.list().await {
            Ok(_) => self.refresh_dashboard().await,
            Err(SyncError::Auth(_)) => {
                // the client already cleared the store
                self.reset_ui();
                self.notifier.push("Please login again", Severity::Warning);
            }
            Err(e) => {
                warn!(error = %e, "could not validate restored session");
                self.notifier
                    .push("Network error. Please try again.", Severity::Danger);
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self
            .api
            .post_json::<LoginResponse>("auth/login/", &request, false)
            .await
        {
            Ok(response) => {
                let session = Session {
                    token: response.tokens.access,
                    user: response.user,
                };
                self.store.set(session.clone()).await;
                info!(user = %session.user.email, "login successful");
                self.notifier.push("Login successful!", Severity::Success);
                self.refresh_dashboard().await;
                Ok(session)
            }
            Err(e) => {
                self.notifier
                    .push(failure_message(&e, "Login failed"), Severity::Danger);
                Err(e)
            }
        }
    }

    /// Pre-submission gates only; full field validation stays server-side.
    pub async fn register(&self, form: RegisterRequest) -> Result<()> {
        if form.password != form.password2 {
            self.notifier.push("Passwords do not match", Severity::Danger);
            return Err(SyncError::Validation("Passwords do not match".to_string()));
        }
        if !form.tc {
            self.notifier
                .push("Please accept terms and conditions", Severity::Warning);
            return Err(SyncError::Validation(
                "Terms and conditions must be accepted".to_string(),
            ));
        }

        match self.api.post("auth/register/", &form, false).await {
            Ok(_) => {
                // the backend answers with tokens, but registration grants
                // no session: the user logs in explicitly
                self.notifier
                    .push("Registration successful! Please login.", Severity::Success);
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .push(failure_message(&e, "Registration failed"), Severity::Danger);
                Err(e)
            }
        }
    }

    pub async fn logout(&self) {
        self.store.clear().await;
        self.reset_ui();
        info!("logged out");
    }

    fn reset_ui(&self) {
        *self.state.write().unwrap() = UiState::default();
    }

    /// One dashboard refresh: the three collection fetches run
    /// concurrently and the rendered lists and counts are replaced only
    /// when all of them resolve. A single failure leaves every previously
    /// rendered value untouched.
    pub async fn refresh_dashboard(&self) {
        let (patients, doctors, mappings) = tokio::join!(
            self.patients.list(),
            self.doctors.list(),
            self.mappings.list(),
        );

        match (patients, doctors, mappings) {
            (Ok(patients), Ok(doctors), Ok(mappings)) => {
                let users = usize::from(self.store.current().await.is_some());
                let mut state = self.state.write().unwrap();
                state.counts = DashboardCounts {
                    patients: patients.len(),
                    doctors: doctors.len(),
                    mappings: mappings.len(),
                    users,
                };
                state.patients = view::patient_views(&patients);
                state.doctors = view::doctor_views(&doctors);
                state.mappings = view::mapping_views(&mappings);
            }
            (patients, doctors, mappings) => {
                let error = [patients.err(), doctors.err(), mappings.err()]
                    .into_iter()
                    .flatten()
                    .next()
                    .expect("at least one fetch failed");
                warn!(error = %error, "dashboard refresh failed, keeping previous state");
                self.notifier.push(
                    failure_message(&error, "Failed to refresh dashboard"),
                    Severity::Danger,
                );
            }
        }
    }

    pub async fn add_patient(&self, patient: &NewPatient) -> Result<()> {
        match self.patients.create(patient).await {
            Ok(()) => {
                self.notifier.push("Patient added successfully!", Severity::Success);
                self.refresh_dashboard().await;
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .push(failure_message(&e, "Failed to add patient"), Severity::Danger);
                Err(e)
            }
        }
    }

    pub async fn add_doctor(&self, doctor: &NewDoctor) -> Result<()> {
        match self.doctors.create(doctor).await {
            Ok(()) => {
                self.notifier.push("Doctor added successfully!", Severity::Success);
                self.refresh_dashboard().await;
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .push(failure_message(&e, "Failed to add doctor"), Severity::Danger);
                Err(e)
            }
        }
    }

    pub async fn add_mapping(&self, mapping: &NewMapping) -> Result<()> {
        match self.mappings.create(mapping).await {
            Ok(()) => {
                self.notifier
                    .push("Mapping created successfully!", Severity::Success);
                self.refresh_dashboard().await;
                Ok(())
            }
            Err(e) => {
                self.notifier.push(
                    failure_message(&e, "Failed to create mapping"),
                    Severity::Danger,
                );
                Err(e)
            }
        }
    }

    pub fn delete_patient(&self, id: i64) -> DeleteConfirmation<'_> {
        DeleteConfirmation { app: self, target: DeleteTarget::Patient(id) }
    }

    pub fn delete_doctor(&self, id: i64) -> DeleteConfirmation<'_> {
        DeleteConfirmation { app: self, target: DeleteTarget::Doctor(id) }
    }

    pub fn delete_mapping(&self, id: i64) -> DeleteConfirmation<'_> {
        DeleteConfirmation { app: self, target: DeleteTarget::Mapping(id) }
    }

    async fn execute_delete(&self, target: DeleteTarget) -> Result<()> {
        let result = match target {
            DeleteTarget::Patient(id) => self.patients.delete(id).await,
            DeleteTarget::Doctor(id) => self.doctors.delete(id).await,
            DeleteTarget::Mapping(id) => self.mappings.delete(id).await,
        };

        match result {
            Ok(()) => {
                let message = match target {
                    DeleteTarget::Patient(_) => "Patient deleted successfully!",
                    DeleteTarget::Doctor(_) => "Doctor deleted successfully!",
                    DeleteTarget::Mapping(_) => "Mapping removed successfully!",
                };
                self.notifier.push(message, Severity::Success);
                self.refresh_dashboard().await;
                Ok(())
            }
            Err(e) => {
                let fallback = format!("Failed to delete {}", target.noun());
                self.notifier
                    .push(failure_message(&e, &fallback), Severity::Danger);
                Err(e)
            }
        }
    }

    /// Debounced patient search, wired to replace the rendered patient
    /// list. Stale responses never overwrite newer ones.
    pub fn patient_search(app: &Arc<AdminApp>) -> SearchDebouncer {
        let app = Arc::clone(app);
        SearchDebouncer::new(move |ticket, query| {
            let app = Arc::clone(&app);
            async move { app.run_patient_search(ticket, &query).await }
        })
    }

    /// Debounced doctor search; same timing policy, different repository.
    pub fn doctor_search(app: &Arc<AdminApp>) -> SearchDebouncer {
        let app = Arc::clone(app);
        SearchDebouncer::new(move |ticket, query| {
            let app = Arc::clone(&app);
            async move { app.run_doctor_search(ticket, &query).await }
        })
    }

    pub(crate) async fn run_patient_search(&self, ticket: SearchTicket, query: &str) {
        match self.patients.search(query).await {
            Ok(patients) if ticket.is_latest() => {
                self.state.write().unwrap().patients = view::patient_views(&patients);
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "patient search failed"),
        }
    }

    pub(crate) async fn run_doctor_search(&self, ticket: SearchTicket, query: &str) {
        match self.doctors.search(query).await {
            Ok(doctors) if ticket.is_latest() => {
                self.state.write().unwrap().doctors = view::doctor_views(&doctors);
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "doctor search failed"),
        }
    }
}

/// Translate a typed failure into the message shown to the user: server
/// details verbatim, a generic line for network failures, the caller's
/// fallback otherwise.
fn failure_message(error: &SyncError, fallback: &str) -> String {
    match error {
        SyncError::Network(_) => "Network error. Please try again.".to_string(),
        SyncError::Validation(detail) | SyncError::Auth(detail) if !detail.is_empty() => {
            detail.clone()
        }
        _ => fallback.to_string(),
    }
}
