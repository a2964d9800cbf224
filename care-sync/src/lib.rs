pub mod app;
pub mod debounce;
pub mod error;
pub mod http;
pub mod models;
pub mod notify;
pub mod repository;
pub mod session;
pub mod view;

// Re-export commonly used types
pub use app::{AdminApp, DeleteConfirmation, DeleteTarget, UiState};
pub use debounce::{QUIET_PERIOD, SearchDebouncer, SearchTicket};
pub use error::{Result, SyncError};
pub use http::ApiClient;
pub use models::{
    Doctor, Gender, LoginRequest, LoginResponse, Mapping, NewDoctor, NewMapping, NewPatient,
    Patient, RegisterRequest, Specialization, Tokens, User,
};
pub use notify::{DISPLAY_LIFETIME, Notice, Notifier, Severity};
pub use repository::{DoctorRepository, MappingRepository, PatientRepository};
pub use session::{FileSessionStore, InMemorySessionStore, Session, SessionStore};
pub use view::{DashboardCounts, DoctorView, ListView, MappingView, PatientView};
