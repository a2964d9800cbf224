use thiserror::Error;

/// Failure taxonomy for client operations.
///
/// Every public operation in this crate returns one of these instead of
/// panicking or leaking transport errors; the UI layer decides how each
/// variant is presented.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The request never reached a server (DNS, connection refused, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The backend rejected the credentials (401). The session store has
    /// already been cleared by the time this is returned.
    #[error("not authenticated: {0}")]
    Auth(String),

    /// A 4xx response; the message is the server's `detail` field verbatim,
    /// or empty when the response carried no JSON detail.
    #[error("{0}")]
    Validation(String),

    /// A 5xx response.
    #[error("server error (status {0})")]
    Server(u16),

    /// A 2xx response whose body could not be decoded.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
