use thiserror::Error;

/// Failures crossing the remote boundary. None of them are fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("no backend available: {reason}")]
    HostUnavailable { reason: String },

    #[error("{operation} failed: {message}")]
    RequestFailed { operation: String, message: String },

    #[error("{operation} returned an unreadable response: {message}")]
    InvalidResponse { operation: String, message: String },
}

impl SyncError {
    pub fn request_failed(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::RequestFailed {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_response(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidResponse {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn is_host_unavailable(&self) -> bool {
        matches!(self, Self::HostUnavailable { .. })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("nothing is selected; pick a time range or an entry first")]
    NothingSelected,

    #[error("the time entry dialog is not open")]
    ModalNotOpen,

    #[error(transparent)]
    Sync(#[from] SyncError),
}
