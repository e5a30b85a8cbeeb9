use tracing::debug;

use crate::error::SyncError;
use crate::event::{Candidate, Event, WorkOrder};

/// Persistence boundary for time entries.
///
/// `submit_event` creates a record when the candidate is new and updates it
/// otherwise. The returned event is canonical: its id may differ from the
/// candidate's.
#[allow(async_fn_in_trait)]
pub trait RemoteSync {
    async fn list_work_orders(&self) -> Result<Vec<WorkOrder>, SyncError>;

    async fn list_events(&self) -> Result<Vec<Event>, SyncError>;

    async fn submit_event(&self, candidate: &Candidate) -> Result<Event, SyncError>;
}

/// Stand-in used when no host integration context was supplied.
#[derive(Debug, Clone)]
pub struct Detached {
    reason: String,
}

impl Detached {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn unavailable(&self, operation: &str) -> SyncError {
        debug!(operation, reason = %self.reason, "remote call skipped; no backend");
        SyncError::HostUnavailable {
            reason: self.reason.clone(),
        }
    }
}

impl Default for Detached {
    fn default() -> Self {
        Self::new("host integration context is not configured")
    }
}

impl RemoteSync for Detached {
    async fn list_work_orders(&self) -> Result<Vec<WorkOrder>, SyncError> {
        Err(self.unavailable("list_work_orders"))
    }

    async fn list_events(&self) -> Result<Vec<Event>, SyncError> {
        Err(self.unavailable("list_events"))
    }

    async fn submit_event(&self, _candidate: &Candidate) -> Result<Event, SyncError> {
        Err(self.unavailable("submit_event"))
    }
}

impl<R> RemoteSync for &R
where
    R: RemoteSync,
{
    async fn list_work_orders(&self) -> Result<Vec<WorkOrder>, SyncError> {
        (**self).list_work_orders().await
    }

    async fn list_events(&self) -> Result<Vec<Event>, SyncError> {
        (**self).list_events().await
    }

    async fn submit_event(&self, candidate: &Candidate) -> Result<Event, SyncError> {
        (**self).submit_event(candidate).await
    }
}
