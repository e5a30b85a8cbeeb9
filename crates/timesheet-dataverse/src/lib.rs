pub mod client;
pub mod query;
pub mod records;

use timesheet_core::{
    Candidate, Config, Detached, Event, RemoteSync, SyncError, WorkOrder,
};
use tracing::{info, warn};

pub use client::{DataverseClient, HostContext};

/// The backend chosen at startup: the Dataverse Web API when the host
/// context is configured, otherwise a detached stand-in.
#[derive(Debug, Clone)]
pub enum Backend {
    Dataverse(DataverseClient),
    Detached(Detached),
}

impl Backend {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        match cfg.host_settings() {
            Some(settings) => {
                let client = DataverseClient::new(&settings)?;
                Ok(Self::Dataverse(client))
            }
            None => {
                warn!("dataverse host context not configured; running detached");
                Ok(Self::Detached(Detached::new(
                    "dataverse.url and dataverse.user_id are not configured",
                )))
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Dataverse(_))
    }
}

impl RemoteSync for Backend {
    async fn list_work_orders(&self) -> Result<Vec<WorkOrder>, SyncError> {
        match self {
            Self::Dataverse(client) => client.list_work_orders().await,
            Self::Detached(detached) => detached.list_work_orders().await,
        }
    }

    async fn list_events(&self) -> Result<Vec<Event>, SyncError> {
        match self {
            Self::Dataverse(client) => client.list_events().await,
            Self::Detached(detached) => detached.list_events().await,
        }
    }

    async fn submit_event(&self, candidate: &Candidate) -> Result<Event, SyncError> {
        info!(id = %candidate.event.id, connected = self.is_connected(), "submitting time entry");
        match self {
            Self::Dataverse(client) => client.submit_event(candidate).await,
            Self::Detached(detached) => detached.submit_event(candidate).await,
        }
    }
}
