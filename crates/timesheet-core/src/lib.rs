pub mod adapter;
pub mod config;
pub mod driver;
pub mod error;
pub mod event;
pub mod form;
pub mod logging;
pub mod modal;
pub mod picker;
pub mod remote;
pub mod selection;
pub mod session;
pub mod sidebar;
pub mod store;

use std::path::Path;

pub use adapter::{
  CalendarAdapter,
  CalendarNavigator,
  CalendarWidget,
  ViewMode
};
pub use config::{
  Config,
  HostSettings
};
pub use error::{
  SessionError,
  SyncError
};
pub use event::{
  Candidate,
  Event,
  ExtendedProps,
  Origin,
  TimeRange,
  WorkOrder
};
pub use modal::{
  ModalPhase,
  ModalTransition
};
pub use remote::{
  Detached,
  RemoteSync
};
pub use selection::{
  Selection,
  SelectionState
};
pub use session::{
  Session,
  StatusLevel,
  StatusNotice
};
pub use store::EventStore;

/// Loads the rc file and installs the
/// tracing subscriber it configures.
pub fn bootstrap(
  rc_override: Option<&Path>
) -> anyhow::Result<Config> {
  let cfg = Config::load(rc_override)?;
  logging::init_tracing(&cfg)?;
  tracing::debug!(
    files = cfg.loaded_files.len(),
    filter = %logging::filter_directives(&cfg),
    "timesheet core initialised"
  );
  Ok(cfg)
}
