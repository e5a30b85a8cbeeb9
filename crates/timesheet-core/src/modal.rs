use std::time::Duration;

use tokio::time::Instant;
use tracing::{
  debug,
  trace
};

pub const DEFAULT_MOUNT_DELAY: Duration =
  Duration::from_millis(10);
pub const DEFAULT_CLOSE_DELAY: Duration =
  Duration::from_millis(300);

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ModalPhase {
  Closed,
  Mounting,
  Visible,
  Closing
}

impl ModalPhase {
  pub fn as_key(self) -> &'static str {
    match self {
      | Self::Closed => "closed",
      | Self::Mounting => "mounting",
      | Self::Visible => "visible",
      | Self::Closing => "closing"
    }
  }
}

/// Emitted by [`ModalLifecycle::advance`]
/// when a timer fires.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ModalTransition {
  Shown,
  Unmounted
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct ModalTimings {
  pub mount_delay: Duration,
  pub close_delay: Duration
}

impl Default for ModalTimings {
  fn default() -> Self {
    Self {
      mount_delay: DEFAULT_MOUNT_DELAY,
      close_delay: DEFAULT_CLOSE_DELAY
    }
  }
}

/// Mount/fade-in/fade-out/unmount state
/// machine for one dialog.
///
/// The owner requests open or closed with
/// [`set_open`](Self::set_open) and feeds
/// the clock through
/// [`advance`](Self::advance). Data shown
/// by the dialog must stay intact until
/// `advance` reports
/// [`ModalTransition::Unmounted`].
#[derive(Debug, Clone)]
pub struct ModalLifecycle {
  name:     &'static str,
  phase:    ModalPhase,
  deadline: Option<Instant>,
  timings:  ModalTimings
}

impl ModalLifecycle {
  pub fn new(
    name: &'static str,
    timings: ModalTimings
  ) -> Self {
    Self {
      name,
      phase: ModalPhase::Closed,
      deadline: None,
      timings
    }
  }

  pub fn phase(&self) -> ModalPhase {
    self.phase
  }

  pub fn is_open_requested(
    &self
  ) -> bool {
    matches!(
      self.phase,
      ModalPhase::Mounting
        | ModalPhase::Visible
    )
  }

  pub fn is_mounted(&self) -> bool {
    self.phase != ModalPhase::Closed
  }

  pub fn next_deadline(
    &self
  ) -> Option<Instant> {
    self.deadline
  }

  /// Returns `true` when the phase
  /// changed.
  pub fn set_open(
    &mut self,
    open: bool,
    now: Instant
  ) -> bool {
    let next = match (self.phase, open)
    {
      | (
        ModalPhase::Closed
        | ModalPhase::Closing,
        true
      ) => {
        self.deadline = Some(
          now + self.timings.mount_delay
        );
        ModalPhase::Mounting
      }
      | (
        ModalPhase::Mounting
        | ModalPhase::Visible,
        false
      ) => {
        self.deadline = Some(
          now + self.timings.close_delay
        );
        ModalPhase::Closing
      }
      | (phase, _) => {
        trace!(
          modal = self.name,
          phase = phase.as_key(),
          open,
          "open request left phase unchanged"
        );
        return false;
      }
    };

    debug!(
      modal = self.name,
      from = self.phase.as_key(),
      to = next.as_key(),
      "modal phase changed"
    );
    self.phase = next;
    true
  }

  pub fn advance(
    &mut self,
    now: Instant
  ) -> Option<ModalTransition> {
    let deadline = self.deadline?;
    if now < deadline {
      return None;
    }
    self.deadline = None;

    let (next, transition) =
      match self.phase {
        | ModalPhase::Mounting => (
          ModalPhase::Visible,
          ModalTransition::Shown
        ),
        | ModalPhase::Closing => (
          ModalPhase::Closed,
          ModalTransition::Unmounted
        ),
        | phase => {
          trace!(
            modal = self.name,
            phase = phase.as_key(),
            "stale modal timer dropped"
          );
          return None;
        }
      };

    debug!(
      modal = self.name,
      from = self.phase.as_key(),
      to = next.as_key(),
      "modal timer fired"
    );
    self.phase = next;
    Some(transition)
  }
}
