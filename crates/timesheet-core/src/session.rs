use chrono::{
  DateTime,
  NaiveDate,
  Utc
};
use chrono_tz::Tz;
use tokio::time::Instant;
use tracing::{
  debug,
  info,
  warn
};

use crate::adapter::{
  CalendarAdapter,
  CalendarNavigator,
  CalendarWidget,
  ViewMode
};
use crate::config::Config;
use crate::error::{
  SessionError,
  SyncError
};
use crate::event::{
  Event,
  WorkOrder,
  title_or_placeholder
};
use crate::form::TimeEntryForm;
use crate::modal::{
  ModalLifecycle,
  ModalPhase,
  ModalTimings,
  ModalTransition
};
use crate::picker::{
  FavoriteTasksDialog,
  UserListDialog
};
use crate::remote::RemoteSync;
use crate::selection::SelectionState;
use crate::store::EventStore;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum StatusLevel {
  Info,
  Saved,
  Error
}

/// User-visible status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotice {
  pub level:   StatusLevel,
  pub message: String
}

/// Coordinates calendar interactions,
/// the time entry dialog and remote
/// persistence.
pub struct Session<R, W> {
  remote:            R,
  store:             EventStore,
  selection:         SelectionState,
  form:              TimeEntryForm,
  modal:             ModalLifecycle,
  adapter:           CalendarAdapter<W>,
  work_orders:       Vec<WorkOrder>,
  work_orders_stale: bool,
  status:            Option<StatusNotice>,
  timezone:          Tz,
  placeholder:       String,
  timings:           ModalTimings,
  pub favorites:     FavoriteTasksDialog,
  pub users:         UserListDialog
}

impl<R, W> Session<R, W>
where
  R: RemoteSync,
  W: CalendarWidget
{
  pub fn new(
    cfg: &Config,
    remote: R,
    widget: W,
    today: NaiveDate
  ) -> Self {
    let timings = cfg.modal_timings();
    let navigator = CalendarNavigator::new(
      cfg.default_view(),
      today
    );
    Self {
      remote,
      store: EventStore::new(),
      selection: SelectionState::new(),
      form: TimeEntryForm::default(),
      modal: ModalLifecycle::new(
        "time_entry",
        timings
      ),
      adapter: CalendarAdapter::new(
        widget, navigator
      ),
      work_orders: Vec::new(),
      work_orders_stale: true,
      status: None,
      timezone: cfg.timezone(),
      placeholder: cfg
        .placeholder_title(),
      timings,
      favorites: FavoriteTasksDialog::new(
        Vec::new(),
        timings
      ),
      users: UserListDialog::new(
        Vec::new(),
        timings
      )
    }
  }

  pub fn with_favorite_tasks(
    mut self,
    tasks: Vec<String>
  ) -> Self {
    self.favorites =
      FavoriteTasksDialog::new(
        tasks,
        self.timings
      );
    self
  }

  pub fn with_users(
    mut self,
    users: Vec<String>
  ) -> Self {
    self.users = UserListDialog::new(
      users,
      self.timings
    );
    self
  }

  /// Fetches existing entries and work
  /// orders. Failures end up in
  /// [`status`](Self::status).
  #[tracing::instrument(skip(self))]
  pub async fn load(&mut self) {
    let events_failure = match self
      .remote
      .list_events()
      .await
    {
      | Ok(events) => {
        info!(
          count = events.len(),
          "loaded events"
        );
        let placeholder =
          self.placeholder.clone();
        self.store.extend(
          events.into_iter().map(
            |mut event| {
              event.title =
                title_or_placeholder(
                  &event.title,
                  &placeholder
                );
              event
            }
          )
        );
        self.adapter.render(&self.store);
        None
      }
      | Err(error) => {
        self.report(&error);
        self.status.clone()
      }
    };

    self.work_orders_stale = true;
    self.refresh_work_orders().await;

    // A work order failure must not
    // hide the event failure.
    if let Some(first) = events_failure {
      let notice = match self.status.take()
      {
        | Some(second)
          if second != first =>
        {
          combine_notices(first, second)
        }
        | _ => first
      };
      self.status = Some(notice);
    }
  }

  /// Re-fetches work orders once after
  /// each modal open.
  #[tracing::instrument(skip(self))]
  pub async fn refresh_work_orders(
    &mut self
  ) {
    if !self.work_orders_stale {
      debug!(
        "work orders fresh; skipping \
         fetch"
      );
      return;
    }
    self.work_orders_stale = false;

    match self
      .remote
      .list_work_orders()
      .await
    {
      | Ok(work_orders) => {
        debug!(
          count = work_orders.len(),
          "loaded work orders"
        );
        self.work_orders = work_orders;
      }
      | Err(error) => {
        self.report(&error)
      }
    }
  }

  pub fn open_new_entry(
    &mut self,
    now: DateTime<Utc>
  ) {
    let local =
      now.with_timezone(&self.timezone);
    self
      .selection
      .open_new_entry_default(local);
    self.open_modal();
  }

  pub fn on_range_select(
    &mut self,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>
  ) {
    self.adapter.on_range_select(
      &mut self.selection,
      start,
      end
    );
    self.open_modal();
  }

  pub fn on_event_activate(
    &mut self,
    event: Event
  ) {
    self.adapter.on_event_activate(
      &mut self.selection,
      event
    );
    self.open_modal();
  }

  fn open_modal(&mut self) {
    self.form =
      TimeEntryForm::from_selection(
        self.selection.current()
      );
    if self
      .modal
      .set_open(true, Instant::now())
    {
      self.work_orders_stale = true;
    }
  }

  /// Persists the form. On success the
  /// returned event is merged and the
  /// dialog starts closing; on failure
  /// everything stays as it was.
  #[tracing::instrument(skip(self))]
  pub async fn submit(
    &mut self,
    now: DateTime<Utc>
  ) -> Result<Event, SessionError> {
    if !self.modal.is_open_requested() {
      return Err(
        SessionError::ModalNotOpen
      );
    }

    let candidate = self
      .form
      .to_candidate(
        self.selection.current(),
        now,
        &self.placeholder
      )
      .ok_or(
        SessionError::NothingSelected
      )?;

    let gaps = candidate
      .validation_gaps(&self.placeholder);
    if !gaps.is_empty() {
      warn!(
        id = %candidate.event.id,
        ?gaps,
        "submitting entry with unvalidated fields"
      );
    }

    match self
      .remote
      .submit_event(&candidate)
      .await
    {
      | Ok(mut saved) => {
        saved.title = title_or_placeholder(
          &saved.title,
          &self.placeholder
        );
        info!(
          candidate_id = %candidate.event.id,
          saved_id = %saved.id,
          created = candidate.is_new(),
          "time entry saved"
        );
        self.store.upsert(saved.clone());
        self.adapter.render(&self.store);
        self.status = Some(StatusNotice {
          level:   StatusLevel::Saved,
          message: format!(
            "Saved \"{}\"",
            saved.title
          )
        });
        self
          .modal
          .set_open(false, Instant::now());
        Ok(saved)
      }
      | Err(error) => {
        self.report(&error);
        Err(error.into())
      }
    }
  }

  pub fn close(&mut self) {
    self
      .modal
      .set_open(false, Instant::now());
  }

  /// Fires due timers. Selection and form
  /// are discarded only once the dialog
  /// has unmounted.
  pub fn tick(
    &mut self
  ) -> Option<ModalTransition> {
    let now = Instant::now();
    self.favorites.tick(now);
    self.users.tick(now);

    let transition =
      self.modal.advance(now);
    if transition
      == Some(ModalTransition::Unmounted)
    {
      self.selection.clear();
      self.form = TimeEntryForm::default();
    }
    transition
  }

  pub fn next_deadline(
    &self
  ) -> Option<Instant> {
    [
      self.modal.next_deadline(),
      self.favorites.modal.next_deadline(),
      self.users.modal.next_deadline()
    ]
    .into_iter()
    .flatten()
    .min()
  }

  pub fn set_view(
    &mut self,
    view: ViewMode
  ) {
    self.adapter.set_view(view);
  }

  pub fn next(&mut self) -> NaiveDate {
    self.adapter.next()
  }

  pub fn prev(&mut self) -> NaiveDate {
    self.adapter.prev()
  }

  pub fn today(
    &mut self,
    today: NaiveDate
  ) -> NaiveDate {
    self.adapter.today(today)
  }

  pub fn store(&self) -> &EventStore {
    &self.store
  }

  pub fn selection(
    &self
  ) -> &SelectionState {
    &self.selection
  }

  pub fn form(&self) -> &TimeEntryForm {
    &self.form
  }

  pub fn form_mut(
    &mut self
  ) -> &mut TimeEntryForm {
    &mut self.form
  }

  pub fn modal_phase(
    &self
  ) -> ModalPhase {
    self.modal.phase()
  }

  pub fn work_orders(
    &self
  ) -> &[WorkOrder] {
    &self.work_orders
  }

  pub fn status(
    &self
  ) -> Option<&StatusNotice> {
    self.status.as_ref()
  }

  pub fn adapter(
    &self
  ) -> &CalendarAdapter<W> {
    &self.adapter
  }

  pub fn timezone(&self) -> Tz {
    self.timezone
  }

  fn report(
    &mut self,
    error: &SyncError
  ) {
    let notice = if error
      .is_host_unavailable()
    {
      info!(%error, "running without backend");
      StatusNotice {
        level:   StatusLevel::Info,
        message: error.to_string()
      }
    } else {
      warn!(%error, "remote call failed");
      StatusNotice {
        level:   StatusLevel::Error,
        message: error.to_string()
      }
    };
    self.status = Some(notice);
  }
}

fn combine_notices(
  first: StatusNotice,
  second: StatusNotice
) -> StatusNotice {
  let level = if first.level
    == StatusLevel::Error
    || second.level == StatusLevel::Error
  {
    StatusLevel::Error
  } else {
    first.level
  };
  StatusNotice {
    level,
    message: format!(
      "{}; {}",
      first.message, second.message
    )
  }
}
