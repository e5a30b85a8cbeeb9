use std::cell::{Cell, RefCell};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use timesheet_core::adapter::{CalendarWidget, ViewMode};
use timesheet_core::config::Config;
use timesheet_core::driver::settle;
use timesheet_core::selection::Selection;
use timesheet_core::{
    Candidate, Detached, Event, ModalPhase, ModalTransition, Origin, RemoteSync, Session,
    SessionError, StatusLevel, SyncError, TimeRange, WorkOrder,
};
use tokio::time::{Instant, advance};

#[derive(Debug, Default)]
struct RecordingWidget {
    shown: Vec<(ViewMode, NaiveDate)>,
    events: Vec<Event>,
}

impl CalendarWidget for RecordingWidget {
    fn show(&mut self, view: ViewMode, anchor: NaiveDate) {
        self.shown.push((view, anchor));
    }

    fn set_events(&mut self, events: &[Event]) {
        self.events = events.to_vec();
    }
}

#[derive(Default)]
struct FakeRemote {
    events: Vec<Event>,
    work_orders: Vec<WorkOrder>,
    fail_submit: bool,
    fail_events: bool,
    fail_work_orders: bool,
    server_id: Option<String>,
    submitted: RefCell<Vec<Candidate>>,
    work_order_calls: Cell<usize>,
}

impl RemoteSync for FakeRemote {
    async fn list_work_orders(&self) -> Result<Vec<WorkOrder>, SyncError> {
        self.work_order_calls.set(self.work_order_calls.get() + 1);
        if self.fail_work_orders {
            return Err(SyncError::request_failed("list_work_orders", "HTTP 503"));
        }
        Ok(self.work_orders.clone())
    }

    async fn list_events(&self) -> Result<Vec<Event>, SyncError> {
        if self.fail_events {
            return Err(SyncError::request_failed("list_events", "HTTP 401"));
        }
        Ok(self.events.clone())
    }

    async fn submit_event(&self, candidate: &Candidate) -> Result<Event, SyncError> {
        self.submitted.borrow_mut().push(candidate.clone());
        if self.fail_submit {
            return Err(SyncError::request_failed("submit_event", "HTTP 500"));
        }
        let mut saved = candidate.event.clone();
        if let Some(id) = &self.server_id {
            saved.id = id.clone();
        }
        Ok(saved)
    }
}

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, h, m, 0)
        .single()
        .expect("valid instant")
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date")
}

fn session<R: RemoteSync>(remote: R) -> Session<R, RecordingWidget> {
    Session::new(&Config::default(), remote, RecordingWidget::default(), today())
}

async fn advance_and_tick<R: RemoteSync>(
    session: &mut Session<R, RecordingWidget>,
    ms: u64,
) -> Option<ModalTransition> {
    advance(Duration::from_millis(ms)).await;
    session.tick()
}

#[tokio::test(start_paused = true)]
async fn range_select_submit_merges_server_event_and_closes_later() {
    let remote = FakeRemote {
        server_id: Some("srv-1".to_string()),
        ..FakeRemote::default()
    };
    let mut session = session(&remote);

    session.on_range_select(at(9, 0), Some(at(10, 0)));
    assert_eq!(session.modal_phase(), ModalPhase::Mounting);
    assert_eq!(
        advance_and_tick(&mut session, 10).await,
        Some(ModalTransition::Shown)
    );
    assert_eq!(session.modal_phase(), ModalPhase::Visible);
    assert_eq!(session.form().start(), Some(at(9, 0)));
    assert_eq!(session.form().end(), Some(at(10, 0)));

    session.form_mut().set_title("Kickoff");
    let saved = session.submit(at(8, 0)).await.expect("submit succeeds");
    assert_eq!(saved.id, "srv-1");

    let all = session.store().all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, "srv-1");
    assert_eq!(all[0].title, "Kickoff");
    assert_eq!(session.adapter().widget().events, all);
    assert_eq!(
        session.status().map(|s| s.level),
        Some(StatusLevel::Saved)
    );

    let submitted = remote.submitted.borrow();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].origin, Origin::New);
    assert!(submitted[0].event.id.starts_with("local-"));
    drop(submitted);

    assert_eq!(session.modal_phase(), ModalPhase::Closing);
    assert_eq!(advance_and_tick(&mut session, 100).await, None);
    assert_eq!(
        session.selection().current(),
        &Selection::RangeSelected(TimeRange::new(at(9, 0), at(10, 0)))
    );
    assert_eq!(
        advance_and_tick(&mut session, 250).await,
        Some(ModalTransition::Unmounted)
    );
    assert_eq!(session.modal_phase(), ModalPhase::Closed);
    assert!(session.selection().is_empty());
    assert_eq!(session.form().start(), None);
}

#[tokio::test(start_paused = true)]
async fn failed_submit_keeps_modal_open_and_store_unchanged() {
    let remote = FakeRemote {
        fail_submit: true,
        ..FakeRemote::default()
    };
    let mut session = session(remote);

    session.on_range_select(at(9, 0), None);
    advance_and_tick(&mut session, 10).await;

    let err = session.submit(at(8, 0)).await.expect_err("submit fails");
    assert!(matches!(
        err,
        SessionError::Sync(SyncError::RequestFailed { .. })
    ));
    assert!(session.store().is_empty());
    assert_eq!(session.modal_phase(), ModalPhase::Visible);
    let status = session.status().expect("status set");
    assert_eq!(status.level, StatusLevel::Error);
    assert!(status.message.contains("HTTP 500"));
    assert_eq!(session.next_deadline(), None);
}

#[tokio::test(start_paused = true)]
async fn close_defers_clearing_selection() {
    let mut session = session(FakeRemote::default());
    let event = Event::new("srv-4", "Design review", at(13, 0), at(14, 0));

    session.on_event_activate(event.clone());
    advance_and_tick(&mut session, 10).await;
    assert_eq!(session.form().title, "Design review");

    session.close();
    assert_eq!(advance_and_tick(&mut session, 100).await, None);
    assert_eq!(session.selection().selected_event(), Some(&event));
    assert_eq!(session.form().title, "Design review");

    assert_eq!(
        advance_and_tick(&mut session, 250).await,
        Some(ModalTransition::Unmounted)
    );
    assert!(session.selection().is_empty());
}

#[tokio::test(start_paused = true)]
async fn editing_existing_event_replaces_it_in_place() {
    let remote = FakeRemote {
        events: vec![
            Event::new("srv-1", "Kickoff", at(9, 0), at(10, 0)),
            Event::new("srv-2", "Lunch", at(12, 0), at(13, 0)),
        ],
        ..FakeRemote::default()
    };
    let mut session = session(&remote);
    session.load().await;

    let existing = session.store().get("srv-1").cloned().expect("loaded");
    session.on_event_activate(existing);
    session.form_mut().set_title("Kickoff (moved)");
    session.form_mut().set_end(at(10, 30));
    session.submit(at(11, 0)).await.expect("submit succeeds");

    let ids: Vec<&str> = session.store().all().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["srv-1", "srv-2"]);
    let updated = session.store().get("srv-1").expect("still present");
    assert_eq!(updated.title, "Kickoff (moved)");
    assert_eq!(updated.end, at(10, 30));
    assert_eq!(remote.submitted.borrow()[0].origin, Origin::Existing);
}

#[tokio::test(start_paused = true)]
async fn reselecting_while_visible_updates_fields_in_place() {
    let mut session = session(FakeRemote::default());
    session.on_range_select(at(9, 0), None);
    advance_and_tick(&mut session, 10).await;

    session.on_range_select(at(15, 0), Some(at(15, 30)));
    assert_eq!(session.modal_phase(), ModalPhase::Visible);
    assert_eq!(session.form().start(), Some(at(15, 0)));
    assert_eq!(session.next_deadline(), None);
}

#[tokio::test]
async fn detached_backend_degrades_to_info_status() {
    let mut session = session(Detached::default());
    session.load().await;

    assert!(session.store().is_empty());
    let status = session.status().expect("status set");
    assert_eq!(status.level, StatusLevel::Info);
    assert!(status.message.contains("no backend"));

    session.open_new_entry(at(10, 15));
    let err = session.submit(at(10, 16)).await.expect_err("no backend");
    assert!(matches!(
        err,
        SessionError::Sync(SyncError::HostUnavailable { .. })
    ));
    assert!(session.store().is_empty());
}

#[tokio::test]
async fn load_normalizes_titles_and_converges_duplicate_ids() {
    let remote = FakeRemote {
        events: vec![
            Event::new("srv-1", "", at(9, 0), at(10, 0)),
            Event::new("srv-1", "Kickoff", at(9, 0), at(10, 0)),
            Event::new("srv-2", "  ", at(11, 0), at(12, 0)),
        ],
        ..FakeRemote::default()
    };
    let mut session = session(remote);
    session.load().await;

    let titles: Vec<&str> = session.store().all().iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Kickoff", "(untitled)"]);
}

#[tokio::test(start_paused = true)]
async fn work_orders_refresh_once_per_open() {
    let remote = FakeRemote {
        work_orders: vec![WorkOrder {
            id: "wo-1".to_string(),
            name: "WO-0001".to_string(),
        }],
        ..FakeRemote::default()
    };
    let mut session = session(&remote);
    session.load().await;
    assert_eq!(remote.work_order_calls.get(), 1);

    session.refresh_work_orders().await;
    assert_eq!(remote.work_order_calls.get(), 1);

    session.open_new_entry(at(10, 45));
    session.refresh_work_orders().await;
    session.refresh_work_orders().await;
    assert_eq!(remote.work_order_calls.get(), 2);
    assert_eq!(session.work_orders().len(), 1);

    let work_orders = session.work_orders().to_vec();
    assert!(session.form_mut().select_work_order(Some("wo-1"), &work_orders));
}

#[tokio::test]
async fn submit_requires_open_modal_and_selection() {
    let mut session = session(FakeRemote::default());
    assert_eq!(
        session.submit(at(9, 0)).await,
        Err(SessionError::ModalNotOpen)
    );
}

#[tokio::test(start_paused = true)]
async fn new_entry_rounds_in_configured_timezone() {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![(
        "calendar.timezone".to_string(),
        "Asia/Kolkata".to_string(),
    )]);
    let mut session = Session::new(
        &cfg,
        FakeRemote::default(),
        RecordingWidget::default(),
        today(),
    );

    // 10:15 UTC is 15:45 in Kolkata, so the slot starts at 15:30 local.
    session.open_new_entry(at(10, 15));
    let range = session.selection().range().expect("range selected");
    assert_eq!(range.start, at(10, 0));
    assert_eq!(range.end, at(11, 0));

    let labels = session.form().labels(session.timezone());
    assert_eq!(labels.start.hour, "15");
    assert_eq!(labels.start.minute, "30");
}

#[tokio::test(start_paused = true)]
async fn settle_runs_timers_to_completion() {
    let mut session = session(FakeRemote::default());
    session.on_range_select(at(9, 0), None);
    assert_eq!(settle(&mut session).await, vec![ModalTransition::Shown]);

    session.close();
    assert_eq!(settle(&mut session).await, vec![ModalTransition::Unmounted]);
    assert!(session.selection().is_empty());
    assert_eq!(session.next_deadline(), None);
}

#[test]
fn navigation_shifts_by_view_span() {
    let mut session = session(FakeRemote::default());
    assert_eq!(session.next(), today() + chrono::Duration::days(7));
    session.set_view(ViewMode::ThreeDay);
    assert_eq!(session.prev(), today() + chrono::Duration::days(4));
    session.set_view(ViewMode::Day);
    assert_eq!(session.today(today()), today());
    assert_eq!(session.next(), today() + chrono::Duration::days(1));

    let shown = &session.adapter().widget().shown;
    assert_eq!(shown.first(), Some(&(ViewMode::Week, today())));
    assert_eq!(shown.len(), 7);
}

#[tokio::test]
async fn load_reports_both_failures() {
    let remote = FakeRemote {
        fail_events: true,
        fail_work_orders: true,
        ..FakeRemote::default()
    };
    let mut session = session(remote);
    session.load().await;

    let status = session.status().expect("status set");
    assert_eq!(status.level, StatusLevel::Error);
    assert!(status.message.contains("list_events failed: HTTP 401"));
    assert!(status.message.contains("list_work_orders failed: HTTP 503"));
}

#[tokio::test]
async fn load_keeps_event_failure_when_work_orders_succeed() {
    let remote = FakeRemote {
        fail_events: true,
        ..FakeRemote::default()
    };
    let mut session = session(remote);
    session.load().await;

    let status = session.status().expect("status set");
    assert_eq!(status.message, "list_events failed: HTTP 401");
}

#[tokio::test(start_paused = true)]
async fn picker_dialogs_run_on_session_clock() {
    let mut session = session(FakeRemote::default())
        .with_favorite_tasks(vec!["Filing".to_string(), "Meeting prep".to_string()])
        .with_users(vec!["0001 Tanaka Taro".to_string(), "0002 Sato Hanako".to_string()]);

    session.favorites.open(Instant::now());
    session.users.open(Instant::now());
    assert!(session.next_deadline().is_some());
    assert!(settle(&mut session).await.is_empty());
    assert_eq!(session.favorites.modal.phase(), ModalPhase::Visible);
    assert_eq!(session.users.modal.phase(), ModalPhase::Visible);

    session.favorites.set_category(Some("Meeting".to_string()));
    session.favorites.search();
    session.favorites.picker.toggle_result("Meeting prep");
    session.favorites.picker.move_checked();
    let saved = session.favorites.save(Instant::now());
    assert_eq!(saved, vec!["Meeting prep"]);

    session.users.set_user_name("Sato");
    session.users.search();
    assert_eq!(session.users.picker.results(), &["0002 Sato Hanako"]);

    settle(&mut session).await;
    assert_eq!(session.favorites.modal.phase(), ModalPhase::Closed);
    assert_eq!(session.users.modal.phase(), ModalPhase::Visible);
    assert_eq!(session.modal_phase(), ModalPhase::Closed);
}

#[test]
fn bootstrap_loads_rc_and_installs_logging() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rc = dir.path().join("timesheetrc");
    std::fs::write(&rc, "log.level = debug\ncalendar.view = day\n").expect("write rc");

    let cfg = timesheet_core::bootstrap(Some(rc.as_path())).expect("bootstrap");
    assert_eq!(cfg.default_view(), ViewMode::Day);
    assert_eq!(timesheet_core::logging::filter_directives(&cfg), "debug");

    let session = Session::new(&cfg, Detached::default(), RecordingWidget::default(), today());
    assert_eq!(session.adapter().navigator().view(), ViewMode::Day);
}

