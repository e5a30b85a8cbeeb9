use chrono::{
  DateTime,
  Duration,
  NaiveDate,
  Utc
};
use tracing::debug;

use crate::event::{
  Event,
  TimeRange
};
use crate::selection::SelectionState;
use crate::store::EventStore;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ViewMode {
  Day,
  ThreeDay,
  Week
}

impl ViewMode {
  pub fn all() -> [Self; 3] {
    [Self::Day, Self::ThreeDay, Self::Week]
  }

  pub fn span_days(self) -> i64 {
    match self {
      | Self::Day => 1,
      | Self::ThreeDay => 3,
      | Self::Week => 7
    }
  }

  pub fn as_key(self) -> &'static str {
    match self {
      | Self::Day => "day",
      | Self::ThreeDay => "3day",
      | Self::Week => "week"
    }
  }

  /// View name understood by the
  /// time-grid widget.
  pub fn widget_view(
    self
  ) -> &'static str {
    match self {
      | Self::Day => "timeGridDay",
      | Self::ThreeDay => {
        "timeGridThreeDay"
      }
      | Self::Week => "timeGridWeek"
    }
  }

  pub fn from_key(
    key: &str
  ) -> Option<Self> {
    match key
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "day" | "1day" => Some(Self::Day),
      | "3day" | "3-day" | "threeday" => {
        Some(Self::ThreeDay)
      }
      | "week" => Some(Self::Week),
      | _ => None
    }
  }
}

/// The external calendar widget.
pub trait CalendarWidget {
  fn show(
    &mut self,
    view: ViewMode,
    anchor: NaiveDate
  );

  fn set_events(
    &mut self,
    events: &[Event]
  );
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct CalendarNavigator {
  view:   ViewMode,
  anchor: NaiveDate
}

impl CalendarNavigator {
  pub fn new(
    view: ViewMode,
    anchor: NaiveDate
  ) -> Self {
    Self { view, anchor }
  }

  pub fn view(&self) -> ViewMode {
    self.view
  }

  pub fn anchor(&self) -> NaiveDate {
    self.anchor
  }

  pub fn set_view(
    &mut self,
    view: ViewMode
  ) {
    self.view = view;
  }

  pub fn next(&mut self) -> NaiveDate {
    self.shift(1)
  }

  pub fn prev(&mut self) -> NaiveDate {
    self.shift(-1)
  }

  pub fn today(
    &mut self,
    today: NaiveDate
  ) -> NaiveDate {
    self.anchor = today;
    self.anchor
  }

  fn shift(
    &mut self,
    step: i64
  ) -> NaiveDate {
    self.anchor = add_days(
      self.anchor,
      step * self.view.span_days()
    );
    self.anchor
  }
}

fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}

/// Translates widget callbacks into
/// selection changes and pushes store
/// contents back to the widget.
#[derive(Debug)]
pub struct CalendarAdapter<W> {
  widget:    W,
  navigator: CalendarNavigator
}

impl<W> CalendarAdapter<W>
where
  W: CalendarWidget
{
  pub fn new(
    widget: W,
    navigator: CalendarNavigator
  ) -> Self {
    let mut adapter =
      Self { widget, navigator };
    adapter.reissue_view();
    adapter
  }

  pub fn widget(&self) -> &W {
    &self.widget
  }

  pub fn navigator(
    &self
  ) -> &CalendarNavigator {
    &self.navigator
  }

  pub fn on_range_select(
    &self,
    selection: &mut SelectionState,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>
  ) -> TimeRange {
    let range = match end {
      | Some(end) => {
        TimeRange::new(start, end)
      }
      | None => {
        TimeRange::one_hour_from(start)
      }
    };
    selection.select_range(range);
    range
  }

  pub fn on_event_activate(
    &self,
    selection: &mut SelectionState,
    event: Event
  ) {
    selection.select_event(event);
  }

  pub fn render(
    &mut self,
    store: &EventStore
  ) {
    debug!(
      count = store.len(),
      "rendering events"
    );
    self.widget.set_events(store.all());
  }

  pub fn set_view(
    &mut self,
    view: ViewMode
  ) {
    self.navigator.set_view(view);
    self.reissue_view();
  }

  pub fn next(&mut self) -> NaiveDate {
    let anchor = self.navigator.next();
    self.reissue_view();
    anchor
  }

  pub fn prev(&mut self) -> NaiveDate {
    let anchor = self.navigator.prev();
    self.reissue_view();
    anchor
  }

  pub fn today(
    &mut self,
    today: NaiveDate
  ) -> NaiveDate {
    let anchor =
      self.navigator.today(today);
    self.reissue_view();
    anchor
  }

  fn reissue_view(&mut self) {
    debug!(
      view = self.navigator.view.as_key(),
      widget_view =
        self.navigator.view.widget_view(),
      anchor = %self.navigator.anchor,
      "reissuing calendar view"
    );
    self.widget.show(
      self.navigator.view,
      self.navigator.anchor
    );
  }
}
