use chrono::{
  DateTime,
  TimeZone,
  Timelike,
  Utc
};
use tracing::debug;

use crate::event::{
  Event,
  TimeRange
};

/// What seeded the time entry modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
  Empty,
  RangeSelected(TimeRange),
  EventSelected(Event)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
  current: Selection
}

impl Default for SelectionState {
  fn default() -> Self {
    Self {
      current: Selection::Empty
    }
  }
}

impl SelectionState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn current(&self) -> &Selection {
    &self.current
  }

  pub fn is_empty(&self) -> bool {
    matches!(
      self.current,
      Selection::Empty
    )
  }

  pub fn selected_event(
    &self
  ) -> Option<&Event> {
    match &self.current {
      | Selection::EventSelected(
        event
      ) => Some(event),
      | _ => None
    }
  }

  pub fn range(
    &self
  ) -> Option<TimeRange> {
    match &self.current {
      | Selection::Empty => None,
      | Selection::RangeSelected(
        range
      ) => Some(*range),
      | Selection::EventSelected(
        event
      ) => Some(event.range())
    }
  }

  pub fn select_range(
    &mut self,
    range: TimeRange
  ) {
    debug!(
      start = %range.start,
      end = %range.end,
      "range selected"
    );
    self.current =
      Selection::RangeSelected(range);
  }

  pub fn select_event(
    &mut self,
    event: Event
  ) {
    debug!(id = %event.id, "event selected");
    self.current =
      Selection::EventSelected(event);
  }

  pub fn clear(&mut self) {
    if !self.is_empty() {
      debug!("selection cleared");
    }
    self.current = Selection::Empty;
  }

  /// Selects the half-hour slot containing
  /// `now`, one hour long.
  pub fn open_new_entry_default<Tz>(
    &mut self,
    now: DateTime<Tz>
  ) -> TimeRange
  where
    Tz: TimeZone
  {
    let range = default_entry_range(now);
    self.select_range(range);
    range
  }
}

pub fn default_entry_range<Tz>(
  now: DateTime<Tz>
) -> TimeRange
where
  Tz: TimeZone
{
  let start =
    round_down_to_half_hour(now)
      .with_timezone(&Utc);
  TimeRange::one_hour_from(start)
}

// Rounds on the wall clock of `now`'s
// zone so half-hour offsets line up.
fn round_down_to_half_hour<Tz>(
  now: DateTime<Tz>
) -> DateTime<Tz>
where
  Tz: TimeZone
{
  let minute = if now.minute() < 30 {
    0
  } else {
    30
  };
  now
    .with_minute(minute)
    .and_then(|dt| dt.with_second(0))
    .and_then(|dt| {
      dt.with_nanosecond(0)
    })
    .unwrap_or(now)
}
