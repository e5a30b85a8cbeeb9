use chrono::{
  DateTime,
  Utc
};
use chrono_tz::Tz;
use tracing::{
  debug,
  warn
};

use crate::event::{
  Candidate,
  Event,
  ExtendedProps,
  Origin,
  WorkOrder,
  generate_local_id,
  title_or_placeholder
};
use crate::selection::Selection;

pub const COMMENT_MAX_CHARS: usize =
  2_000;

/// Editable fields of the time entry
/// dialog.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct TimeEntryForm {
  pub title:    String,
  start:        Option<DateTime<Utc>>,
  end:          Option<DateTime<Utc>>,
  pub extended: ExtendedProps
}

impl TimeEntryForm {
  /// Prefills from the current selection.
  /// An empty selection yields blank
  /// fields.
  pub fn from_selection(
    selection: &Selection
  ) -> Self {
    match selection {
      | Selection::Empty => Self::default(),
      | Selection::RangeSelected(range) => {
        Self {
          start: Some(range.start),
          end: Some(range.end),
          ..Self::default()
        }
      }
      | Selection::EventSelected(event) => {
        Self {
          title:    event.title.clone(),
          start:    Some(event.start),
          end:      Some(event.end),
          extended: event.extended.clone()
        }
      }
    }
  }

  pub fn start(
    &self
  ) -> Option<DateTime<Utc>> {
    self.start
  }

  pub fn end(
    &self
  ) -> Option<DateTime<Utc>> {
    self.end
  }

  pub fn set_start(
    &mut self,
    start: DateTime<Utc>
  ) {
    self.start = Some(start);
  }

  pub fn set_end(
    &mut self,
    end: DateTime<Utc>
  ) {
    self.end = Some(end);
  }

  pub fn set_title(
    &mut self,
    title: impl Into<String>
  ) {
    self.title = title.into();
  }

  /// Keeps at most
  /// [`COMMENT_MAX_CHARS`] characters.
  pub fn set_comment(
    &mut self,
    comment: &str
  ) {
    let count = comment.chars().count();
    let kept: String = comment
      .chars()
      .take(COMMENT_MAX_CHARS)
      .collect();
    if count > COMMENT_MAX_CHARS {
      debug!(
        count,
        limit = COMMENT_MAX_CHARS,
        "comment truncated"
      );
    }
    self.extended.comment =
      non_empty(kept);
  }

  pub fn comment_counter(
    &self
  ) -> String {
    let used = self
      .extended
      .comment
      .as_deref()
      .map(|c| c.chars().count())
      .unwrap_or(0);
    format!("{used}/{COMMENT_MAX_CHARS}")
  }

  /// Picks a work order by id. Ids not
  /// in `available` are rejected.
  pub fn select_work_order(
    &mut self,
    id: Option<&str>,
    available: &[WorkOrder]
  ) -> bool {
    match id {
      | None => {
        self.extended.work_order = None;
        true
      }
      | Some(id) => {
        if available
          .iter()
          .any(|wo| wo.id == id)
        {
          self.extended.work_order =
            Some(id.to_string());
          true
        } else {
          warn!(
            work_order = id,
            "unknown work order ignored"
          );
          false
        }
      }
    }
  }

  pub fn set_end_user(
    &mut self,
    value: &str
  ) {
    self.extended.end_user =
      non_empty(value.to_string());
  }

  pub fn set_resource(
    &mut self,
    value: &str
  ) {
    self.extended.resource =
      non_empty(value.to_string());
  }

  pub fn set_time_category(
    &mut self,
    value: &str
  ) {
    self.extended.time_category =
      non_empty(value.to_string());
  }

  pub fn set_category(
    &mut self,
    value: &str
  ) {
    self.extended.category =
      non_empty(value.to_string());
  }

  pub fn set_task(
    &mut self,
    value: &str
  ) {
    self.extended.task =
      non_empty(value.to_string());
  }

  pub fn set_location(
    &mut self,
    value: &str
  ) {
    self.extended.location =
      non_empty(value.to_string());
  }

  pub fn labels(
    &self,
    tz: Tz
  ) -> FormLabels {
    FormLabels {
      start: self
        .start
        .map(|dt| SlotLabels::new(dt, tz))
        .unwrap_or_default(),
      end:   self
        .end
        .map(|dt| SlotLabels::new(dt, tz))
        .unwrap_or_default()
    }
  }

  /// Builds the candidate for submit.
  ///
  /// Returns `None` when the selection is
  /// empty.
  pub fn to_candidate(
    &self,
    selection: &Selection,
    now: DateTime<Utc>,
    placeholder: &str
  ) -> Option<Candidate> {
    let (id, origin, fallback) =
      match selection {
        | Selection::Empty => return None,
        | Selection::RangeSelected(
          range
        ) => (
          generate_local_id(now),
          Origin::New,
          *range
        ),
        | Selection::EventSelected(
          event
        ) => (
          event.id.clone(),
          Origin::Existing,
          event.range()
        )
      };

    Some(Candidate {
      event: Event {
        id,
        title: title_or_placeholder(
          &self.title,
          placeholder
        ),
        start: self
          .start
          .unwrap_or(fallback.start),
        end: self
          .end
          .unwrap_or(fallback.end),
        extended: self.extended.clone()
      },
      origin
    })
  }
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct SlotLabels {
  pub date:   String,
  pub hour:   String,
  pub minute: String
}

impl SlotLabels {
  fn new(
    dt: DateTime<Utc>,
    tz: Tz
  ) -> Self {
    let local = dt.with_timezone(&tz);
    Self {
      date:   local
        .format("%Y/%m/%d")
        .to_string(),
      hour:   local
        .format("%H")
        .to_string(),
      minute: local
        .format("%M")
        .to_string()
    }
  }
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct FormLabels {
  pub start: SlotLabels,
  pub end:   SlotLabels
}

fn non_empty(
  value: String
) -> Option<String> {
  if value.trim().is_empty() {
    None
  } else {
    Some(value)
  }
}
