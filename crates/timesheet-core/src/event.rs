use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PLACEHOLDER_TITLE: &str = "(untitled)";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtendedProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_order: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

/// A time entry as shown on the calendar grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,

    #[serde(default, rename = "extendedProps")]
    pub extended: ExtendedProps,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            end,
            extended: ExtendedProps::default(),
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start,
            end: self.end,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Range starting at `start` and lasting one hour.
    pub fn one_hour_from(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: start + Duration::hours(1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkOrder {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    New,
    Existing,
}

/// Locally assembled event that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub event: Event,
    pub origin: Origin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationGap {
    EndBeforeStart,
    EmptyTitle,
}

impl Candidate {
    pub fn is_new(&self) -> bool {
        self.origin == Origin::New
    }

    /// Checks that are reported but never enforced before submit.
    pub fn validation_gaps(&self, placeholder: &str) -> Vec<ValidationGap> {
        let mut gaps = Vec::new();
        if self.event.end < self.event.start {
            gaps.push(ValidationGap::EndBeforeStart);
        }
        if self.event.title.trim().is_empty() || self.event.title == placeholder {
            gaps.push(ValidationGap::EmptyTitle);
        }
        gaps
    }
}

pub fn generate_local_id(now: DateTime<Utc>) -> String {
    format!("local-{}", now.timestamp_millis())
}

pub fn title_or_placeholder(raw: &str, placeholder: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}
