use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use timesheet_core::{Candidate, Event, WorkOrder};
use tracing::warn;

use crate::query::{TIME_ENTRY_NAVIGATION, WORK_ORDER_BIND, work_order_reference};

pub const UNNAMED_WORK_ORDER: &str = "(unnamed)";

#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkOrderRecord {
    pub proto_workorderid: String,
    #[serde(default)]
    pub proto_wonumber: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeEntryRecord {
    pub proto_timeentryid: String,
    #[serde(default)]
    pub proto_name: Option<String>,
    #[serde(default)]
    pub proto_startdatetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub proto_enddatetime: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkOrderWithEntries {
    pub proto_workorderid: String,
    #[serde(default, rename = "proto_timeentry_wonumber_proto_workorder")]
    pub entries: Vec<TimeEntryRecord>,
}

impl From<WorkOrderRecord> for WorkOrder {
    fn from(record: WorkOrderRecord) -> Self {
        let name = record
            .proto_wonumber
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNNAMED_WORK_ORDER.to_string());
        WorkOrder {
            id: record.proto_workorderid,
            name,
        }
    }
}

/// Converts a record into a calendar event. Records missing either
/// timestamp cannot be placed on the grid and are skipped.
pub fn from_record(record: TimeEntryRecord, work_order: Option<&str>) -> Option<Event> {
    let (Some(start), Some(end)) = (record.proto_startdatetime, record.proto_enddatetime) else {
        warn!(
            id = %record.proto_timeentryid,
            navigation = TIME_ENTRY_NAVIGATION,
            "time entry without start/end skipped"
        );
        return None;
    };
    let mut event = Event::new(
        record.proto_timeentryid,
        record.proto_name.unwrap_or_default(),
        start,
        end,
    );
    event.extended.work_order = work_order.map(str::to_string);
    Some(event)
}

pub fn flatten_entries(parents: Vec<WorkOrderWithEntries>) -> Vec<Event> {
    parents
        .into_iter()
        .flat_map(|parent| {
            let work_order = parent.proto_workorderid;
            parent
                .entries
                .into_iter()
                .filter_map(move |entry| from_record(entry, Some(&work_order)))
        })
        .collect()
}

/// Body for create and update requests.
pub fn to_payload(candidate: &Candidate) -> Value {
    let event = &candidate.event;
    let mut body = Map::new();
    body.insert("proto_name".to_string(), Value::String(event.title.clone()));
    body.insert(
        "proto_startdatetime".to_string(),
        Value::String(event.start.to_rfc3339()),
    );
    body.insert(
        "proto_enddatetime".to_string(),
        Value::String(event.end.to_rfc3339()),
    );
    if let Some(work_order) = &event.extended.work_order {
        body.insert(
            WORK_ORDER_BIND.to_string(),
            Value::String(work_order_reference(work_order)),
        );
    }
    Value::Object(body)
}

/// The server only echoes the columns it stores; everything else the user
/// entered is carried over from the candidate.
pub fn merge_saved(candidate: &Candidate, saved: TimeEntryRecord) -> Event {
    let mut event = Event::new(
        saved.proto_timeentryid,
        saved.proto_name.unwrap_or_else(|| candidate.event.title.clone()),
        saved.proto_startdatetime.unwrap_or(candidate.event.start),
        saved.proto_enddatetime.unwrap_or(candidate.event.end),
    );
    event.extended = candidate.event.extended.clone();
    event
}
