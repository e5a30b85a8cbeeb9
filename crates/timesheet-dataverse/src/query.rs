//! OData query strings for the time entry entities.

pub const WORK_ORDER_SET: &str = "proto_workorders";
pub const TIME_ENTRY_SET: &str = "proto_timeentries";
pub const TIME_ENTRY_NAVIGATION: &str = "proto_timeentry_wonumber_proto_workorder";
pub const WORK_ORDER_BIND: &str = "proto_wonumber@odata.bind";

/// Host user ids arrive wrapped in braces, e.g. `{ABC-123}`.
pub fn normalize_user_id(raw: &str) -> String {
    raw.trim().replace(['{', '}'], "")
}

pub fn created_by_filter(user_id: &str) -> String {
    format!("_createdby_value eq {}", normalize_user_id(user_id))
}

pub fn work_order_params(user_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("$select", "proto_workorderid,proto_wonumber".to_string()),
        ("$filter", created_by_filter(user_id)),
    ]
}

pub fn time_entry_params(user_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("$select", "proto_workorderid".to_string()),
        ("$filter", created_by_filter(user_id)),
        (
            "$expand",
            format!(
                "{TIME_ENTRY_NAVIGATION}($select=proto_timeentryid,proto_startdatetime,proto_enddatetime,proto_name)"
            ),
        ),
    ]
}

pub fn work_order_reference(id: &str) -> String {
    format!("/{WORK_ORDER_SET}({id})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_braces_from_user_id() {
        assert_eq!(normalize_user_id(" {ABC-123} "), "ABC-123");
        assert_eq!(created_by_filter("{x}"), "_createdby_value eq x");
    }

    #[test]
    fn expands_time_entries_through_work_orders() {
        let params = time_entry_params("u1");
        let expand = params
            .iter()
            .find(|(k, _)| *k == "$expand")
            .map(|(_, v)| v.as_str());
        assert_eq!(
            expand,
            Some(
                "proto_timeentry_wonumber_proto_workorder($select=proto_timeentryid,proto_startdatetime,proto_enddatetime,proto_name)"
            )
        );
    }
}
