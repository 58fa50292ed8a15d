// src/escalate.rs
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::record::{resolve_identity, Identity, LogRecord};

/// Records at or above this level are reported when a sink is configured.
/// Domain constant, not configurable: 50 = error, 60 = fatal.
pub const ESCALATION_THRESHOLD: i64 = 50;

/// Keys copied from a severe record into the reporting extras, in order
const EXTRA_KEYS: [&str; 4] = ["event", "headers", "request", "status"];

/// Severity label attached to one escalation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Fatal,
}

impl Severity {
    /// Level 50 maps to error, everything above to fatal
    pub fn from_level(level: i64) -> Severity {
        if level == 50 {
            Severity::Error
        } else {
            Severity::Fatal
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }
}

/// Escalate iff a sink is configured and the record is severe enough.
/// With reporting disabled every record passes through regardless of level.
pub fn should_escalate(record: &LogRecord, sink_enabled: bool) -> bool {
    sink_enabled
        && record
            .level()
            .is_some_and(|level| level >= ESCALATION_THRESHOLD)
}

/// Context for one sink submission, built as a value before the call.
/// Only keys present on the record are copied; absent keys are omitted,
/// never set to null.
#[derive(Debug, Clone)]
pub struct ReportingContext {
    pub severity: Severity,
    pub user: Option<Identity>,
    pub extras: IndexMap<String, Value>,
}

impl ReportingContext {
    pub fn from_record(record: &LogRecord) -> ReportingContext {
        let severity = record.level().map_or(Severity::Fatal, Severity::from_level);

        let mut extras = IndexMap::new();
        for key in EXTRA_KEYS {
            if let Some(value) = record.get(key) {
                extras.insert(key.to_string(), value.clone());
            }
        }

        let user = record.webhook_payload().map(resolve_identity);

        ReportingContext {
            severity,
            user,
            extras,
        }
    }
}

/// Error value submitted to the sink in place of a native exception
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SyntheticError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl SyntheticError {
    pub fn from_record(record: &LogRecord) -> SyntheticError {
        SyntheticError {
            message: record.msg().map(str::to_string),
            name: record
                .error_field("type")
                .and_then(Value::as_str)
                .map(str::to_string),
            stack: record
                .error_field("stack")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// Rewrite a reported record to its reduced reference form: `event` keeps
/// only its id, `request` keeps only method and url, and the correlation id
/// is attached when the sink returned one. All other fields stay untouched.
pub fn apply_escalation(record: &mut LogRecord, correlation_id: Option<&str>) {
    if let Some(event) = record.get("event").cloned() {
        let mut reduced = Map::new();
        if let Some(id) = event.get("id") {
            reduced.insert("id".to_string(), id.clone());
        }
        record.set("event", Value::Object(reduced));
    }

    if let Some(request) = record.get("request").cloned() {
        let mut reduced = Map::new();
        for key in ["method", "url"] {
            if let Some(value) = request.get(key) {
                reduced.insert(key.to_string(), value.clone());
            }
        }
        record.set("request", Value::Object(reduced));
    }

    if let Some(id) = correlation_id {
        record.set("sentryEventId", Value::String(id.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> LogRecord {
        match value {
            Value::Object(fields) => LogRecord::from_fields(fields),
            _ => panic!("test records must be objects"),
        }
    }

    #[test]
    fn severity_maps_fifty_to_error_and_above_to_fatal() {
        assert_eq!(Severity::from_level(50), Severity::Error);
        assert_eq!(Severity::from_level(60), Severity::Fatal);
        assert_eq!(Severity::from_level(55), Severity::Fatal);
        assert_eq!(Severity::Error.label(), "error");
        assert_eq!(Severity::Fatal.label(), "fatal");
    }

    #[test]
    fn classification_requires_a_sink() {
        let severe = record(json!({"level": 50}));
        assert!(should_escalate(&severe, true));
        assert!(!should_escalate(&severe, false));

        let info = record(json!({"level": 30}));
        assert!(!should_escalate(&info, true));

        let unleveled = record(json!({"msg": "no level"}));
        assert!(!should_escalate(&unleveled, true));
    }

    #[test]
    fn extras_copy_only_present_keys_in_order() {
        let record = record(json!({
            "level": 50,
            "status": 500,
            "event": {"id": "123"},
            "unrelated": true
        }));
        let context = ReportingContext::from_record(&record);

        let keys: Vec<&str> = context.extras.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["event", "status"]);
        assert_eq!(context.extras["status"], json!(500));
    }

    #[test]
    fn user_is_set_only_when_a_payload_exists() {
        let plain = record(json!({"level": 50, "msg": "boom"}));
        assert!(ReportingContext::from_record(&plain).user.is_none());

        let with_payload = record(json!({
            "level": 50,
            "event": {"payload": {
                "installation": {"id": 456, "account": {"login": "acct"}}
            }}
        }));
        let context = ReportingContext::from_record(&with_payload);
        let user = context.user.expect("payload should produce a user");
        assert_eq!(user.username.as_deref(), Some("acct"));
        assert_eq!(user.id, Some(json!(456)));
    }

    #[test]
    fn synthetic_error_reads_nested_err_fields() {
        let top = record(json!({"msg": "Oops", "type": "Error", "stack": "line1"}));
        let error = SyntheticError::from_record(&top);
        assert_eq!(error.message.as_deref(), Some("Oops"));
        assert_eq!(error.name.as_deref(), Some("Error"));
        assert_eq!(error.stack.as_deref(), Some("line1"));

        let nested = record(json!({"msg": "Oops", "err": {"type": "TypeError", "stack": "t"}}));
        let error = SyntheticError::from_record(&nested);
        assert_eq!(error.name.as_deref(), Some("TypeError"));
        assert_eq!(error.stack.as_deref(), Some("t"));
    }

    #[test]
    fn escalation_reduces_event_and_request() {
        let mut record = record(json!({
            "level": 50,
            "event": {"id": "123", "event": "push", "payload": {"big": true}},
            "request": {"method": "GET", "url": "https://x", "headers": {"a": "b"}},
            "headers": {"kept": "yes"}
        }));
        apply_escalation(&mut record, Some("abc"));

        assert_eq!(record.get("event"), Some(&json!({"id": "123"})));
        assert_eq!(
            record.get("request"),
            Some(&json!({"method": "GET", "url": "https://x"}))
        );
        // untouched outside the two reductions
        assert_eq!(record.get("headers"), Some(&json!({"kept": "yes"})));
        assert_eq!(record.get("sentryEventId"), Some(&json!("abc")));
    }

    #[test]
    fn reduction_handles_missing_subfields() {
        let mut record = record(json!({
            "level": 50,
            "event": {"event": "push"},
            "request": {"url": "https://x"}
        }));
        apply_escalation(&mut record, None);

        assert_eq!(record.get("event"), Some(&json!({})));
        assert_eq!(record.get("request"), Some(&json!({"url": "https://x"})));
        assert_eq!(record.get("sentryEventId"), None);
    }
}
