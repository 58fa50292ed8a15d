// src/record.rs
use serde_json::{Map, Value};

/// Numeric severity domain used by the upstream logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    pub fn from_number(number: i64) -> Option<Level> {
        match number {
            10 => Some(Level::Trace),
            20 => Some(Level::Debug),
            30 => Some(Level::Info),
            40 => Some(Level::Warn),
            50 => Some(Level::Error),
            60 => Some(Level::Fatal),
            _ => None,
        }
    }

    pub const fn number(self) -> i64 {
        match self {
            Level::Trace => 10,
            Level::Debug => 20,
            Level::Info => 30,
            Level::Warn => 40,
            Level::Error => 50,
            Level::Fatal => 60,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Paths tried in order when resolving the account behind a webhook payload.
/// First non-empty login wins.
const LOGIN_PATHS: [&[&str]; 3] = [
    &["installation", "account", "login"],
    &["organization", "login"],
    &["repository", "owner", "login"],
];

const INSTALLATION_ID_PATH: [&str; 2] = ["installation", "id"];

/// Locations where a webhook payload may live on a record
const PAYLOAD_PATHS: [&[&str]; 2] = [&["event", "payload"], &["err", "event", "payload"]];

/// Walk a dotted path into a value, stopping at the first missing segment
pub fn lookup_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for segment in path {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Account identity resolved from a webhook payload
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Identity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Resolve the account behind a payload: the installation account takes
/// precedence, then the organization, then the repository owner.
pub fn resolve_identity(payload: &Value) -> Identity {
    let username = LOGIN_PATHS.iter().find_map(|path| {
        lookup_path(payload, path)
            .and_then(Value::as_str)
            .filter(|login| !login.is_empty())
            .map(str::to_string)
    });
    let id = lookup_path(payload, &INSTALLATION_ID_PATH).cloned();
    Identity { id, username }
}

/// One structured log record. Field order is preserved from the input line
/// so re-serialization round-trips byte-for-byte apart from rewrites.
#[derive(Debug, Clone)]
pub struct LogRecord {
    fields: Map<String, Value>,
}

impl LogRecord {
    /// Parse one line into a record. The line must be a JSON object.
    pub fn parse(line: &str) -> Result<LogRecord, String> {
        let value: Value =
            serde_json::from_str(line.trim()).map_err(|e| format!("invalid JSON: {}", e))?;
        match value {
            Value::Object(fields) => Ok(LogRecord { fields }),
            _ => Err("record is not a JSON object".to_string()),
        }
    }

    pub fn from_fields(fields: Map<String, Value>) -> LogRecord {
        LogRecord { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    pub fn level(&self) -> Option<i64> {
        self.fields.get("level").and_then(Value::as_i64)
    }

    pub fn msg(&self) -> Option<&str> {
        self.fields.get("msg").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// Error-class fields live at the top level on serialized errors, or
    /// nested under `err` when the logger attached the error as a child.
    pub fn error_field(&self, key: &str) -> Option<&Value> {
        self.fields
            .get(key)
            .or_else(|| self.fields.get("err").and_then(|err| err.get(key)))
    }

    /// The webhook payload carried by the record, wherever it lives
    pub fn webhook_payload(&self) -> Option<&Value> {
        PAYLOAD_PATHS.iter().find_map(|path| self.path(path))
    }

    fn path(&self, segments: &[&str]) -> Option<&Value> {
        let (first, rest) = segments.split_first()?;
        lookup_path(self.fields.get(*first)?, rest)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.fields).unwrap_or_else(|_| "null".to_string())
    }

    /// Serialize with the numeric level replaced by its name. Levels outside
    /// the fixed domain stay numeric.
    pub fn to_json_with_level_name(&self) -> String {
        let mut fields = self.fields.clone();
        if let Some(level) = self.level().and_then(Level::from_number) {
            fields.insert(
                "level".to_string(),
                Value::String(level.label().to_string()),
            );
        }
        serde_json::to_string(&fields).unwrap_or_else(|_| "null".to_string())
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
    fn level_mapping_covers_the_fixed_domain() {
        assert_eq!(Level::from_number(10), Some(Level::Trace));
        assert_eq!(Level::from_number(30), Some(Level::Info));
        assert_eq!(Level::from_number(60), Some(Level::Fatal));
        assert_eq!(Level::from_number(35), None);
        assert_eq!(Level::Error.number(), 50);
        assert_eq!(Level::Warn.label(), "warn");
    }

    #[test]
    fn parse_requires_a_json_object() {
        assert!(LogRecord::parse(r#"{"level":30,"msg":"ok"}"#).is_ok());
        assert!(LogRecord::parse("[1,2,3]").is_err());
        assert!(LogRecord::parse("not json").is_err());
        assert!(LogRecord::parse("").is_err());
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let record = LogRecord::parse("  {\"level\":30}  \n").unwrap();
        assert_eq!(record.level(), Some(30));
    }

    #[test]
    fn error_field_falls_back_to_err() {
        let top = record(json!({"type": "Error", "msg": "boom"}));
        assert_eq!(top.error_field("type"), Some(&json!("Error")));

        let nested = record(json!({"err": {"type": "TypeError", "stack": "trace"}}));
        assert_eq!(nested.error_field("type"), Some(&json!("TypeError")));
        assert_eq!(nested.error_field("stack"), Some(&json!("trace")));
        assert_eq!(nested.error_field("status"), None);
    }

    #[test]
    fn payload_found_at_either_location() {
        let direct = record(json!({"event": {"payload": {"a": 1}}}));
        assert_eq!(direct.webhook_payload(), Some(&json!({"a": 1})));

        let nested = record(json!({"err": {"event": {"payload": {"b": 2}}}}));
        assert_eq!(nested.webhook_payload(), Some(&json!({"b": 2})));

        let none = record(json!({"msg": "hello"}));
        assert_eq!(none.webhook_payload(), None);
    }

    #[test]
    fn identity_prefers_installation_account() {
        let payload = json!({
            "installation": {"id": 456, "account": {"login": "acct"}},
            "organization": {"login": "org"},
            "repository": {"owner": {"login": "owner"}}
        });
        let identity = resolve_identity(&payload);
        assert_eq!(identity.username.as_deref(), Some("acct"));
        assert_eq!(identity.id, Some(json!(456)));
    }

    #[test]
    fn identity_falls_back_through_the_precedence_list() {
        let payload = json!({
            "organization": {"login": "org"},
            "repository": {"owner": {"login": "owner"}}
        });
        assert_eq!(resolve_identity(&payload).username.as_deref(), Some("org"));

        let payload = json!({"repository": {"owner": {"login": "owner"}}});
        assert_eq!(resolve_identity(&payload).username.as_deref(), Some("owner"));
    }

    #[test]
    fn empty_logins_do_not_win() {
        let payload = json!({
            "installation": {"account": {"login": ""}},
            "organization": {"login": "org"}
        });
        assert_eq!(resolve_identity(&payload).username.as_deref(), Some("org"));
    }

    #[test]
    fn identity_without_any_login_is_empty() {
        let payload = json!({"installation": {"id": 7}});
        let identity = resolve_identity(&payload);
        assert_eq!(identity.username, None);
        assert_eq!(identity.id, Some(json!(7)));
    }

    #[test]
    fn level_name_substitution_preserves_field_order() {
        let record = LogRecord::parse(r#"{"level":30,"time":1,"msg":"hi"}"#).unwrap();
        assert_eq!(
            record.to_json_with_level_name(),
            r#"{"level":"info","time":1,"msg":"hi"}"#
        );
    }

    #[test]
    fn unknown_levels_stay_numeric() {
        let record = LogRecord::parse(r#"{"level":35,"msg":"custom"}"#).unwrap();
        assert_eq!(
            record.to_json_with_level_name(),
            r#"{"level":35,"msg":"custom"}"#
        );
    }
}
