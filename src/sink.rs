// src/sink.rs
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::SinkError;
use crate::escalate::{ReportingContext, SyntheticError};

/// Deep enough to carry the largest webhook payloads without copying
/// unbounded nesting onto the wire.
pub const DEFAULT_NORMALIZE_DEPTH: usize = 6;

/// Destination handle for escalated records. Constructed once, injected
/// into the pipeline; there is no lazy global client.
pub trait ReportingSink: Send + Sync {
    /// Submit one reporting context and return the correlation id assigned
    /// to the captured event.
    fn submit(
        &self,
        context: &ReportingContext,
        error: &SyntheticError,
    ) -> Result<String, SinkError>;
}

/// Parsed `scheme://key@host/project` data source name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    pub scheme: String,
    pub public_key: String,
    pub host: String,
    pub project_id: String,
}

impl std::str::FromStr for Dsn {
    type Err = SinkError;

    fn from_str(s: &str) -> Result<Dsn, SinkError> {
        let invalid = || SinkError::InvalidDsn(s.to_string());
        let (scheme, rest) = s.split_once("://").ok_or_else(invalid)?;
        let (public_key, rest) = rest.split_once('@').ok_or_else(invalid)?;
        let (host, project_id) = rest.rsplit_once('/').ok_or_else(invalid)?;
        if scheme.is_empty() || public_key.is_empty() || host.is_empty() || project_id.is_empty() {
            return Err(invalid());
        }
        Ok(Dsn {
            scheme: scheme.to_string(),
            public_key: public_key.to_string(),
            host: host.to_string(),
            project_id: project_id.to_string(),
        })
    }
}

impl std::fmt::Display for Dsn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}://{}@{}/{}",
            self.scheme, self.public_key, self.host, self.project_id
        )
    }
}

/// Connection settings for the error-tracking service
#[derive(Debug, Clone)]
pub struct SinkOptions {
    pub dsn: Dsn,
    pub normalize_depth: usize,
}

impl SinkOptions {
    pub fn new(dsn: Dsn) -> SinkOptions {
        SinkOptions {
            dsn,
            normalize_depth: DEFAULT_NORMALIZE_DEPTH,
        }
    }
}

/// Copy a value, replacing anything nested deeper than `depth` container
/// levels with a placeholder string.
pub fn normalize_value(value: &Value, depth: usize) -> Value {
    match value {
        Value::Object(map) => {
            if depth == 0 {
                return Value::String("[Object]".to_string());
            }
            Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), normalize_value(value, depth - 1)))
                    .collect(),
            )
        }
        Value::Array(items) => {
            if depth == 0 {
                return Value::String("[Array]".to_string());
            }
            Value::Array(
                items
                    .iter()
                    .map(|value| normalize_value(value, depth - 1))
                    .collect(),
            )
        }
        other => other.clone(),
    }
}

/// Assemble the wire event for one submission
pub fn build_event(
    event_id: &str,
    context: &ReportingContext,
    error: &SyntheticError,
    normalize_depth: usize,
) -> Result<Value, SinkError> {
    let mut event = Map::new();
    event.insert("event_id".to_string(), Value::String(event_id.to_string()));
    event.insert(
        "level".to_string(),
        Value::String(context.severity.label().to_string()),
    );

    if let Some(user) = &context.user {
        event.insert("user".to_string(), serde_json::to_value(user)?);
    }

    let mut extra = Map::new();
    for (key, value) in &context.extras {
        extra.insert(key.clone(), normalize_value(value, normalize_depth));
    }
    event.insert("extra".to_string(), Value::Object(extra));

    let mut exception = Map::new();
    if let Some(name) = &error.name {
        exception.insert("type".to_string(), Value::String(name.clone()));
    }
    if let Some(message) = &error.message {
        exception.insert("value".to_string(), Value::String(message.clone()));
    }
    if let Some(stack) = &error.stack {
        exception.insert("stacktrace".to_string(), Value::String(stack.clone()));
    }
    event.insert("exception".to_string(), Value::Object(exception));

    Ok(Value::Object(event))
}

/// In-process capture client: assigns correlation ids and serializes the
/// event that would go on the wire to the injected writer, one JSON line
/// per submission. Shipping the event bytes anywhere is the operator's
/// concern, not the pipeline's.
pub struct CaptureClient {
    options: SinkOptions,
    writer: Mutex<Box<dyn Write + Send>>,
    submitted: AtomicU64,
}

impl CaptureClient {
    pub fn new(options: SinkOptions, writer: Box<dyn Write + Send>) -> CaptureClient {
        CaptureClient {
            options,
            writer: Mutex::new(writer),
            submitted: AtomicU64::new(0),
        }
    }

    /// Capture client writing events to stderr
    pub fn stderr(options: SinkOptions) -> CaptureClient {
        CaptureClient::new(options, Box::new(std::io::stderr()))
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }
}

impl ReportingSink for CaptureClient {
    fn submit(
        &self,
        context: &ReportingContext,
        error: &SyntheticError,
    ) -> Result<String, SinkError> {
        let event_id = Uuid::new_v4().simple().to_string();
        let event = build_event(&event_id, context, error, self.options.normalize_depth)?;

        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        serde_json::to_writer(&mut *writer, &event)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        self.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(event_id)
    }
}
