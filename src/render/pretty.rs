use serde_json::Value;

use crate::colors::ColorScheme;
use crate::flatten::flatten_pairs;
use crate::record::{Level, LogRecord};
use crate::render::Renderer;

/// Structural keys hidden from pretty output
const HIDDEN_KEYS: [&str; 6] = ["time", "pid", "hostname", "req", "res", "responseTime"];

/// Error-related keys listed first among the detail lines
const ERROR_DETAIL_KEYS: [&str; 5] = ["event", "status", "headers", "request", "sentryEventId"];

/// Keys consumed by the header line itself
const HEADER_KEYS: [&str; 3] = ["level", "name", "msg"];

const DETAIL_INDENT: &str = "    ";

/// Human-readable renderer: one header line per record
/// (`LEVEL (name): msg`), followed by indented detail lines for the
/// remaining fields, nested values flattened to dotted paths.
pub struct PrettyRenderer {
    colors: ColorScheme,
}

impl PrettyRenderer {
    pub fn new(use_colors: bool) -> PrettyRenderer {
        PrettyRenderer {
            colors: ColorScheme::new(use_colors),
        }
    }

    fn header(&self, record: &LogRecord) -> String {
        let mut header = String::new();
        if let Some(number) = record.level() {
            match Level::from_number(number) {
                Some(level) => header.push_str(&self.paint_level(level)),
                // outside the fixed domain the raw number stands in
                None => header.push_str(&number.to_string()),
            }
        }
        if let Some(name) = record.name() {
            if !header.is_empty() {
                header.push(' ');
            }
            header.push('(');
            header.push_str(name);
            header.push(')');
        }
        if !header.is_empty() {
            header.push(':');
        }
        if let Some(msg) = record.msg() {
            if !header.is_empty() {
                header.push(' ');
            }
            header.push_str(msg);
        }
        header
    }

    fn paint_level(&self, level: Level) -> String {
        let color = match level {
            Level::Error | Level::Fatal => self.colors.level_error,
            Level::Warn => self.colors.level_warn,
            Level::Info => self.colors.level_info,
            Level::Debug => self.colors.level_debug,
            Level::Trace => self.colors.level_trace,
        };
        let label = level.label().to_uppercase();
        if color.is_empty() {
            label
        } else {
            format!("{}{}{}", color, label, self.colors.reset)
        }
    }

    fn detail_lines(&self, record: &LogRecord, lines: &mut Vec<String>) {
        for key in ERROR_DETAIL_KEYS {
            if let Some(value) = record.get(key) {
                self.push_detail(key, value, lines);
            }
        }
        for (key, value) in record.fields() {
            let key = key.as_str();
            if HIDDEN_KEYS.contains(&key)
                || HEADER_KEYS.contains(&key)
                || ERROR_DETAIL_KEYS.contains(&key)
            {
                continue;
            }
            self.push_detail(key, value, lines);
        }
    }

    fn push_detail(&self, key: &str, value: &Value, lines: &mut Vec<String>) {
        // stack traces print as-is, indented, not as quoted JSON
        if key == "stack" {
            if let Some(stack) = value.as_str() {
                for frame in stack.lines() {
                    lines.push(format!("{}{}", DETAIL_INDENT, frame));
                }
                return;
            }
        }

        match value {
            Value::Object(_) | Value::Array(_) => {
                for (path, leaf) in flatten_pairs(value) {
                    let full = format!("{}.{}", key, path);
                    lines.push(self.detail_line(&full, &leaf));
                }
            }
            scalar => lines.push(self.detail_line(key, scalar)),
        }
    }

    fn detail_line(&self, key: &str, value: &Value) -> String {
        let rendered = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
        if self.colors.key.is_empty() {
            format!("{}{}: {}", DETAIL_INDENT, key, rendered)
        } else {
            format!(
                "{}{}{}{}: {}",
                DETAIL_INDENT, self.colors.key, key, self.colors.reset, rendered
            )
        }
    }
}

impl Renderer for PrettyRenderer {
    fn render_record(&self, record: &LogRecord) -> Option<String> {
        let header = self.header(record);
        let mut lines = Vec::new();
        self.detail_lines(record, &mut lines);

        if header.is_empty() && lines.is_empty() {
            return None;
        }

        let mut out = String::new();
        if !header.is_empty() {
            out.push_str(&header);
            out.push('\n');
        }
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        Some(out)
    }
}
