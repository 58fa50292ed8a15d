// src/lib.rs
pub mod colors;
pub mod config;
pub mod error;
pub mod escalate;
pub mod flatten;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod sink;
pub mod tty;

pub use error::*;
pub use pipeline::*;

pub use config::{ColorChoice, OutputMode, PipelineConfig};
pub use escalate::{ReportingContext, Severity, SyntheticError, ESCALATION_THRESHOLD};
pub use record::{Level, LogRecord};
pub use render::{PrettyRenderer, Renderer};
pub use sink::{CaptureClient, Dsn, ReportingSink, SinkOptions};
