/// Output shape selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable rendering via the pretty renderer
    Pretty,
    /// JSON passthrough, numeric level
    Json,
    /// JSON with the numeric level replaced by its name
    JsonLevelName,
}

impl OutputMode {
    /// Resolve the mode the way the upstream configuration contract defines it:
    /// `"json"` selects the JSON modes, anything else selects pretty output.
    pub fn resolve(log_format: Option<&str>, level_in_string: bool) -> OutputMode {
        if log_format == Some("json") {
            if level_in_string {
                OutputMode::JsonLevelName
            } else {
                OutputMode::Json
            }
        } else {
            OutputMode::Pretty
        }
    }
}

/// Color preference for pretty output
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    #[value(name = "auto", help = "Color when stdout is a terminal")]
    Auto,
    #[value(name = "always")]
    Always,
    #[value(name = "never")]
    Never,
}

impl ColorChoice {
    /// `None` means auto-detect at pipeline construction time
    pub fn enabled(self) -> Option<bool> {
        match self {
            ColorChoice::Auto => None,
            ColorChoice::Always => Some(true),
            ColorChoice::Never => Some(false),
        }
    }
}

/// Configuration for pipeline behavior
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mode: OutputMode,
    /// `None` = auto-detect, `Some(true/false)` = forced
    pub color: Option<bool>,
    pub buffer_size: usize,
    pub max_line_length: usize,
    pub debug: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            mode: OutputMode::Pretty,
            color: Some(false),
            buffer_size: 65536,       // 64KB
            max_line_length: 1048576, // 1MB
            debug: false,
        }
    }
}
