/// ANSI color codes for pretty output formatting
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub key: &'static str,         // Cyan for detail field names
    pub level_error: &'static str, // Red for error/fatal levels
    pub level_warn: &'static str,  // Yellow for warn levels
    pub level_info: &'static str,  // Green for info levels
    pub level_debug: &'static str, // Gray for debug levels
    pub level_trace: &'static str, // Cyan for trace levels
    pub reset: &'static str,       // Reset to default color
}

impl ColorScheme {
    pub fn new(use_colors: bool) -> Self {
        if use_colors {
            Self {
                key: "\x1b[36m",         // Cyan for field names
                level_error: "\x1b[31m", // Red for error levels
                level_warn: "\x1b[33m",  // Yellow for warning levels
                level_info: "\x1b[32m",  // Green for info levels
                level_debug: "\x1b[90m", // Gray for debug levels
                level_trace: "\x1b[36m", // Cyan for trace levels
                reset: "\x1b[0m",        // Reset
            }
        } else {
            // All empty strings for no-color mode
            Self {
                key: "",
                level_error: "",
                level_warn: "",
                level_info: "",
                level_debug: "",
                level_trace: "",
                reset: "",
            }
        }
    }
}
