// src/tty.rs
use is_terminal::IsTerminal;
use once_cell::sync::Lazy;

/// Environment override for color output, read once per process.
/// NO_COLOR and TERM=dumb both force colors off.
static ENV_COLOR_OVERRIDE: Lazy<Option<bool>> = Lazy::new(|| {
    if std::env::var_os("NO_COLOR").is_some() {
        return Some(false);
    }
    match std::env::var("TERM") {
        Ok(term) if term == "dumb" => Some(false),
        _ => None,
    }
});

/// Decide whether stdout output should be colored
pub fn should_use_colors() -> bool {
    if let Some(forced) = *ENV_COLOR_OVERRIDE {
        return forced;
    }
    std::io::stdout().is_terminal()
}
