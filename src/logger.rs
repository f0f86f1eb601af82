//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - [`Logger`], a cloneable handle carried by the pipeline context that
//!   adds warning accounting and namespaced debug output
//!
//! # Example
//!
//! ```ignore
//! // Simple logging
//! log!("build"; "wrote {} pages", count);
//!
//! // Through the context handle
//! let logger = Logger::new(DebugFilter::parse("pages,hmr"));
//! logger.debug("pages", format_args!("{} files", files.len()));
//! logger.warn("no home page found");
//! ```

use colored::{ColoredString, Colorize};
use crossterm::{
    execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    fmt,
    io::{Write, stdout},
    sync::{
        Arc, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Length of brackets around module name: "[]"
const BRACKET_LEN: usize = 2;
/// Space after prefix: "[module] " <- this space
const SPACE_AFTER_PREFIX: usize = 1;

/// Calculate total prefix length for a module name.
///
/// Returns: `module.len() + 3` (for `[`, `]`, and trailing space)
#[inline]
const fn calc_prefix_len(module_len: usize) -> usize {
    module_len + BRACKET_LEN + SPACE_AFTER_PREFIX
}

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails.
fn get_terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

// ============================================================================
// Debug Filter
// ============================================================================

/// Which debug namespaces are printed.
///
/// Parsed from the `debug` option: `true` enables everything, a string
/// enables a comma-separated list of namespaces (`pages,hmr`), where a
/// trailing `*` matches any namespace with that prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DebugFilter {
    #[default]
    Off,
    All,
    Namespaces(Vec<String>),
}

impl DebugFilter {
    pub fn parse(value: &str) -> Self {
        let names: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();

        if names.is_empty() {
            Self::Off
        } else if names.iter().any(|n| n == "*") {
            Self::All
        } else {
            Self::Namespaces(names)
        }
    }

    pub fn enabled(&self, namespace: &str) -> bool {
        match self {
            Self::Off => false,
            Self::All => true,
            Self::Namespaces(names) => names.iter().any(|name| match name.strip_suffix('*') {
                Some(prefix) => namespace.starts_with(prefix),
                None => name == namespace,
            }),
        }
    }
}

// ============================================================================
// Logger Handle
// ============================================================================

/// Logger handle threaded through the pipeline context.
///
/// Clones share the warning counter.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    filter: DebugFilter,
    warnings: Arc<AtomicUsize>,
}

impl Logger {
    pub fn new(filter: DebugFilter) -> Self {
        Self {
            filter,
            warnings: Arc::default(),
        }
    }

    pub fn filter(&self) -> &DebugFilter {
        &self.filter
    }

    pub fn info(&self, module: &str, message: impl fmt::Display) {
        log(module, &message.to_string());
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
        log("warn", &message.to_string());
    }

    pub fn error(&self, message: impl fmt::Display) {
        log("error", &message.to_string());
    }

    /// Print under `debug:<namespace>` when the namespace is enabled.
    pub fn debug(&self, namespace: &str, message: impl fmt::Display) {
        if self.filter.enabled(namespace) {
            log(&format!("debug:{namespace}"), &message.to_string());
        }
    }

    /// Number of warnings emitted through this handle (and its clones).
    pub fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix.
///
/// Automatically truncates long messages to fit terminal width.
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);
    let width = get_terminal_width() as usize;

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();

    let prefix_len = calc_prefix_len(module.len());
    let max_msg_len = width.saturating_sub(prefix_len);
    let message = truncate_str(message, max_msg_len);

    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "serve" | "hmr" => prefix.bright_blue().bold(),
        "watch" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        "warn" => prefix.bright_magenta().bold(),
        m if m.starts_with("debug:") => prefix.dimmed(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to fit within `max_len` bytes.
///
/// Ensures the result is valid UTF-8 by finding the nearest character boundary.
#[inline]
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_prefix_len() {
        // "pages" -> "[pages] " = 5 + 2 + 1 = 8
        assert_eq!(calc_prefix_len(5), 8);
        assert_eq!(calc_prefix_len(0), 3);
    }

    #[test]
    fn test_truncate_str_ascii() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 5), "hello");
        assert_eq!(truncate_str("hello", 0), "");
    }

    #[test]
    fn test_truncate_str_unicode_boundary() {
        // "你好" is 6 bytes; byte 4 is inside the second char
        assert_eq!(truncate_str("你好", 4), "你");
        assert_eq!(truncate_str("a你b", 3), "a");
    }

    #[test]
    fn test_debug_filter_parse() {
        assert_eq!(DebugFilter::parse(""), DebugFilter::Off);
        assert_eq!(DebugFilter::parse("*"), DebugFilter::All);
        assert_eq!(
            DebugFilter::parse("pages, hmr"),
            DebugFilter::Namespaces(vec!["pages".into(), "hmr".into()])
        );
    }

    #[test]
    fn test_debug_filter_enabled() {
        let filter = DebugFilter::parse("pages,sub*");
        assert!(filter.enabled("pages"));
        assert!(filter.enabled("sub-pages"));
        assert!(!filter.enabled("hmr"));

        assert!(DebugFilter::All.enabled("anything"));
        assert!(!DebugFilter::Off.enabled("pages"));
    }

    #[test]
    fn test_warning_count_shared_between_clones() {
        let logger = Logger::default();
        let clone = logger.clone();
        logger.warn("first");
        clone.warn("second");
        assert_eq!(logger.warning_count(), 2);
    }
}
