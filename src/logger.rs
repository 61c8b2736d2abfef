//! Logging and verbosity control.
//!
//! A single global logger with three verbosity levels:
//! - Quiet: only results and errors
//! - Normal: progress messages without prefixes (default)
//! - Verbose: timestamped colored logs, including debug detail from the
//!   scaling and geometry code
//!
//! Library code logs through the free functions in this module. They do
//! nothing until [`Logger::init`] has been called, so the library stays
//! silent when embedded.

use std::sync::OnceLock;
use std::time::Instant;

/// Verbosity level for controlling output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Only results and errors
    Quiet,
    /// Progress messages without prefixes (default)
    Normal,
    /// Timestamped colored logs with details
    Verbose,
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Thread-safe logger for controlling application output.
#[derive(Debug)]
pub struct Logger {
    level: VerbosityLevel,
    colors_enabled: bool,
}

impl Logger {
    /// Initialize the global logger with the specified verbosity level.
    ///
    /// Later calls are ignored; the first configuration wins.
    pub fn init(level: VerbosityLevel, no_color: bool) {
        let colors_enabled = !no_color
            && std::env::var("NO_COLOR").is_err()
            && atty::is(atty::Stream::Stdout);

        START_TIME.set(Instant::now()).ok();
        LOGGER.set(Logger { level, colors_enabled }).ok();
    }

    /// Get the global logger instance, if one was initialized.
    pub fn instance() -> Option<&'static Logger> {
        LOGGER.get()
    }

    fn elapsed(&self) -> f64 {
        START_TIME
            .get()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Returns true if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.level == VerbosityLevel::Verbose
    }

    /// Returns true if quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.level == VerbosityLevel::Quiet
    }

    pub fn level(&self) -> VerbosityLevel {
        self.level
    }

    fn format_with_level(&self, level: &str, msg: &str) -> String {
        let elapsed = self.elapsed();
        if self.colors_enabled {
            let level_color = match level {
                "ERROR" => "\x1b[31m",
                "WARN" => "\x1b[33m",
                "INFO" => "\x1b[34m",
                "DEBUG" => "\x1b[90m",
                _ => "",
            };
            format!(
                "\x1b[90m[{:.2}s]\x1b[0m {}[{}]\x1b[0m {}",
                elapsed, level_color, level, msg
            )
        } else {
            format!("[{:.2}s] [{}] {}", elapsed, level, msg)
        }
    }

    /// Log an error message (always displayed, on stderr).
    pub fn error(&self, msg: &str) {
        if self.level == VerbosityLevel::Verbose {
            eprintln!("{}", self.format_with_level("ERROR", msg));
        } else {
            eprintln!("Error: {}", msg);
        }
    }

    /// Log a warning message (normal and verbose modes, on stderr).
    ///
    /// Warnings go to stderr so they never mix with command results.
    pub fn warn(&self, msg: &str) {
        match self.level {
            VerbosityLevel::Quiet => {}
            VerbosityLevel::Normal => eprintln!("Warning: {}", msg),
            VerbosityLevel::Verbose => eprintln!("{}", self.format_with_level("WARN", msg)),
        }
    }

    /// Report a written file (quiet: just the path, normal: message, verbose: with prefix).
    pub fn output(&self, path: &str) {
        match self.level {
            VerbosityLevel::Quiet => println!("{}", path),
            VerbosityLevel::Normal => println!("Saved: {}", path),
            VerbosityLevel::Verbose => {
                println!("{}", self.format_with_level("INFO", &format!("Saved: {}", path)))
            }
        }
    }

    /// Log an info message (displayed in normal mode and above).
    pub fn info(&self, msg: &str) {
        match self.level {
            VerbosityLevel::Quiet => {}
            VerbosityLevel::Normal => println!("{}", msg),
            VerbosityLevel::Verbose => println!("{}", self.format_with_level("INFO", msg)),
        }
    }

    /// Log a debug message (displayed only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if self.level == VerbosityLevel::Verbose {
            println!("{}", self.format_with_level("DEBUG", msg));
        }
    }
}

/// Log an error message (always displayed).
pub fn error(msg: &str) {
    match Logger::instance() {
        Some(logger) => logger.error(msg),
        None => eprintln!("Error: {}", msg),
    }
}

/// Log a warning message (normal and verbose modes).
pub fn warn(msg: &str) {
    if let Some(logger) = Logger::instance() {
        logger.warn(msg);
    }
}

/// Report a written file.
pub fn output(path: &str) {
    if let Some(logger) = Logger::instance() {
        logger.output(path);
    }
}

/// Log an info message (displayed in normal mode and above).
pub fn info(msg: &str) {
    if let Some(logger) = Logger::instance() {
        logger.info(msg);
    }
}

/// Log a debug message (displayed only in verbose mode).
pub fn debug(msg: &str) {
    if let Some(logger) = Logger::instance() {
        logger.debug(msg);
    }
}

/// Returns true if the logger is initialized in quiet mode.
pub fn is_quiet() -> bool {
    Logger::instance().is_some_and(Logger::is_quiet)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger(level: VerbosityLevel) -> Logger {
        Logger {
            level,
            colors_enabled: false,
        }
    }

    #[test]
    fn test_verbosity_level_ordering() {
        assert!((VerbosityLevel::Quiet as i32) < (VerbosityLevel::Normal as i32));
        assert!((VerbosityLevel::Normal as i32) < (VerbosityLevel::Verbose as i32));
    }

    #[test]
    fn test_logger_is_verbose() {
        assert!(!logger(VerbosityLevel::Quiet).is_verbose());
        assert!(!logger(VerbosityLevel::Normal).is_verbose());
        assert!(logger(VerbosityLevel::Verbose).is_verbose());
    }

    #[test]
    fn test_logger_is_quiet() {
        assert!(logger(VerbosityLevel::Quiet).is_quiet());
        assert!(!logger(VerbosityLevel::Normal).is_quiet());
        assert!(!logger(VerbosityLevel::Verbose).is_quiet());
    }

    #[test]
    fn test_logger_level() {
        assert_eq!(logger(VerbosityLevel::Quiet).level(), VerbosityLevel::Quiet);
    }

    #[test]
    fn test_plain_format_has_level_prefix() {
        let line = logger(VerbosityLevel::Verbose).format_with_level("DEBUG", "factor 4");
        assert!(line.contains("[DEBUG] factor 4"));
        assert!(!line.contains("\x1b["));
    }

    #[test]
    fn test_colored_format_wraps_level() {
        let colored = Logger {
            level: VerbosityLevel::Verbose,
            colors_enabled: true,
        };
        let line = colored.format_with_level("WARN", "odd literal");
        assert!(line.contains("\x1b[33m[WARN]"));
    }

    #[test]
    fn test_free_functions_without_init_do_not_panic() {
        // The test binary never calls `Logger::init`.
        debug("ignored");
        info("ignored");
        warn("ignored");
        assert!(!is_quiet());
    }
}
