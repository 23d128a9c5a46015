//! Output formatting for the CLI
//!
//! Results go to stdout as JSON; messages and diagnostics go to stderr,
//! colored unless disabled.

use colored::Colorize;
use junos_provider::schema::{Diagnostic, Severity};
use serde::Serialize;
use std::io::{self, Write};

/// Output formatter
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();
        colored::control::set_override(use_color);

        Self {
            use_color,
            verbosity,
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print an info message (shown with -v)
    pub fn info(&self, message: &str) {
        if self.verbosity < 1 {
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "INFO:".blue(), message);
        } else {
            eprintln!("INFO: {}", message);
        }
    }

    /// Print a debug message (shown with -vv)
    pub fn debug(&self, message: &str) {
        if self.verbosity < 2 {
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "DEBUG:".magenta(), message);
        } else {
            eprintln!("DEBUG: {}", message);
        }
    }

    /// Print one diagnostic
    pub fn diagnostic(&self, diag: &Diagnostic) {
        let message = if diag.detail.is_empty() {
            diag.summary.clone()
        } else if self.use_color {
            format!("{}: {}", diag.summary.bold(), diag.detail)
        } else {
            format!("{}: {}", diag.summary, diag.detail)
        };
        match diag.severity {
            Severity::Error => self.error(&message),
            Severity::Warning => self.warning(&message),
        }
    }

    /// Print diagnostics in order
    pub fn diagnostics(&self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.diagnostic(diag);
        }
    }

    /// Print a value as pretty JSON on stdout
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<()> {
        let rendered = serde_json::to_string_pretty(value)?;
        println!("{}", rendered);
        Ok(())
    }

    /// Print plain lines on stdout
    pub fn lines(&self, lines: &[String]) {
        for line in lines {
            println!("{}", line);
        }
    }

    /// Flush output buffers
    pub fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_color_override() {
        let output = OutputFormatter::new(false, 0);
        assert!(!output.use_color);
    }

    #[test]
    fn test_diagnostic_without_detail() {
        let output = OutputFormatter::new(false, 0);
        output.diagnostic(&Diagnostic::warning("commit warning", ""));
        output.flush();
    }
}
