//! Console reporter: per-target progress lines on stderr-free stdout.

use std::path::Path;
use std::sync::Mutex;

use crossterm::style::Stylize;

use crosspack_core::Reporter;
use crosspack_schema::Target;

/// Prints one line per pipeline event, colorized via crossterm.
///
/// Several target builds report concurrently, so lines are emitted under a
/// lock to keep them whole. `quiet` drops everything except failures.
#[derive(Debug)]
pub struct ConsoleReporter {
    quiet: bool,
    line: Mutex<()>,
}

impl ConsoleReporter {
    /// Create a reporter; `quiet` suppresses all non-failure output.
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            line: Mutex::new(()),
        }
    }

    fn emit(&self, line: &str) {
        let _guard = self.line.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        println!("{line}");
    }
}

impl Reporter for ConsoleReporter {
    fn building(&self, package: &str, target: &Target) {
        if self.quiet {
            return;
        }
        self.emit(&format!(
            "  {} building {} for {}",
            "→".dark_grey(),
            package.to_string().cyan(),
            target.to_string().white()
        ));
    }

    fn archiving(&self, archive_name: &str) {
        if self.quiet {
            return;
        }
        self.emit(&format!(
            "  {} archiving {}",
            "→".dark_grey(),
            archive_name.to_string().cyan()
        ));
    }

    fn built(&self, target: &Target, archive: &Path, size: u64) {
        if self.quiet {
            return;
        }
        self.emit(&format!(
            "{} {} {} ({})",
            "✔".green(),
            target.to_string().white(),
            archive.display().to_string().cyan(),
            format_size(size)
        ));
    }

    fn failed(&self, target: &Target, reason: &str) {
        self.emit(&format!(
            "{} {}\n{reason}",
            "✗".red(),
            target.to_string().white()
        ));
    }

    fn info(&self, msg: &str) {
        if self.quiet {
            return;
        }
        self.emit(msg);
    }
}

/// Human-readable byte size (B / KiB / MiB).
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    }
}
