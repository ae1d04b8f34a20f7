//! Live progress and diagnostics for CLI conversions.

use crate::error::describe_error;
use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressState;
use indicatif::ProgressStyle;
use std::fmt::Write;
use std::path::PathBuf;
use std::time::Duration;
use tarzip_core::ProgressCallback;
use tarzip_core::TranscodeError;

/// How much the CLI prints while a file is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    /// Nothing live; everything ends up in the JSON document.
    Silent,
    /// Errors only.
    Quiet,
    /// Skip diagnostics, warnings and errors.
    Normal,
    /// Everything, including one line per entry.
    Verbose,
}

impl Echo {
    pub const fn from_flags(json: bool, verbose: bool, quiet: bool) -> Self {
        if json {
            Self::Silent
        } else if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }
}

/// CLI implementation of `ProgressCallback`.
///
/// Prints entry diagnostics as they happen and, on a TTY in normal mode,
/// shows a spinner with the current entry and bytes written. The spinner is
/// cleared on drop.
pub struct CliProgress {
    bar: Option<ProgressBar>,
    bytes_written: u64,
    archive: PathBuf,
    echo: Echo,
}

impl CliProgress {
    /// Creates progress output for converting `archive`.
    #[must_use]
    pub fn new(archive: impl Into<PathBuf>, echo: Echo) -> Self {
        let bar = (echo == Echo::Normal && Self::should_show()).then(spinner);
        Self {
            bar,
            bytes_written: 0,
            archive: archive.into(),
            echo,
        }
    }

    /// Checks if we should show a spinner (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stdout().is_term()
    }

    fn print(&self, line: &str, term: &Term) {
        match &self.bar {
            Some(bar) => bar.suspend(|| {
                let _ = term.write_line(line);
            }),
            None => {
                let _ = term.write_line(line);
            }
        }
    }
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();

    // Template: "⠋ a/b/c.txt 15.2 MB [3s]"
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {wide_msg} {bytes} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .with_key("bytes", |state: &ProgressState, w: &mut dyn Write| {
                write!(w, "{}", humanize_bytes(state.pos())).unwrap_or(());
            }),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl ProgressCallback for CliProgress {
    fn on_entry_start(&mut self, name: &str, _size: u64) {
        if let Some(bar) = &self.bar {
            bar.set_message(name.to_string());
        }
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bytes_written += bytes;
        if let Some(bar) = &self.bar {
            bar.set_position(self.bytes_written);
        }
    }

    fn on_entry_complete(&mut self, _name: &str) {}

    fn on_entry_skipped(&mut self, name: &str, type_code: u8) {
        if matches!(self.echo, Echo::Normal | Echo::Verbose) {
            self.print(
                &format!("Skipping entry: <{name}> with Unsupported Type: {type_code}"),
                &Term::stdout(),
            );
        }
    }

    fn on_entry_failed(&mut self, _name: &str, error: &TranscodeError) {
        if self.echo != Echo::Silent {
            self.print(&describe_error(error, &self.archive), &Term::stderr());
        }
    }

    fn on_detail(&mut self, message: &str) {
        if self.echo == Echo::Verbose {
            self.print(message, &Term::stdout());
        }
    }

    fn on_warning(&mut self, message: &str) {
        if matches!(self.echo, Echo::Normal | Echo::Verbose) {
            self.print(&format!("WARNING: {message}"), &Term::stderr());
        }
    }

    fn on_complete(&mut self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_bytes() {
        assert_eq!(humanize_bytes(0), "0 B");
        assert_eq!(humanize_bytes(512), "512 B");
        assert_eq!(humanize_bytes(1024), "1.0 KB");
        assert_eq!(humanize_bytes(1536), "1.5 KB");
        assert_eq!(humanize_bytes(1024 * 1024), "1.0 MB");
        assert_eq!(humanize_bytes(1024 * 1024 * 1024), "1.0 GB");
        assert_eq!(humanize_bytes(1024_u64.pow(4)), "1.0 TB");
    }

    #[test]
    fn test_echo_from_flags() {
        assert_eq!(Echo::from_flags(true, true, false), Echo::Silent);
        assert_eq!(Echo::from_flags(false, false, true), Echo::Quiet);
        assert_eq!(Echo::from_flags(false, true, false), Echo::Verbose);
        assert_eq!(Echo::from_flags(false, false, false), Echo::Normal);
    }

    #[test]
    fn test_progress_callback_counts_bytes() {
        let mut progress = CliProgress::new("test.tar", Echo::Silent);

        progress.on_entry_start("test.txt", 100);
        progress.on_bytes_written(1024);
        progress.on_bytes_written(512);
        progress.on_entry_complete("test.txt");
        progress.on_complete();

        assert_eq!(progress.bytes_written, 1536);
        assert!(progress.bar.is_none());
    }
}
