//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::error::describe_error;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use std::path::Path;
use tarzip_core::ConversionReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn write_error(&self, message: &str) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {message}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {message}"));
        }
    }

    fn write_summary(&self, report: &ConversionReport) {
        let _ = self
            .term
            .write_line(&format!("  Output:           {}", report.output.display()));
        let _ = self.term.write_line(&format!(
            "  Format:           {} ({})",
            match report.container {
                tarzip_core::ContainerKind::Tar => "tar",
                tarzip_core::ContainerKind::SingleFile => "single file",
            },
            report.compression
        ));
        let _ = self.term.write_line(&format!(
            "  Files:            {}",
            Self::format_number(report.files_converted())
        ));
        let _ = self.term.write_line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_converted())
        ));
        let _ = self.term.write_line(&format!(
            "  Skipped:          {}",
            Self::format_number(report.entries_skipped())
        ));
        let _ = self.term.write_line(&format!(
            "  Failed:           {}",
            Self::format_number(report.entries_failed())
        ));
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            humanize_bytes(report.bytes_written)
        ));

        if report.bytes_compressed > 0 {
            let _ = self.term.write_line(&format!(
                "  Zip size:         {}",
                humanize_bytes(report.bytes_compressed)
            ));
        }

        let _ = self
            .term
            .write_line(&format!("  Duration:         {:.2?}", report.duration));
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_start(&self, input: &Path) {
        if self.quiet {
            return;
        }
        let _ = self
            .term
            .write_line(&format!("Converting {}...", input.display()));
    }

    fn format_conversion_result(&self, report: &ConversionReport) -> Result<()> {
        if let Some(fatal) = &report.fatal {
            self.write_error(&describe_error(fatal, &report.input));
        }

        if self.quiet {
            return Ok(());
        }

        if self.verbose {
            self.write_summary(report);
        }

        if self.use_colors && report.is_clean() {
            let _ = self
                .term
                .write_line(&format!("{} Done!", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line("Done!");
        }

        Ok(())
    }

    fn format_error(&self, _input: &Path, error: &anyhow::Error) {
        self.write_error(&format!("{error}"));
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("WARNING: {message}"));
        }
    }
}
