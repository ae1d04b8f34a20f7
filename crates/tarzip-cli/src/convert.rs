//! Convert command implementation: one conversion per input file.

use crate::cli::Cli;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use crate::progress::Echo;
use anyhow::Result;
use tarzip_core::convert_file;

/// What went wrong across all input files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Files that could not be opened or whose conversion ended early.
    pub files_failed: usize,
    /// Entries that could not be written, over all files.
    pub entries_failed: usize,
}

impl RunSummary {
    /// Process exit status. Failures only count under `--strict`; otherwise
    /// they are reported and the run still succeeds.
    pub const fn exit_status(&self, strict: bool) -> u8 {
        if strict && (self.files_failed > 0 || self.entries_failed > 0) {
            1
        } else {
            0
        }
    }
}

/// Converts every file named on the command line, in order.
///
/// A failing file never stops the loop.
pub fn execute(cli: &Cli, echo: Echo, formatter: &dyn OutputFormatter) -> Result<RunSummary> {
    let config = cli.config();
    let mut summary = RunSummary::default();

    if cli.files.is_empty() {
        formatter.format_warning("no input files given, nothing to convert");
    }

    for input in &cli.files {
        formatter.format_start(input);

        let result = {
            let mut progress = CliProgress::new(input, echo);
            add_archive_context(convert_file(input, &config, &mut progress), input)
        };

        match result {
            Ok(report) => {
                if !report.is_success() {
                    summary.files_failed += 1;
                }
                summary.entries_failed += report.entries_failed();
                formatter.format_conversion_result(&report)?;
            }
            Err(e) => {
                summary.files_failed += 1;
                formatter.format_error(input, &e);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_exit_status() {
        let summary = RunSummary {
            files_failed: 1,
            entries_failed: 2,
        };
        assert_eq!(summary.exit_status(false), 0);
        assert_eq!(summary.exit_status(true), 1);
    }

    #[test]
    fn test_strict_clean_run() {
        assert_eq!(RunSummary::default().exit_status(true), 0);
    }
}
