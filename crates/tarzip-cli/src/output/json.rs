//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use tarzip_core::ContainerKind;
use tarzip_core::ConversionReport;
use tarzip_core::EntryStatus;

const OPERATION: &str = "convert";

pub struct JsonFormatter;

#[derive(Serialize)]
struct SkippedEntry<'a> {
    name: &'a str,
    type_code: u8,
}

#[derive(Serialize)]
struct FailedEntry<'a> {
    name: &'a str,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ConversionOutput<'a> {
    input: String,
    output: String,
    container: &'static str,
    compression: &'static str,
    files_converted: usize,
    directories_converted: usize,
    entries_skipped: usize,
    entries_failed: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    compression_ratio: f64,
    duration_ms: u128,
    skipped: Vec<SkippedEntry<'a>>,
    failed: Vec<FailedEntry<'a>>,
    warnings: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    fatal_code: Option<&'static str>,
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn conversion_data(report: &ConversionReport) -> ConversionOutput<'_> {
        let mut skipped = Vec::new();
        let mut failed = Vec::new();
        for entry in &report.entries {
            match &entry.status {
                EntryStatus::Skipped { type_code } => skipped.push(SkippedEntry {
                    name: &entry.name,
                    type_code: *type_code,
                }),
                EntryStatus::Failed(error) => failed.push(FailedEntry {
                    name: &entry.name,
                    code: error.code(),
                    message: error.to_string(),
                }),
                EntryStatus::Converted { .. } => {}
            }
        }

        ConversionOutput {
            input: report.input.display().to_string(),
            output: report.output.display().to_string(),
            container: match report.container {
                ContainerKind::Tar => "tar",
                ContainerKind::SingleFile => "single_file",
            },
            compression: report.compression.name(),
            files_converted: report.files_converted(),
            directories_converted: report.directories_converted(),
            entries_skipped: report.entries_skipped(),
            entries_failed: report.entries_failed(),
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_ratio: report.compression_ratio(),
            duration_ms: report.duration.as_millis(),
            skipped,
            failed,
            warnings: &report.warnings,
            fatal_code: report.fatal.as_ref().map(tarzip_core::TranscodeError::code),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_start(&self, _input: &Path) {}

    fn format_conversion_result(&self, report: &ConversionReport) -> Result<()> {
        let data = Self::conversion_data(report);
        match &report.fatal {
            None => Self::output(&JsonOutput::success(OPERATION, data)),
            Some(fatal) => Self::output(&JsonOutput::partial(OPERATION, data, fatal.to_string())),
        }
    }

    fn format_error(&self, input: &Path, error: &anyhow::Error) {
        #[derive(Serialize)]
        struct ErrorOutput {
            operation: &'static str,
            status: &'static str,
            input: String,
            error: String,
        }

        let _ = Self::output(&ErrorOutput {
            operation: OPERATION,
            status: "error",
            input: input.display().to_string(),
            error: format!("{error:#}"),
        });
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
