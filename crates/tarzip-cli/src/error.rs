//! Error conversion utilities for CLI.
//!
//! Converts tarzip-core's typed errors (thiserror) into user-facing messages
//! and contextual errors (anyhow) with actionable guidance.

use anyhow::Result;
use std::path::Path;
use tarzip_core::OpenTarget;
use tarzip_core::TranscodeError;

/// Renders a conversion error for the console, with a hint line where one
/// helps.
pub fn describe_error(err: &TranscodeError, archive: &Path) -> String {
    match err {
        TranscodeError::Open {
            target: OpenTarget::Input,
            path,
            source,
        } => format!(
            "Error opening <{}>: {source}\n\
             HINT: Check that the file exists and is readable.",
            path.display()
        ),
        TranscodeError::Open {
            target: OpenTarget::Output,
            path,
            source,
        } => format!(
            "Error opening output file <{}>: {source}\n\
             HINT: The zip is written next to the input; check that its directory is writable.",
            path.display()
        ),
        TranscodeError::DecompressionInit(reason) => format!(
            "File can't be decompressed: {reason}\n\
             HINT: '{}' is converted as uncompressed data.",
            archive.display()
        ),
        TranscodeError::Header(io_err) => format!(
            "Error reading archive '{}': {io_err}\n\
             HINT: The archive may be truncated or corrupted. Entries before the damage were converted.",
            archive.display()
        ),
        TranscodeError::EntryCreate { name, reason } => {
            format!("Error creating zip header for <{name}>: {reason}")
        }
        TranscodeError::DuplicateName { name } => format!(
            "Duplicate entry <{name}> left out of the zip\n\
             HINT: A zip cannot hold two entries of one name; the first one was kept."
        ),
        TranscodeError::Copy { name, source } => format!(
            "Error copying <{name}> to zip: {source}\n\
             HINT: The entry is kept truncated unless --discard-partial is given."
        ),
        TranscodeError::Finalize(reason) => format!(
            "Failed to finish zip for '{}': {reason}\n\
             HINT: The output file is incomplete. Check free disk space.",
            archive.display()
        ),
        TranscodeError::Io(io_err) => {
            format!("I/O error while processing '{}': {io_err}", archive.display())
        }
    }
}

/// Converts `TranscodeError` to a user-friendly anyhow error with context.
pub fn convert_transcode_error(err: TranscodeError, archive: &Path) -> anyhow::Error {
    let message = describe_error(&err, archive);
    anyhow::Error::from(err).context(message)
}

/// Adds context to a failed conversion.
pub fn add_archive_context<T>(
    result: Result<T, TranscodeError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_transcode_error(e, archive))
}
