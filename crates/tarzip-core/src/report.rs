//! Conversion reporting and progress callbacks.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::TranscodeError;
use crate::formats::CompressionKind;
use crate::formats::ContainerKind;

/// What happened to one source entry.
#[derive(Debug)]
pub enum EntryStatus {
    /// Written to the zip.
    Converted {
        /// Uncompressed bytes copied.
        bytes: u64,
        /// Whether the entry was written as a directory record.
        directory: bool,
    },
    /// Not written: unsupported kind.
    Skipped {
        /// Raw tar type byte of the entry.
        type_code: u8,
    },
    /// Not written, or written truncated, because of an error.
    Failed(TranscodeError),
}

/// Outcome of one source entry.
#[derive(Debug)]
pub struct EntryOutcome {
    /// Entry name as found in the source.
    pub name: String,
    /// What happened to it.
    pub status: EntryStatus,
}

impl EntryOutcome {
    /// Returns `true` if the entry made it into the zip intact.
    #[must_use]
    pub const fn is_converted(&self) -> bool {
        matches!(self.status, EntryStatus::Converted { .. })
    }
}

/// Report of converting one input file.
///
/// A report exists for every file whose input and output could be opened.
/// Fatal errors after that point (corrupt tar header, failure writing the zip
/// trailer) are recorded in [`fatal`](Self::fatal); the output file was still
/// finalized as far as possible.
///
/// # Examples
///
/// ```
/// use tarzip_core::ConversionReport;
///
/// let mut report = ConversionReport::default();
/// report.bytes_written = 1000;
/// report.bytes_compressed = 250;
///
/// assert!(report.is_success());
/// assert_eq!(report.compression_ratio(), 4.0);
/// ```
#[derive(Debug)]
pub struct ConversionReport {
    /// Input archive path.
    pub input: PathBuf,
    /// Zip file written.
    pub output: PathBuf,
    /// Detected container kind.
    pub container: ContainerKind,
    /// Detected compression.
    pub compression: CompressionKind,
    /// Per-entry outcomes, in source order.
    pub entries: Vec<EntryOutcome>,
    /// Uncompressed bytes copied into the zip.
    pub bytes_written: u64,
    /// Size of the finished zip file.
    pub bytes_compressed: u64,
    /// Non-fatal problems not tied to one entry (e.g. decompression
    /// fallback).
    pub warnings: Vec<String>,
    /// Error that ended the conversion early, if any.
    pub fatal: Option<TranscodeError>,
    /// Wall time of the conversion.
    pub duration: Duration,
}

impl Default for ConversionReport {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            container: ContainerKind::SingleFile,
            compression: CompressionKind::None,
            entries: Vec::new(),
            bytes_written: 0,
            bytes_compressed: 0,
            warnings: Vec::new(),
            fatal: None,
            duration: Duration::ZERO,
        }
    }
}

impl ConversionReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of regular and sparse files written.
    #[must_use]
    pub fn files_converted(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Converted { directory: false, .. }))
    }

    /// Number of directory records written.
    #[must_use]
    pub fn directories_converted(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Converted { directory: true, .. }))
    }

    /// Number of entries skipped for their kind.
    #[must_use]
    pub fn entries_skipped(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Skipped { .. }))
    }

    /// Number of entries that failed.
    #[must_use]
    pub fn entries_failed(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Failed(_)))
    }

    /// Returns `true` if no fatal error ended the conversion early.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.fatal.is_none()
    }

    /// Returns `true` if the conversion completed and every accepted entry
    /// was written intact.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.is_success() && self.entries_failed() == 0
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either side is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }

    fn count(&self, pred: impl Fn(&EntryStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.status)).count()
    }
}

/// Callback trait for progress reporting during conversion.
///
/// The core never prints. Everything a user might want to see arrives here
/// as it happens, and again in the final [`ConversionReport`].
///
/// # Examples
///
/// ```
/// use tarzip_core::{ProgressCallback, TranscodeError};
///
/// struct SimpleProgress;
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_entry_start(&mut self, name: &str, size: u64) {}
///
///     fn on_bytes_written(&mut self, bytes: u64) {}
///
///     fn on_entry_complete(&mut self, name: &str) {}
///
///     fn on_entry_skipped(&mut self, name: &str, type_code: u8) {
///         println!("Skipping entry: <{name}> with Unsupported Type: {type_code}");
///     }
///
///     fn on_entry_failed(&mut self, name: &str, error: &TranscodeError) {}
///
///     fn on_detail(&mut self, message: &str) {
///         println!("{message}");
///     }
///
///     fn on_warning(&mut self, message: &str) {}
///
///     fn on_complete(&mut self) {}
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before an accepted entry's content is copied.
    fn on_entry_start(&mut self, name: &str, size: u64);

    /// Called for each chunk of content written to the zip.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called after an entry was written intact.
    fn on_entry_complete(&mut self, name: &str);

    /// Called once for every entry dropped for its kind.
    fn on_entry_skipped(&mut self, name: &str, type_code: u8);

    /// Called when an entry could not be created or copied.
    fn on_entry_failed(&mut self, name: &str, error: &TranscodeError);

    /// Per-entry detail lines. Only called when the configuration asks for
    /// verbose output.
    fn on_detail(&mut self, message: &str);

    /// Called for recoverable problems not tied to an entry.
    fn on_warning(&mut self, message: &str);

    /// Called once after the zip was finalized (or finalization failed).
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _name: &str, _size: u64) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _name: &str) {}

    fn on_entry_skipped(&mut self, _name: &str, _type_code: u8) {}

    fn on_entry_failed(&mut self, _name: &str, _error: &TranscodeError) {}

    fn on_detail(&mut self, _message: &str) {}

    fn on_warning(&mut self, _message: &str) {}

    fn on_complete(&mut self) {}
}
