//! Error types for archive conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `TranscodeError`.
pub type Result<T> = std::result::Result<T, TranscodeError>;

/// Which side of the conversion an [`TranscodeError::Open`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTarget {
    /// The archive being converted.
    Input,
    /// The zip file being created.
    Output,
}

impl std::fmt::Display for OpenTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// Errors that can occur while converting an archive.
///
/// Only [`Open`](Self::Open), [`Header`](Self::Header) and
/// [`Finalize`](Self::Finalize) end the conversion of a file. The remaining
/// variants are scoped to a single entry or are absorbed by a fallback.
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// Input could not be opened or output could not be created.
    #[error("cannot open {target} {}: {source}", path.display())]
    Open {
        /// Which file failed.
        target: OpenTarget,
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Compressed stream header is malformed.
    #[error("file can't be decompressed: {0}")]
    DecompressionInit(String),

    /// A tar entry header could not be read.
    #[error("error reading archive: {0}")]
    Header(#[source] std::io::Error),

    /// The zip writer refused to start an entry.
    #[error("error creating zip header for <{name}>: {reason}")]
    EntryCreate {
        /// Entry name as found in the source.
        name: String,
        /// Reason reported by the zip writer.
        reason: String,
    },

    /// An earlier entry with the same name is already in the zip, which
    /// cannot hold two entries of one name. The later entry is left out.
    #[error("duplicate entry <{name}>: an entry with this name was already written")]
    DuplicateName {
        /// Entry name as found in the source.
        name: String,
    },

    /// Copying entry content failed partway.
    #[error("error copying <{name}> to zip: {source}")]
    Copy {
        /// Entry name as found in the source.
        name: String,
        /// Underlying read or write error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the zip central directory or flushing the output failed.
    #[error("failed to finish zip archive: {0}")]
    Finalize(String),

    /// I/O error outside of entry processing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscodeError {
    /// Returns `true` if this error ends the conversion of the current file.
    ///
    /// # Examples
    ///
    /// ```
    /// use tarzip_core::TranscodeError;
    ///
    /// let err = TranscodeError::EntryCreate {
    ///     name: "a.txt".to_string(),
    ///     reason: "duplicate".to_string(),
    /// };
    /// assert!(!err.is_fatal());
    ///
    /// let err = TranscodeError::Header(std::io::Error::other("bad checksum"));
    /// assert!(err.is_fatal());
    /// ```
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Open { .. } | Self::Header(_) | Self::Finalize(_) | Self::Io(_)
        )
    }

    /// Returns the name of the entry this error is scoped to, if any.
    #[must_use]
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Self::EntryCreate { name, .. }
            | Self::DuplicateName { name }
            | Self::Copy { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Short machine-readable code, used by JSON output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "OPEN",
            Self::DecompressionInit(_) => "DECOMPRESSION_INIT",
            Self::Header(_) => "HEADER",
            Self::EntryCreate { .. } => "ENTRY_CREATE",
            Self::DuplicateName { .. } => "DUPLICATE_NAME",
            Self::Copy { .. } => "COPY",
            Self::Finalize(_) => "FINALIZE",
            Self::Io(_) => "IO",
        }
    }
}
