//! Metadata of one source entry.

use super::EntryKind;

/// Metadata of one entry read from the source.
///
/// `name` is carried verbatim into the zip: no normalization, no
/// de-duplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
    /// Entry path exactly as recorded in the source.
    pub name: String,
    /// Content length in bytes (expanded length for sparse files), or
    /// `None` when the content is streamed without a known length.
    pub size: Option<u64>,
    /// Modification time, seconds since the Unix epoch.
    pub modified_at: i64,
    /// Entry kind.
    pub kind: EntryKind,
}

impl EntryDescriptor {
    /// Creates a regular-file descriptor, as used for single-file inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// use tarzip_core::types::{EntryDescriptor, EntryKind};
    ///
    /// let d = EntryDescriptor::regular_file("notes.txt", 0, 1_700_000_000);
    /// assert_eq!(d.kind, EntryKind::RegularFile);
    /// ```
    #[must_use]
    pub fn regular_file(name: impl Into<String>, size: u64, modified_at: i64) -> Self {
        Self {
            name: name.into(),
            size: Some(size),
            modified_at,
            kind: EntryKind::RegularFile,
        }
    }

    /// Creates a regular-file descriptor whose length is only known once the
    /// content has been read.
    #[must_use]
    pub fn streamed_file(name: impl Into<String>, modified_at: i64) -> Self {
        Self {
            size: None,
            ..Self::regular_file(name, 0, modified_at)
        }
    }

    /// Returns `true` unless the content is known to fit the 32-bit zip size
    /// fields.
    #[must_use]
    pub fn needs_zip64(&self) -> bool {
        self.size.is_none_or(|size| size > u64::from(u32::MAX))
    }

    /// Returns `true` if the zip entry should be written as a directory
    /// record: a directory whose name already ends in `/`.
    #[must_use]
    pub fn is_directory_record(&self) -> bool {
        self.kind.is_directory() && self.name.ends_with('/')
    }
}
