//! Source entry kind enumeration.

/// Kind of a tar entry, as far as conversion cares.
///
/// Only [`RegularFile`](Self::RegularFile), [`Directory`](Self::Directory)
/// and [`SparseFile`](Self::SparseFile) are copied into the zip. Everything
/// else is kept as [`Unsupported`](Self::Unsupported) with its raw type byte
/// so the skip diagnostic can name it.
///
/// # Examples
///
/// ```
/// use tarzip_core::types::EntryKind;
///
/// assert!(EntryKind::from_type_byte(b'0').is_supported());
/// assert!(EntryKind::from_type_byte(b'5').is_supported());
/// assert_eq!(EntryKind::from_type_byte(b'2'), EntryKind::Unsupported(b'2'));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file (`'0'` or the legacy NUL type byte).
    RegularFile,
    /// Directory (`'5'`).
    Directory,
    /// GNU sparse file (`'S'`); content is read back expanded.
    SparseFile,
    /// Any other type: links, devices, FIFOs, contiguous files, ...
    Unsupported(u8),
}

impl EntryKind {
    /// Maps a raw tar type byte to an entry kind.
    #[must_use]
    pub const fn from_type_byte(byte: u8) -> Self {
        match byte {
            b'0' | b'\0' => Self::RegularFile,
            b'5' => Self::Directory,
            b'S' => Self::SparseFile,
            other => Self::Unsupported(other),
        }
    }

    /// Returns `true` if entries of this kind are written to the zip.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Raw tar type byte of this kind.
    #[must_use]
    pub const fn type_code(self) -> u8 {
        match self {
            Self::RegularFile => b'0',
            Self::Directory => b'5',
            Self::SparseFile => b'S',
            Self::Unsupported(byte) => byte,
        }
    }
}

impl From<tar::EntryType> for EntryKind {
    fn from(entry_type: tar::EntryType) -> Self {
        Self::from_type_byte(entry_type.as_byte())
    }
}
