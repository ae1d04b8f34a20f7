//! Test utilities for building source archives and inspecting zip output.
//!
//! This module provides reusable helpers for creating in-memory tar fixtures
//! (optionally gzip or bzip2 compressed) and reading back the zip archives
//! the converter produces.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use zip::extra_fields::ExtraField;

/// Modification time given to fixture entries: 2023-11-14 22:13:20 UTC.
pub const DEFAULT_MTIME: u64 = 1_700_000_000;

/// Builder for creating tar test archives with various entry types.
///
/// Entries get mode 0o644 (0o755 for directories) and modification time
/// [`DEFAULT_MTIME`] unless a `*_with_mtime` method is used.
///
/// # Examples
///
/// ```
/// use tarzip_core::test_utils::TarTestBuilder;
///
/// let tar_data = TarTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .add_symlink("link", "file.txt")
///     .build();
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates a new tar test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Adds a regular file to the archive.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mtime(path, data, DEFAULT_MTIME)
    }

    /// Adds a regular file with a modification time (unix seconds).
    #[must_use]
    pub fn add_file_with_mtime(mut self, path: &str, data: &[u8], mtime: u64) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a directory to the archive.
    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        self.add_directory_with_mtime(path, DEFAULT_MTIME)
    }

    /// Adds a directory with a modification time (unix seconds).
    #[must_use]
    pub fn add_directory_with_mtime(mut self, path: &str, mtime: u64) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o755);
        header.set_mtime(mtime);
        header.set_entry_type(tar::EntryType::Directory);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a symlink to the archive.
    #[must_use]
    pub fn add_symlink(self, path: &str, target: &str) -> Self {
        self.add_link(path, target, tar::EntryType::Symlink)
    }

    /// Adds a hardlink to the archive.
    #[must_use]
    pub fn add_hardlink(self, path: &str, target: &str) -> Self {
        self.add_link(path, target, tar::EntryType::Link)
    }

    fn add_link(mut self, path: &str, target: &str, entry_type: tar::EntryType) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o777);
        header.set_entry_type(entry_type);
        header.set_link_name(target).unwrap();
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a content-less entry of an arbitrary type (FIFO, device, ...).
    #[must_use]
    pub fn add_special(mut self, path: &str, entry_type: tar::EntryType) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o644);
        header.set_entry_type(entry_type);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds an old-style GNU sparse file.
    ///
    /// `chunks` are `(offset, data)` pairs in ascending offset order; every
    /// chunk but the last must be a multiple of 512 bytes long. The expanded
    /// file is `real_size` bytes with zeros between chunks.
    #[must_use]
    pub fn add_sparse_file(mut self, path: &str, chunks: &[(u64, &[u8])], real_size: u64) -> Self {
        assert!(chunks.len() <= 4, "only the in-header sparse map is supported");

        let stored: Vec<u8> = chunks.iter().flat_map(|(_, data)| data.iter().copied()).collect();

        let mut header = tar::Header::new_gnu();
        header.set_size(stored.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(DEFAULT_MTIME);
        header.set_entry_type(tar::EntryType::GNUSparse);
        {
            let gnu = header.as_gnu_mut().unwrap();
            for (slot, (offset, data)) in gnu.sparse.iter_mut().zip(chunks) {
                slot.offset = octal12(*offset);
                slot.numbytes = octal12(data.len() as u64);
            }
            gnu.realsize = octal12(real_size);
        }
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, stored.as_slice())
            .unwrap();
        self
    }

    /// Builds and returns the tar archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn octal12(value: u64) -> [u8; 12] {
    let mut field = [0u8; 12];
    field[..11].copy_from_slice(format!("{value:011o}").as_bytes());
    field
}

/// Gzip-compresses `data`.
#[must_use]
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// Bzip2-compresses `data`.
#[must_use]
pub fn bzip2(data: &[u8]) -> Vec<u8> {
    let mut enc = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// One entry of a zip archive, read back for assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct ZipEntrySummary {
    /// Entry name.
    pub name: String,
    /// Decompressed content.
    pub data: Vec<u8>,
    /// Whether the zip reader considers it a directory.
    pub is_dir: bool,
    /// Compression method used.
    pub method: zip::CompressionMethod,
    /// DOS modification time as (year, month, day, hour, minute, second).
    pub modified: Option<(u16, u8, u8, u8, u8, u8)>,
    /// Modification time from the extended timestamp field, in unix seconds.
    pub unix_mtime: Option<u32>,
}

/// Reads every entry of a zip archive held in memory.
#[must_use]
pub fn read_zip(bytes: &[u8]) -> Vec<ZipEntrySummary> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut out = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        let unix_mtime = entry.extra_data_fields().find_map(|field| match field {
            ExtraField::ExtendedTimestamp(ts) => ts.mod_time(),
            _ => None,
        });
        out.push(ZipEntrySummary {
            name: entry.name().to_string(),
            data,
            is_dir: entry.is_dir(),
            method: entry.compression(),
            modified: entry.last_modified().map(|dt| {
                (
                    dt.year(),
                    dt.month(),
                    dt.day(),
                    dt.hour(),
                    dt.minute(),
                    dt.second(),
                )
            }),
            unix_mtime,
        });
    }

    out
}

/// Reader that yields `data` and then fails instead of reporting EOF.
#[derive(Debug)]
pub struct FailingReader {
    data: Cursor<Vec<u8>>,
}

impl FailingReader {
    /// Creates a reader that fails after `data` is consumed.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Cursor::new(data),
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.data.read(buf)? {
            0 => Err(std::io::Error::other("simulated read failure")),
            n => Ok(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tar_builder() {
        let tar_data = TarTestBuilder::new()
            .add_file("file.txt", b"content")
            .add_directory("dir/")
            .build();
        assert!(!tar_data.is_empty());
        assert_eq!(tar_data.len() % 512, 0);
    }

    #[test]
    fn test_sparse_file_expands() {
        let head = vec![b'a'; 512];
        let tar_data = TarTestBuilder::new()
            .add_sparse_file("sparse.bin", &[(0, &head), (1024, b"xyz")], 1027)
            .build();

        let mut archive = tar::Archive::new(tar_data.as_slice());
        let mut entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(entry.header().entry_type(), tar::EntryType::GNUSparse);

        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        assert_eq!(data.len(), 1027);
        assert_eq!(&data[..512], head.as_slice());
        assert!(data[512..1024].iter().all(|b| *b == 0));
        assert_eq!(&data[1024..], b"xyz");
    }

    #[test]
    fn test_compression_helpers() {
        let mut out = Vec::new();
        flate2::read::GzDecoder::new(gzip(b"gz").as_slice())
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, b"gz");

        out.clear();
        bzip2::read::BzDecoder::new(bzip2(b"bz").as_slice())
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, b"bz");
    }

    #[test]
    fn test_failing_reader() {
        let mut reader = FailingReader::new(b"abc".to_vec());
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert!(reader.read(&mut buf).is_err());
    }
}
