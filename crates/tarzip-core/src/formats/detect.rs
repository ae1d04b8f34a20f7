//! Input format detection from file names.
//!
//! Detection is purely name based: no bytes are read. Every name maps to some
//! [`Detection`]; names with no recognized suffix are treated as an
//! uncompressed single file.

use std::path::Path;

use super::compression::CompressionKind;

/// Extension appended to derived output names.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "zip";

/// Container layout of an input once decompressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// A tar stream of (header, content) blocks.
    Tar,
    /// Anything else; wrapped as a one-entry zip.
    SingleFile,
}

/// One row of the suffix table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputNameRule {
    /// Suffix matched against the end of the file name.
    pub suffix: &'static str,
    /// Container kind implied by the suffix.
    pub container: ContainerKind,
    /// Compression implied by the suffix.
    pub compression: CompressionKind,
}

impl OutputNameRule {
    const fn new(
        suffix: &'static str,
        container: ContainerKind,
        compression: CompressionKind,
    ) -> Self {
        Self {
            suffix,
            container,
            compression,
        }
    }

    /// Number of bytes removed from a matching name.
    #[must_use]
    pub const fn strip_len(&self) -> usize {
        self.suffix.len()
    }
}

/// Recognized suffixes, longest first within each family so that `.tar.gz`
/// wins over `.gz` and `.tar.bz2` over `.bz2`.
pub const OUTPUT_NAME_RULES: &[OutputNameRule] = &[
    OutputNameRule::new(".tar.bz2", ContainerKind::Tar, CompressionKind::Bzip2),
    OutputNameRule::new(".tar.gz", ContainerKind::Tar, CompressionKind::Gzip),
    OutputNameRule::new(".tbz2", ContainerKind::Tar, CompressionKind::Bzip2),
    OutputNameRule::new(".tar", ContainerKind::Tar, CompressionKind::None),
    OutputNameRule::new(".tgz", ContainerKind::Tar, CompressionKind::Gzip),
    OutputNameRule::new(".tbz", ContainerKind::Tar, CompressionKind::Bzip2),
    OutputNameRule::new(".bz2", ContainerKind::SingleFile, CompressionKind::Bzip2),
    OutputNameRule::new(".gz", ContainerKind::SingleFile, CompressionKind::Gzip),
];

/// Result of inspecting an input file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Whether the decompressed input is a tar stream.
    pub container: ContainerKind,
    /// Stream encoding to undo first.
    pub compression: CompressionKind,
    /// Input name with the recognized suffix removed (unchanged if none
    /// matched).
    pub output_base: String,
}

impl Detection {
    /// Full output name: `output_base` plus `.` plus `extension`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tarzip_core::formats::detect::detect;
    ///
    /// assert_eq!(detect("dir/archive.tar.gz").output_name("zip"), "dir/archive.zip");
    /// assert_eq!(detect("readme").output_name("zip"), "readme.zip");
    /// ```
    #[must_use]
    pub fn output_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.output_base)
    }

    /// Name given to the single entry when the input is not a tar: the last
    /// path component of `output_base`, or `.` if that is empty.
    #[must_use]
    pub fn single_entry_name(&self) -> String {
        if self.output_base.is_empty() {
            return ".".to_string();
        }
        Path::new(&self.output_base)
            .file_name()
            .map_or_else(
                || self.output_base.clone(),
                |name| name.to_string_lossy().into_owned(),
            )
    }
}

/// Detects container and compression from a file name.
///
/// Matching is case-sensitive and checks [`OUTPUT_NAME_RULES`] in order. An
/// unmatched name yields `(SingleFile, None)` with the name kept whole.
///
/// # Examples
///
/// ```
/// use tarzip_core::formats::compression::CompressionKind;
/// use tarzip_core::formats::detect::{ContainerKind, detect};
///
/// let d = detect("backup.tar.bz2");
/// assert_eq!(d.container, ContainerKind::Tar);
/// assert_eq!(d.compression, CompressionKind::Bzip2);
/// assert_eq!(d.output_base, "backup");
///
/// let d = detect("notes.txt.gz");
/// assert_eq!(d.container, ContainerKind::SingleFile);
/// assert_eq!(d.output_base, "notes.txt");
/// ```
#[must_use]
pub fn detect(filename: &str) -> Detection {
    OUTPUT_NAME_RULES
        .iter()
        .find(|rule| filename.ends_with(rule.suffix))
        .map_or_else(
            || Detection {
                container: ContainerKind::SingleFile,
                compression: CompressionKind::None,
                output_base: filename.to_string(),
            },
            |rule| Detection {
                container: rule.container,
                compression: rule.compression,
                output_base: filename[..filename.len() - rule.strip_len()].to_string(),
            },
        )
}

/// [`detect`] for a path. Non UTF-8 components are replaced lossily.
#[must_use]
pub fn detect_path(path: &Path) -> Detection {
    detect(&path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str, container: ContainerKind, compression: CompressionKind, base: &str) {
        let d = detect(name);
        assert_eq!(d.container, container, "container for {name}");
        assert_eq!(d.compression, compression, "compression for {name}");
        assert_eq!(d.output_base, base, "base for {name}");
    }

    #[test]
    fn test_detect_tar() {
        check("archive.tar", ContainerKind::Tar, CompressionKind::None, "archive");
    }

    #[test]
    fn test_detect_tgz() {
        check("archive.tgz", ContainerKind::Tar, CompressionKind::Gzip, "archive");
    }

    #[test]
    fn test_detect_tar_gz() {
        check("archive.tar.gz", ContainerKind::Tar, CompressionKind::Gzip, "archive");
    }

    #[test]
    fn test_detect_tar_bz2() {
        check("archive.tar.bz2", ContainerKind::Tar, CompressionKind::Bzip2, "archive");
        check("archive.tbz2", ContainerKind::Tar, CompressionKind::Bzip2, "archive");
        check("archive.tbz", ContainerKind::Tar, CompressionKind::Bzip2, "archive");
    }

    #[test]
    fn test_detect_single_gz() {
        check("notes.txt.gz", ContainerKind::SingleFile, CompressionKind::Gzip, "notes.txt");
    }

    #[test]
    fn test_detect_single_bz2() {
        check("data.csv.bz2", ContainerKind::SingleFile, CompressionKind::Bzip2, "data.csv");
    }

    #[test]
    fn test_detect_unrecognized_keeps_name() {
        let d = detect("photo.jpeg");
        assert_eq!(d.container, ContainerKind::SingleFile);
        assert_eq!(d.compression, CompressionKind::None);
        assert_eq!(d.output_base, "photo.jpeg");
        assert_eq!(d.output_name(DEFAULT_OUTPUT_EXTENSION), "photo.jpeg.zip");
    }

    #[test]
    fn test_detect_is_case_sensitive() {
        check("ARCHIVE.TAR.GZ", ContainerKind::SingleFile, CompressionKind::None, "ARCHIVE.TAR.GZ");
    }

    #[test]
    fn test_detect_bare_suffix() {
        check(".tar", ContainerKind::Tar, CompressionKind::None, "");
        check(".gz", ContainerKind::SingleFile, CompressionKind::Gzip, "");
    }

    #[test]
    fn test_detect_keeps_directories() {
        let d = detect("some/dir/archive.tar.gz");
        assert_eq!(d.output_base, "some/dir/archive");
        assert_eq!(d.output_name("zip"), "some/dir/archive.zip");
    }

    #[test]
    fn test_single_entry_name_is_basename() {
        assert_eq!(detect("in/notes.txt.gz").single_entry_name(), "notes.txt");
        assert_eq!(detect("notes.txt.gz").single_entry_name(), "notes.txt");
    }

    #[test]
    fn test_single_entry_name_never_empty() {
        assert_eq!(detect(".gz").single_entry_name(), ".");
        assert_eq!(detect(".bz2").single_entry_name(), ".");
        assert_eq!(detect("in/.gz").single_entry_name(), "in");
    }

    #[test]
    fn test_rules_prefer_longer_suffix() {
        for (i, earlier) in OUTPUT_NAME_RULES.iter().enumerate() {
            for later in &OUTPUT_NAME_RULES[i + 1..] {
                assert!(
                    !later.suffix.ends_with(earlier.suffix),
                    "{} would never match: {} comes first",
                    later.suffix,
                    earlier.suffix
                );
            }
        }
    }

    #[test]
    fn test_detect_path() {
        let d = detect_path(Path::new("x/y.tgz"));
        assert_eq!(d.output_base, "x/y");
        assert_eq!(d.compression, CompressionKind::Gzip);
    }
}
