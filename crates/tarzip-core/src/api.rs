//! High-level public API for converting archives to zip.

use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use zip::ZipWriter;

use crate::ConversionConfig;
use crate::ConversionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::entries::TarEntries;
use crate::error::OpenTarget;
use crate::error::TranscodeError;
use crate::formats::ContainerKind;
use crate::formats::Detection;
use crate::formats::detect::detect_path;
use crate::formats::open_decoder;
use crate::transcode::transcode;
use crate::transcode::wrap_single;

/// Converts one archive file to a zip file next to it.
///
/// The output name is derived from `input` (see
/// [`detect`](crate::formats::detect())): `archive.tar.gz` becomes
/// `archive.zip`, `notes.txt.gz` becomes `notes.txt.zip`. An existing output
/// file is truncated.
///
/// # Arguments
///
/// * `input` - Path to the tar, compressed tar or compressed file
/// * `config` - Conversion options
/// * `progress` - Receives per-entry progress and diagnostics
///
/// # Errors
///
/// Returns [`TranscodeError::Open`] if the input cannot be opened or the
/// output cannot be created. Nothing is written in that case. Any later
/// fatal error is carried in [`ConversionReport::fatal`], since the output
/// file exists and was finalized as far as possible.
///
/// # Examples
///
/// ```no_run
/// use tarzip_core::{ConversionConfig, NoopProgress, convert_file};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = convert_file("backup.tar.gz", &ConversionConfig::default(), &mut NoopProgress)?;
/// println!(
///     "{} -> {}: {} files",
///     report.input.display(),
///     report.output.display(),
///     report.files_converted()
/// );
/// # Ok(())
/// # }
/// ```
pub fn convert_file<P: AsRef<Path>>(
    input: P,
    config: &ConversionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ConversionReport> {
    let input = input.as_ref();

    let file = File::open(input).map_err(|source| TranscodeError::Open {
        target: OpenTarget::Input,
        path: input.to_path_buf(),
        source,
    })?;

    let detection = detect_path(input);
    let output = PathBuf::from(detection.output_name(&config.output_extension));
    let mut writer = BufWriter::new(create_output(&output)?);

    let mut report = convert_reader(
        BufReader::new(file),
        &detection,
        &mut writer,
        config,
        progress,
    );
    report.input = input.to_path_buf();
    report.output = output;

    Ok(report)
}

/// Converts an already opened input stream into a zip on `writer`.
///
/// `detection` decides how `raw` is decoded and whether it is read as a tar
/// or wrapped as one file. The returned report has no paths set; every
/// failure is recorded in it.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use tarzip_core::formats::detect;
/// use tarzip_core::test_utils::{TarTestBuilder, gzip, read_zip};
/// use tarzip_core::{ConversionConfig, NoopProgress, convert_reader};
///
/// let tgz = gzip(&TarTestBuilder::new().add_file("a.txt", b"hi").build());
/// let mut out = Cursor::new(Vec::new());
///
/// let report = convert_reader(
///     tgz.as_slice(),
///     &detect("archive.tgz"),
///     &mut out,
///     &ConversionConfig::default(),
///     &mut NoopProgress,
/// );
///
/// assert!(report.is_clean());
/// assert_eq!(read_zip(out.get_ref())[0].name, "a.txt");
/// ```
pub fn convert_reader<R: Read, W: Write + Seek>(
    raw: R,
    detection: &Detection,
    writer: &mut W,
    config: &ConversionConfig,
    progress: &mut dyn ProgressCallback,
) -> ConversionReport {
    let start = Instant::now();
    let started_at = chrono::Utc::now().timestamp();

    let mut report = ConversionReport::new();
    report.container = detection.container;
    report.compression = detection.compression;

    let decoder = open_decoder(detection.compression, raw);
    if let Some(fallback) = decoder.fallback {
        let msg = fallback.to_string();
        progress.on_warning(&msg);
        report.add_warning(msg);
    }

    let written = match detection.container {
        ContainerKind::Tar => {
            let mut archive = tar::Archive::new(decoder.reader);
            match TarEntries::new(&mut archive) {
                Ok(mut entries) => {
                    transcode(&mut entries, &mut *writer, config, progress, &mut report).map(drop)
                }
                Err(e) => {
                    report.fatal = Some(e);
                    finish_empty(&mut *writer)
                }
            }
        }
        ContainerKind::SingleFile => wrap_single(
            decoder.reader,
            &detection.single_entry_name(),
            started_at,
            &mut *writer,
            config,
            progress,
            &mut report,
        )
        .map(drop),
    };

    let size = written.and_then(|()| {
        writer.flush()?;
        Ok(writer.seek(SeekFrom::End(0))?)
    });
    match size {
        Ok(size) => report.bytes_compressed = size,
        Err(e) => record_fatal(&mut report, finalize_error(e)),
    }

    report.duration = start.elapsed();
    report
}

fn create_output(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666);
    }

    options.open(path).map_err(|source| TranscodeError::Open {
        target: OpenTarget::Output,
        path: path.to_path_buf(),
        source,
    })
}

fn finish_empty<W: Write + Seek>(writer: W) -> Result<()> {
    ZipWriter::new(writer)
        .finish()
        .map(drop)
        .map_err(|e| TranscodeError::Finalize(e.to_string()))
}

fn finalize_error(e: TranscodeError) -> TranscodeError {
    match e {
        TranscodeError::Io(io) => TranscodeError::Finalize(io.to_string()),
        other => other,
    }
}

/// The first fatal error wins; later ones become warnings.
fn record_fatal(report: &mut ConversionReport, error: TranscodeError) {
    if report.fatal.is_some() {
        report.add_warning(error.to_string());
    } else {
        report.fatal = Some(error);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::NoopProgress;
    use crate::formats::CompressionKind;
    use crate::formats::detect;
    use crate::test_utils::TarTestBuilder;
    use crate::test_utils::bzip2;
    use crate::test_utils::gzip;
    use crate::test_utils::read_zip;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn convert(raw: &[u8], name: &str) -> (ConversionReport, Vec<u8>) {
        let mut out = Cursor::new(Vec::new());
        let report = convert_reader(
            raw,
            &detect(name),
            &mut out,
            &ConversionConfig::default(),
            &mut NoopProgress,
        );
        (report, out.into_inner())
    }

    #[test]
    fn test_convert_plain_tar() {
        let tar = TarTestBuilder::new().add_file("a.txt", b"hi").build();
        let (report, zip) = convert(&tar, "plain.tar");

        assert_eq!(report.container, ContainerKind::Tar);
        assert_eq!(report.compression, CompressionKind::None);
        assert_eq!(report.bytes_compressed, zip.len() as u64);
        assert_eq!(read_zip(&zip)[0].data, b"hi");
    }

    #[test]
    fn test_convert_bzip2_tar() {
        let tbz = bzip2(&TarTestBuilder::new().add_file("a.txt", b"bz").build());
        let (report, zip) = convert(&tbz, "archive.tar.bz2");

        assert!(report.is_clean());
        assert_eq!(read_zip(&zip)[0].data, b"bz");
    }

    #[test]
    fn test_gzip_fallback_converts_raw_tar() {
        let tar = TarTestBuilder::new().add_file("a.txt", b"raw").build();
        let (report, zip) = convert(&tar, "mislabelled.tar.gz");

        assert_eq!(report.compression, CompressionKind::Gzip);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.is_clean());
        assert_eq!(read_zip(&zip)[0].data, b"raw");
    }

    #[test]
    fn test_single_file_uses_conversion_time() {
        let before = chrono::Utc::now().timestamp();
        let (report, zip) = convert(&gzip(b"plain text"), "dir/notes.txt.gz");

        assert_eq!(report.container, ContainerKind::SingleFile);
        let entries = read_zip(&zip);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "notes.txt");
        assert_eq!(entries[0].data, b"plain text");

        let (year, ..) = entries[0].modified.unwrap();
        let now_year = chrono::DateTime::from_timestamp(before, 0).unwrap();
        assert_eq!(i32::from(year), chrono::Datelike::year(&now_year));
    }

    #[test]
    fn test_truncated_bzip2_tar_is_header_error() {
        let tbz = bzip2(&TarTestBuilder::new().add_file("a.txt", &[1u8; 4096]).build());
        let (report, zip) = convert(&tbz[..tbz.len() / 2], "cut.tbz2");

        assert!(!report.is_clean());
        // The zip is still finalized and readable.
        let _ = read_zip(&zip);
    }

    #[test]
    fn test_convert_file_writes_next_to_input() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("archive.tgz");
        std::fs::write(
            &input,
            gzip(&TarTestBuilder::new().add_file("a.txt", b"hi").build()),
        )
        .unwrap();

        let report = convert_file(&input, &ConversionConfig::default(), &mut NoopProgress).unwrap();

        assert_eq!(report.output, temp.path().join("archive.zip"));
        assert_eq!(report.input, input);
        let zip = std::fs::read(&report.output).unwrap();
        assert_eq!(zip.len() as u64, report.bytes_compressed);
        assert_eq!(read_zip(&zip)[0].name, "a.txt");
    }

    #[test]
    fn test_convert_file_truncates_existing_output() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("small.tar");
        let output = temp.path().join("small.zip");
        std::fs::write(&output, vec![0xAAu8; 100_000]).unwrap();
        std::fs::write(&input, TarTestBuilder::new().add_file("a", b"a").build()).unwrap();

        let report = convert_file(&input, &ConversionConfig::default(), &mut NoopProgress).unwrap();

        let len = std::fs::metadata(&output).unwrap().len();
        assert_eq!(len, report.bytes_compressed);
        assert!(len < 100_000);
    }

    #[test]
    fn test_missing_input_is_open_error() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("missing.tar");

        let err = convert_file(&input, &ConversionConfig::default(), &mut NoopProgress).unwrap_err();

        assert!(matches!(
            err,
            TranscodeError::Open {
                target: OpenTarget::Input,
                ..
            }
        ));
        assert!(!temp.path().join("missing.zip").exists());
    }

    #[test]
    fn test_uncreatable_output_is_open_error() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("blocked.tar");
        std::fs::write(&input, TarTestBuilder::new().add_file("a", b"a").build()).unwrap();
        // A directory where the output file should go.
        std::fs::create_dir(temp.path().join("blocked.zip")).unwrap();

        let err = convert_file(&input, &ConversionConfig::default(), &mut NoopProgress).unwrap_err();

        assert!(matches!(
            err,
            TranscodeError::Open {
                target: OpenTarget::Output,
                ..
            }
        ));
    }

    #[test]
    fn test_record_fatal_keeps_first() {
        let mut report = ConversionReport::new();
        record_fatal(&mut report, TranscodeError::Header(std::io::Error::other("first")));
        record_fatal(&mut report, TranscodeError::Finalize("second".to_string()));

        assert!(matches!(report.fatal, Some(TranscodeError::Header(_))));
        assert_eq!(report.warnings.len(), 1);
    }
}
