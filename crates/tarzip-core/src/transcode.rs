//! Entry-by-entry transcoding into a zip archive.
//!
//! [`transcode`] pulls entries from an [`EntrySource`] and writes each one as
//! a deflated zip entry. Per-entry failures are recorded and the loop moves
//! on; a source error ends the loop. On every path the zip central directory
//! is written exactly once before the writer is handed back.

use std::collections::HashSet;
use std::io::Read;
use std::io::Seek;
use std::io::Write;

use chrono::Datelike;
use chrono::Timelike;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::FullFileOptions;

use crate::ConversionConfig;
use crate::ConversionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::entries::EntrySource;
use crate::entries::SingleEntry;
use crate::entries::SourceEntry;
use crate::entries::SourceItem;
use crate::error::TranscodeError;
use crate::report::EntryOutcome;
use crate::report::EntryStatus;
use crate::types::EntryDescriptor;

/// Writes every entry of `source` into a new zip archive on `writer`.
///
/// Outcomes, byte counts, warnings and a fatal source error (if any) are
/// recorded in `report`. Returns the underlying writer once the archive
/// trailer has been written.
///
/// # Errors
///
/// Returns [`TranscodeError::Finalize`] if the zip trailer could not be
/// written. Every other failure is recorded in `report` instead.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use tarzip_core::entries::TarEntries;
/// use tarzip_core::test_utils::TarTestBuilder;
/// use tarzip_core::transcode::transcode;
/// use tarzip_core::{ConversionConfig, ConversionReport, NoopProgress};
///
/// let data = TarTestBuilder::new().add_file("a.txt", b"hi").build();
/// let mut archive = tar::Archive::new(data.as_slice());
/// let mut source = TarEntries::new(&mut archive)?;
/// let mut report = ConversionReport::new();
///
/// let zip = transcode(
///     &mut source,
///     Cursor::new(Vec::new()),
///     &ConversionConfig::default(),
///     &mut NoopProgress,
///     &mut report,
/// )?;
///
/// assert_eq!(report.files_converted(), 1);
/// assert!(!zip.into_inner().is_empty());
/// # Ok::<(), tarzip_core::TranscodeError>(())
/// ```
pub fn transcode<W: Write + Seek>(
    source: &mut dyn EntrySource,
    writer: W,
    config: &ConversionConfig,
    progress: &mut dyn ProgressCallback,
    report: &mut ConversionReport,
) -> Result<W> {
    let mut sink = ZipSink::new(writer, config);

    loop {
        let item = match source.next_entry() {
            Ok(Some(item)) => item,
            Ok(None) => break,
            Err(e) => {
                report.fatal = Some(e);
                break;
            }
        };

        let outcome = match item {
            SourceItem::Skipped(descriptor) => {
                let type_code = descriptor.kind.type_code();
                progress.on_entry_skipped(&descriptor.name, type_code);
                EntryOutcome {
                    name: descriptor.name,
                    status: EntryStatus::Skipped { type_code },
                }
            }
            SourceItem::Accepted(entry) => sink.write_entry(entry, config, progress, report),
        };
        report.entries.push(outcome);
    }

    let finished = sink
        .zip
        .finish()
        .map_err(|e| TranscodeError::Finalize(e.to_string()));
    progress.on_complete();
    finished
}

/// Writes one whole stream into a new zip archive as a single regular file.
///
/// `modified_at` is stamped on the entry as is; callers converting a
/// compressed single file pass the conversion start time.
///
/// # Errors
///
/// Same as [`transcode`].
pub fn wrap_single<R: Read, W: Write + Seek>(
    content: R,
    entry_name: &str,
    modified_at: i64,
    writer: W,
    config: &ConversionConfig,
    progress: &mut dyn ProgressCallback,
    report: &mut ConversionReport,
) -> Result<W> {
    if config.verbose {
        progress.on_detail(&format!("Converting single non-tar file {entry_name}."));
    }

    let mut source = SingleEntry::new(content, entry_name, modified_at);
    transcode(&mut source, writer, config, progress, report)
}

/// Header ID of the Info-ZIP extended timestamp extra field.
const EXTENDED_TIMESTAMP_ID: u16 = 0x5455;

/// Zip writer plus the state kept across entries of one archive.
struct ZipSink<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: FullFileOptions<'static>,
    buffer: CopyBuffer,
    // The zip writer rejects a second entry of the same name.
    names: HashSet<String>,
}

impl<W: Write + Seek> ZipSink<W> {
    fn new(writer: W, config: &ConversionConfig) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            options: FullFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(config.compression_level.map(i64::from)),
            buffer: CopyBuffer::new(),
            names: HashSet::new(),
        }
    }

    fn write_entry(
        &mut self,
        entry: SourceEntry<'_>,
        config: &ConversionConfig,
        progress: &mut dyn ProgressCallback,
        report: &mut ConversionReport,
    ) -> EntryOutcome {
        let SourceEntry {
            descriptor,
            content,
        } = entry;
        let directory = descriptor.is_directory_record();
        let size = descriptor.size.unwrap_or(0);
        let name = descriptor.name.clone();

        if config.verbose {
            progress.on_detail(&format!("Converting <{name}>, size {size}"));
        }

        if self.names.contains(&name) {
            return failed(name.clone(), TranscodeError::DuplicateName { name }, progress);
        }

        let options = self.entry_options(&descriptor, progress, report);
        let started = if directory {
            self.zip.add_directory(name.as_str(), options)
        } else {
            self.zip.start_file(name.as_str(), options)
        };
        if let Err(e) = started {
            return failed(
                name.clone(),
                TranscodeError::EntryCreate {
                    name,
                    reason: e.to_string(),
                },
                progress,
            );
        }
        self.names.insert(name.clone());

        progress.on_entry_start(&name, size);

        // Directory records carry no content.
        let copied = if directory {
            Ok(0)
        } else {
            copy_with_buffer(content, &mut self.zip, &mut self.buffer, progress)
        };

        match copied {
            Ok(bytes) => {
                report.bytes_written += bytes;
                progress.on_entry_complete(&name);
                EntryOutcome {
                    name,
                    status: EntryStatus::Converted { bytes, directory },
                }
            }
            Err(source) => {
                if !config.keep_partial_entries {
                    match self.zip.abort_file() {
                        Ok(()) => {
                            self.names.remove(&name);
                        }
                        Err(e) => {
                            let msg = format!("could not remove partial entry <{name}>: {e}");
                            progress.on_warning(&msg);
                            report.add_warning(msg);
                        }
                    }
                }
                failed(
                    name.clone(),
                    TranscodeError::Copy { name, source },
                    progress,
                )
            }
        }
    }

    /// Per-entry options. The DOS timestamp is clamped to its range; the
    /// extended timestamp field keeps the exact unix time.
    fn entry_options(
        &self,
        descriptor: &EntryDescriptor,
        progress: &mut dyn ProgressCallback,
        report: &mut ConversionReport,
    ) -> FullFileOptions<'static> {
        let name = &descriptor.name;
        let mtime = descriptor.modified_at;
        let exact = extended_timestamp(mtime);

        if exact.is_none() {
            let msg = format!(
                "modification time of <{name}> ({mtime}) cannot be stored in a zip, using 1980-01-01"
            );
            progress.on_warning(&msg);
            report.add_warning(msg);
        }

        let mut options = self
            .options
            .clone()
            .last_modified_time(dos_date_time(mtime).unwrap_or_default())
            .large_file(descriptor.needs_zip64());

        if let Some(field) = exact
            && let Err(e) = options.add_extra_data(EXTENDED_TIMESTAMP_ID, field, false)
        {
            let msg = format!("could not record exact modification time of <{name}>: {e}");
            progress.on_warning(&msg);
            report.add_warning(msg);
        }

        options
    }
}

fn failed(
    name: String,
    error: TranscodeError,
    progress: &mut dyn ProgressCallback,
) -> EntryOutcome {
    progress.on_entry_failed(&name, &error);
    EntryOutcome {
        name,
        status: EntryStatus::Failed(error),
    }
}

/// Body of an extended timestamp field carrying only the modification time.
///
/// Returns `None` if `unix_secs` does not fit the field's 32 bits.
fn extended_timestamp(unix_secs: i64) -> Option<[u8; 5]> {
    let secs = u32::try_from(unix_secs).ok()?.to_le_bytes();
    Some([0b0000_0001, secs[0], secs[1], secs[2], secs[3]])
}

/// Converts unix seconds to a zip (DOS) timestamp in UTC.
///
/// Returns `None` outside 1980-01-01..=2107-12-31. Odd seconds round down.
fn dos_date_time(unix_secs: i64) -> Option<zip::DateTime> {
    let utc = chrono::DateTime::from_timestamp(unix_secs, 0)?;

    zip::DateTime::from_date_and_time(
        u16::try_from(utc.year()).ok()?,
        u8::try_from(utc.month()).ok()?,
        u8::try_from(utc.day()).ok()?,
        u8::try_from(utc.hour()).ok()?,
        u8::try_from(utc.minute()).ok()?,
        u8::try_from(utc.second()).ok()?,
    )
    .ok()
}
