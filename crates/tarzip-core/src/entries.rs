//! Entry sources feeding the transcoder.
//!
//! An [`EntrySource`] is a lending iterator: [`EntrySource::next_entry`]
//! borrows the source mutably for as long as the returned entry lives, so the
//! content reader of entry N cannot be touched once entry N+1 is requested.
//! This is the contract tar imposes anyway (all entries share one cursor over
//! the underlying stream); here the borrow checker enforces it.

use std::io::Read;

use crate::Result;
use crate::error::TranscodeError;
use crate::types::EntryDescriptor;
use crate::types::EntryKind;

/// An accepted entry: its metadata plus a reader over its content.
pub struct SourceEntry<'s> {
    /// Entry metadata.
    pub descriptor: EntryDescriptor,
    /// Content reader, valid until the next call to
    /// [`EntrySource::next_entry`].
    pub content: &'s mut dyn Read,
}

impl std::fmt::Debug for SourceEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// One step of an entry source.
#[derive(Debug)]
pub enum SourceItem<'s> {
    /// Entry to be written to the zip.
    Accepted(SourceEntry<'s>),
    /// Entry of an unsupported kind; its content is never exposed.
    Skipped(EntryDescriptor),
}

/// Forward-only, finite sequence of source entries.
pub trait EntrySource {
    /// Advances to the next entry.
    ///
    /// Returns `Ok(None)` at a clean end of stream. Any error is fatal to the
    /// sequence: callers must not call `next_entry` again after an `Err`.
    fn next_entry(&mut self) -> Result<Option<SourceItem<'_>>>;
}

/// Entry source over a decoded tar stream.
///
/// GNU long-name and PAX extended headers are applied by the tar reader and
/// never surface as entries.
///
/// # Examples
///
/// ```
/// use tarzip_core::entries::{EntrySource, SourceItem, TarEntries};
/// use tarzip_core::test_utils::TarTestBuilder;
///
/// let data = TarTestBuilder::new().add_file("a.txt", b"hi").build();
/// let mut archive = tar::Archive::new(data.as_slice());
/// let mut entries = TarEntries::new(&mut archive)?;
///
/// match entries.next_entry()? {
///     Some(SourceItem::Accepted(entry)) => assert_eq!(entry.descriptor.name, "a.txt"),
///     _ => unreachable!(),
/// }
/// assert!(entries.next_entry()?.is_none());
/// # Ok::<(), tarzip_core::TranscodeError>(())
/// ```
pub struct TarEntries<'a, R: Read + 'a> {
    entries: tar::Entries<'a, R>,
    current: Option<tar::Entry<'a, R>>,
}

impl<'a, R: Read + 'a> TarEntries<'a, R> {
    /// Starts iterating `archive` from its current position.
    pub fn new(archive: &'a mut tar::Archive<R>) -> Result<Self> {
        let entries = archive.entries().map_err(TranscodeError::Header)?;
        Ok(Self {
            entries,
            current: None,
        })
    }
}

impl<'a, R: Read + 'a> EntrySource for TarEntries<'a, R> {
    fn next_entry(&mut self) -> Result<Option<SourceItem<'_>>> {
        // Releasing the previous entry lets the tar reader skip its unread
        // content on the next header read.
        self.current = None;

        let Some(entry) = self.entries.next() else {
            return Ok(None);
        };
        let entry = entry.map_err(TranscodeError::Header)?;
        let descriptor = describe(&entry)?;

        if !descriptor.kind.is_supported() {
            return Ok(Some(SourceItem::Skipped(descriptor)));
        }

        let content = self.current.insert(entry);
        Ok(Some(SourceItem::Accepted(SourceEntry {
            descriptor,
            content,
        })))
    }
}

fn describe<R: Read>(entry: &tar::Entry<'_, R>) -> Result<EntryDescriptor> {
    let header = entry.header();
    let mtime = header.mtime().map_err(TranscodeError::Header)?;

    Ok(EntryDescriptor {
        name: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
        size: Some(entry.size()),
        modified_at: i64::try_from(mtime).unwrap_or(i64::MAX),
        kind: EntryKind::from(header.entry_type()),
    })
}

/// Source yielding exactly one regular-file entry over a whole stream.
///
/// Used for inputs that are compressed single files rather than tar
/// archives.
pub struct SingleEntry<R> {
    descriptor: Option<EntryDescriptor>,
    content: R,
}

impl<R: Read> SingleEntry<R> {
    /// Wraps `content` as a regular file called `name`. The size is not
    /// known up front.
    pub fn new(content: R, name: impl Into<String>, modified_at: i64) -> Self {
        Self {
            descriptor: Some(EntryDescriptor::streamed_file(name, modified_at)),
            content,
        }
    }
}

impl<R: Read> EntrySource for SingleEntry<R> {
    fn next_entry(&mut self) -> Result<Option<SourceItem<'_>>> {
        Ok(self.descriptor.take().map(|descriptor| {
            SourceItem::Accepted(SourceEntry {
                descriptor,
                content: &mut self.content,
            })
        }))
    }
}
