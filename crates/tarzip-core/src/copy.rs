//! Entry content copy with a reusable buffer.
//!
//! One [`CopyBuffer`] is allocated per conversion and reused for every entry,
//! instead of the fresh 8 KiB buffer `std::io::copy` uses per call.

use std::io::Read;
use std::io::Write;
use std::io::{self};

use crate::ProgressCallback;

/// Buffer size for content copies (64 KiB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable copy buffer.
///
/// # Examples
///
/// ```
/// use tarzip_core::NoopProgress;
/// use tarzip_core::copy::{CopyBuffer, copy_with_buffer};
///
/// let mut buffer = CopyBuffer::new();
/// let mut input: &[u8] = b"entry content";
/// let mut output = Vec::new();
///
/// let copied = copy_with_buffer(&mut input, &mut output, &mut buffer, &mut NoopProgress)?;
/// assert_eq!(copied, 13);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a new zeroed copy buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `reader` into `writer` until end of input, reporting every chunk
/// to `progress`.
///
/// Returns the number of bytes copied. `Interrupted` reads are retried; any
/// other error is returned as is, after the bytes copied so far have been
/// reported.
pub fn copy_with_buffer<R, W>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    progress: &mut dyn ProgressCallback,
) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer.buf[..bytes_read])?;
        total += bytes_read as u64;
        progress.on_bytes_written(bytes_read as u64);
    }

    Ok(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::NoopProgress;
    use crate::test_utils::FailingReader;
    use std::io::Cursor;

    #[derive(Default)]
    struct ByteCounter(u64);

    impl ProgressCallback for ByteCounter {
        fn on_entry_start(&mut self, _: &str, _: u64) {}
        fn on_bytes_written(&mut self, bytes: u64) {
            self.0 += bytes;
        }
        fn on_entry_complete(&mut self, _: &str) {}
        fn on_entry_skipped(&mut self, _: &str, _: u8) {}
        fn on_entry_failed(&mut self, _: &str, _: &crate::TranscodeError) {}
        fn on_detail(&mut self, _: &str) {}
        fn on_warning(&mut self, _: &str) {}
        fn on_complete(&mut self) {}
    }

    #[test]
    fn test_copy_buffer_size() {
        assert_eq!(CopyBuffer::new().size(), 64 * 1024);
        assert_eq!(CopyBuffer::default().size(), 64 * 1024);
    }

    #[test]
    fn test_copy_empty_source() {
        let mut buffer = CopyBuffer::new();
        let mut input = Cursor::new(Vec::<u8>::new());
        let mut output = Vec::new();

        let copied = copy_with_buffer(&mut input, &mut output, &mut buffer, &mut NoopProgress);
        assert_eq!(copied.unwrap(), 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_copy_large_data_reports_progress() {
        let mut buffer = CopyBuffer::new();
        let input_data = vec![0x42u8; 1024 * 1024 + 17];
        let mut input = Cursor::new(&input_data);
        let mut output = Vec::new();
        let mut counter = ByteCounter::default();

        let copied = copy_with_buffer(&mut input, &mut output, &mut buffer, &mut counter).unwrap();
        assert_eq!(copied, input_data.len() as u64);
        assert_eq!(counter.0, copied);
        assert_eq!(output, input_data);
    }

    #[test]
    fn test_copy_reuses_buffer() {
        let mut buffer = CopyBuffer::new();
        for data in [&b"first"[..], &b"second"[..]] {
            let mut input = data;
            let mut output = Vec::new();
            copy_with_buffer(&mut input, &mut output, &mut buffer, &mut NoopProgress).unwrap();
            assert_eq!(output, data);
        }
    }

    #[test]
    fn test_copy_read_error_after_partial_data() {
        let mut buffer = CopyBuffer::new();
        let mut input = FailingReader::new(b"partial".to_vec());
        let mut output = Vec::new();
        let mut counter = ByteCounter::default();

        let result = copy_with_buffer(&mut input, &mut output, &mut buffer, &mut counter);
        assert!(result.is_err());
        assert_eq!(output, b"partial");
        assert_eq!(counter.0, 7);
    }
}
