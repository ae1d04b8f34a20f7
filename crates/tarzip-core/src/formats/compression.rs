//! Whole-stream compression handling for input archives.
//!
//! Inputs may be wrapped in one of two stream encodings before the tar (or
//! single-file) payload begins. This module selects the matching decoder for
//! a raw byte stream.
//!
//! # Supported Codecs
//!
//! - **Gzip** (.tar.gz, .tgz, .gz): multi-member streams are decoded in full
//! - **Bzip2** (.tar.bz2, .tbz2, .bz2): concatenated streams are decoded in
//!   full
//!
//! # Gzip fallback
//!
//! The first gzip member header is read eagerly, optional fields (extra
//! field, file name, comment, header CRC) included. If it is truncated or
//! malformed, [`open_decoder`] returns the raw stream unchanged (including the
//! bytes already read) and reports the failure through [`Decoder::fallback`].
//! Headers of later members and bzip2 streams are only checked while
//! decoding, so their errors surface lazily as read errors.

use std::io::Cursor;
use std::io::Read;

use bzip2::read::MultiBzDecoder;
use flate2::Crc;
use flate2::read::MultiGzDecoder;

use crate::error::TranscodeError;

/// Length of the fixed gzip member header (RFC 1952).
const GZIP_FIXED_HEADER_LEN: u64 = 10;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Compression method byte for deflate, the only one gzip defines.
const GZIP_METHOD_DEFLATE: u8 = 8;

/// FLG bits 5-7 are reserved and must be zero.
const GZIP_RESERVED_FLAGS: u8 = 0xE0;

const GZIP_FLAG_HCRC: u8 = 0x02;
const GZIP_FLAG_EXTRA: u8 = 0x04;
const GZIP_FLAG_NAME: u8 = 0x08;
const GZIP_FLAG_COMMENT: u8 = 0x10;

const GZIP_TRUNCATED: &str = "unexpected end of stream in gzip header";

/// Stream encoding wrapped around an input.
///
/// # Examples
///
/// ```
/// use tarzip_core::formats::compression::CompressionKind;
///
/// assert_eq!(CompressionKind::Gzip.name(), "gzip");
/// assert!(!CompressionKind::None.is_compressed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionKind {
    /// Bytes are read as-is.
    None,
    /// Gzip (deflate) stream.
    Gzip,
    /// Bzip2 stream.
    Bzip2,
}

impl CompressionKind {
    /// Returns a human-readable name for this codec.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
        }
    }

    /// Returns `true` unless this is [`CompressionKind::None`].
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for CompressionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded byte stream plus the reason a fallback happened, if one did.
pub struct Decoder<'a> {
    /// Stream yielding decompressed bytes (or raw bytes after a fallback).
    pub reader: Box<dyn Read + 'a>,
    /// Set when the requested decoder could not be constructed and the raw
    /// stream was returned instead.
    pub fallback: Option<TranscodeError>,
}

impl std::fmt::Debug for Decoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

/// Wraps `raw` in the decoder for `kind`.
///
/// Never fails. A gzip stream whose header cannot be read or validated is
/// passed through undecoded with [`Decoder::fallback`] set to a
/// [`TranscodeError::DecompressionInit`].
///
/// # Examples
///
/// ```
/// use std::io::Read;
/// use tarzip_core::formats::compression::{CompressionKind, open_decoder};
///
/// let mut decoder = open_decoder(CompressionKind::Gzip, &b"not gzip"[..]);
/// assert!(decoder.fallback.is_some());
///
/// let mut raw = String::new();
/// decoder.reader.read_to_string(&mut raw).unwrap();
/// assert_eq!(raw, "not gzip");
/// ```
pub fn open_decoder<'a, R: Read + 'a>(kind: CompressionKind, raw: R) -> Decoder<'a> {
    match kind {
        CompressionKind::None => Decoder {
            reader: Box::new(raw),
            fallback: None,
        },
        CompressionKind::Gzip => open_gzip(raw),
        CompressionKind::Bzip2 => Decoder {
            reader: Box::new(MultiBzDecoder::new(raw)),
            fallback: None,
        },
    }
}

fn open_gzip<'a, R: Read + 'a>(mut raw: R) -> Decoder<'a> {
    let mut header = Vec::with_capacity(GZIP_FIXED_HEADER_LEN as usize);
    let problem = read_gzip_header(&mut raw, &mut header).err();

    // The peeked bytes go back in front of the stream either way.
    let restored = Cursor::new(header).chain(raw);

    match problem {
        None => Decoder {
            reader: Box::new(MultiGzDecoder::new(restored)),
            fallback: None,
        },
        Some(reason) => Decoder {
            reader: Box::new(restored),
            fallback: Some(TranscodeError::DecompressionInit(reason)),
        },
    }
}

/// Reads the first gzip member header from `raw` into `header` and
/// validates it. On error `header` holds every byte consumed so far.
fn read_gzip_header<R: Read>(raw: &mut R, header: &mut Vec<u8>) -> Result<(), String> {
    peek_exact(raw, header, GZIP_FIXED_HEADER_LEN)?;
    check_fixed_header(header)?;

    let flags = header[3];
    if flags & GZIP_FLAG_EXTRA != 0 {
        let start = header.len();
        peek_exact(raw, header, 2)?;
        let xlen = u16::from_le_bytes([header[start], header[start + 1]]);
        peek_exact(raw, header, u64::from(xlen))?;
    }
    if flags & GZIP_FLAG_NAME != 0 {
        peek_until_nul(raw, header)?;
    }
    if flags & GZIP_FLAG_COMMENT != 0 {
        peek_until_nul(raw, header)?;
    }
    if flags & GZIP_FLAG_HCRC != 0 {
        let mut crc = Crc::new();
        crc.update(header);
        let expected = crc.sum().to_le_bytes();

        let start = header.len();
        peek_exact(raw, header, 2)?;
        if header[start..] != expected[..2] {
            return Err("gzip header checksum mismatch".to_string());
        }
    }
    Ok(())
}

/// Validates the fixed part of a gzip member header.
fn check_fixed_header(header: &[u8]) -> Result<(), String> {
    if header[..2] != GZIP_MAGIC {
        return Err("invalid gzip header".to_string());
    }
    if header[2] != GZIP_METHOD_DEFLATE {
        return Err(format!("unsupported gzip compression method {}", header[2]));
    }
    if header[3] & GZIP_RESERVED_FLAGS != 0 {
        return Err("reserved gzip header flags set".to_string());
    }
    Ok(())
}

fn peek_exact<R: Read>(raw: &mut R, header: &mut Vec<u8>, len: u64) -> Result<(), String> {
    let read = raw
        .by_ref()
        .take(len)
        .read_to_end(header)
        .map_err(|e| e.to_string())?;
    if (read as u64) < len {
        return Err(GZIP_TRUNCATED.to_string());
    }
    Ok(())
}

/// Reads a zero-terminated header field, terminator included.
fn peek_until_nul<R: Read>(raw: &mut R, header: &mut Vec<u8>) -> Result<(), String> {
    let mut byte = [0u8; 1];
    loop {
        match raw.read(&mut byte) {
            Ok(0) => return Err(GZIP_TRUNCATED.to_string()),
            Ok(_) => {
                header.push(byte[0]);
                if byte[0] == 0 {
                    return Ok(());
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::bzip2;
    use crate::test_utils::gzip;

    fn read_all(decoder: Decoder<'_>) -> Vec<u8> {
        let mut reader = decoder.reader;
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_none_passes_through() {
        let decoder = open_decoder(CompressionKind::None, &b"plain bytes"[..]);
        assert!(decoder.fallback.is_none());
        assert_eq!(read_all(decoder), b"plain bytes");
    }

    #[test]
    fn test_gzip_decodes() {
        let data = gzip(b"hello gzip");
        let decoder = open_decoder(CompressionKind::Gzip, data.as_slice());
        assert!(decoder.fallback.is_none());
        assert_eq!(read_all(decoder), b"hello gzip");
    }

    #[test]
    fn test_gzip_multi_member() {
        let mut data = gzip(b"first ");
        data.extend(gzip(b"second"));
        let decoder = open_decoder(CompressionKind::Gzip, data.as_slice());
        assert_eq!(read_all(decoder), b"first second");
    }

    #[test]
    fn test_gzip_bad_magic_falls_back_to_raw() {
        let raw = b"this is definitely not gzip data".to_vec();
        let decoder = open_decoder(CompressionKind::Gzip, raw.as_slice());
        assert!(matches!(
            decoder.fallback,
            Some(TranscodeError::DecompressionInit(_))
        ));
        assert_eq!(read_all(decoder), raw);
    }

    #[test]
    fn test_gzip_short_stream_falls_back() {
        let decoder = open_decoder(CompressionKind::Gzip, &[0x1F, 0x8B][..]);
        assert!(decoder.fallback.is_some());
        assert_eq!(read_all(decoder), vec![0x1F, 0x8B]);
    }

    #[test]
    fn test_gzip_empty_stream_falls_back() {
        let decoder = open_decoder(CompressionKind::Gzip, &[][..]);
        assert!(decoder.fallback.is_some());
        assert!(read_all(decoder).is_empty());
    }

    #[test]
    fn test_gzip_bad_method_falls_back() {
        let mut data = gzip(b"payload");
        data[2] = 7;
        let decoder = open_decoder(CompressionKind::Gzip, data.as_slice());
        let reason = decoder.fallback.as_ref().unwrap().to_string();
        assert!(reason.contains("compression method 7"));
    }

    #[test]
    fn test_gzip_reserved_flags_fall_back() {
        let mut data = gzip(b"payload");
        data[3] |= 0x80;
        let decoder = open_decoder(CompressionKind::Gzip, data.as_slice());
        assert!(decoder.fallback.is_some());
    }

    fn gzip_with_optional_fields() -> Vec<u8> {
        let mut encoder = flate2::GzBuilder::new()
            .extra(vec![1, 2, 3, 4])
            .filename("inner.tar")
            .comment("made for tests")
            .write(Vec::new(), flate2::Compression::default());
        std::io::Write::write_all(&mut encoder, b"payload").unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_gzip_optional_fields_decode() {
        let data = gzip_with_optional_fields();
        let decoder = open_decoder(CompressionKind::Gzip, data.as_slice());
        assert!(decoder.fallback.is_none());
        assert_eq!(read_all(decoder), b"payload");
    }

    #[test]
    fn test_gzip_truncated_in_optional_fields_falls_back() {
        let data = gzip_with_optional_fields();
        // Fixed header, XLEN and extra field, then part of the file name.
        let cut = &data[..10 + 2 + 4 + 3];
        let decoder = open_decoder(CompressionKind::Gzip, cut);

        let reason = decoder.fallback.as_ref().unwrap().to_string();
        assert!(reason.contains("unexpected end of stream"));
        assert_eq!(read_all(decoder), cut);
    }

    /// Sets FHCRC on a plain gzip stream and inserts `crc` after the fixed
    /// header.
    fn with_header_crc(crc: [u8; 2]) -> Vec<u8> {
        let mut data = gzip(b"payload");
        data[3] |= GZIP_FLAG_HCRC;
        data.insert(10, crc[0]);
        data.insert(11, crc[1]);
        data
    }

    #[test]
    fn test_gzip_header_crc_checked() {
        let mut fixed = gzip(b"payload")[..10].to_vec();
        fixed[3] |= GZIP_FLAG_HCRC;
        let mut crc = Crc::new();
        crc.update(&fixed);
        let sum = crc.sum().to_le_bytes();

        let good = with_header_crc([sum[0], sum[1]]);
        let decoder = open_decoder(CompressionKind::Gzip, good.as_slice());
        assert!(decoder.fallback.is_none());
        assert_eq!(read_all(decoder), b"payload");

        let bad = with_header_crc([!sum[0], sum[1]]);
        let decoder = open_decoder(CompressionKind::Gzip, bad.as_slice());
        let reason = decoder.fallback.as_ref().unwrap().to_string();
        assert!(reason.contains("checksum"));
        assert_eq!(read_all(decoder), bad);
    }

    #[test]
    fn test_bzip2_decodes() {
        let data = bzip2(b"hello bzip2");
        let decoder = open_decoder(CompressionKind::Bzip2, data.as_slice());
        assert!(decoder.fallback.is_none());
        assert_eq!(read_all(decoder), b"hello bzip2");
    }

    #[test]
    fn test_bzip2_garbage_fails_lazily() {
        let decoder = open_decoder(CompressionKind::Bzip2, &b"not bzip2 at all"[..]);
        assert!(decoder.fallback.is_none());

        let mut reader = decoder.reader;
        let mut out = Vec::new();
        assert!(reader.read_to_end(&mut out).is_err());
    }

    #[test]
    fn test_codec_name() {
        assert_eq!(CompressionKind::None.name(), "none");
        assert_eq!(CompressionKind::Gzip.name(), "gzip");
        assert_eq!(CompressionKind::Bzip2.name(), "bzip2");
        assert_eq!(CompressionKind::Bzip2.to_string(), "bzip2");
    }
}
