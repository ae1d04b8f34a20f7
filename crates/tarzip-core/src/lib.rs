//! Streaming conversion of tar archives (plain, gzip or bzip2) to zip.
//!
//! `tarzip-core` reads a tar stream entry by entry and writes each regular
//! file, directory and sparse file into a deflated zip archive, keeping
//! entry names and modification times. Entries of other kinds (links,
//! devices, FIFOs) are skipped and reported. A compressed file that is not a
//! tar (`notes.txt.gz`) becomes a zip holding that one file.
//!
//! Nothing is buffered beyond one copy buffer: input is decoded and copied
//! as it is read.
//!
//! # Examples
//!
//! ```no_run
//! use tarzip_core::{ConversionConfig, NoopProgress, convert_file};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConversionConfig::default();
//! let report = convert_file("archive.tar.gz", &config, &mut NoopProgress)?;
//! println!("Converted {} files", report.files_converted());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod copy;
pub mod entries;
pub mod error;
pub mod formats;
pub mod report;
pub mod transcode;
pub mod types;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use api::convert_file;
pub use api::convert_reader;
pub use config::ConversionConfig;
pub use error::OpenTarget;
pub use error::Result;
pub use error::TranscodeError;
pub use report::ConversionReport;
pub use report::EntryOutcome;
pub use report::EntryStatus;
pub use report::NoopProgress;
pub use report::ProgressCallback;

// Re-export types module for easier access
pub use formats::CompressionKind;
pub use formats::ContainerKind;
pub use types::EntryDescriptor;
pub use types::EntryKind;
