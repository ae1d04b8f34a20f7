//! Configuration for archive conversion.

use crate::formats::detect::DEFAULT_OUTPUT_EXTENSION;

/// Options threaded through every conversion step.
///
/// Read-only for the duration of a conversion.
///
/// # Examples
///
/// ```
/// use tarzip_core::ConversionConfig;
///
/// // Defaults: quiet, deflate level 6, keep partial entries
/// let config = ConversionConfig::default();
///
/// let custom = ConversionConfig::default()
///     .with_verbose(true)
///     .with_compression_level(9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionConfig {
    /// Emit per-entry progress through the progress callback.
    ///
    /// Default: `false`.
    pub verbose: bool,

    /// Deflate level for zip entries (1-9). `None` uses the deflate default.
    ///
    /// Default: `Some(6)`.
    pub compression_level: Option<u8>,

    /// Extension of the derived output name, without the dot.
    ///
    /// Default: `"zip"`.
    pub output_extension: String,

    /// Keep an entry whose content copy failed partway, truncated, instead of
    /// removing it from the zip. The failure is reported either way.
    ///
    /// Default: `true`.
    pub keep_partial_entries: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            compression_level: Some(6),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            keep_partial_entries: true,
        }
    }
}

impl ConversionConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets verbose per-entry progress.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the deflate level.
    ///
    /// # Panics
    ///
    /// Panics if `level` is not in `1..=9`.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        assert!((1..=9).contains(&level), "compression level must be 1-9");
        self.compression_level = Some(level);
        self
    }

    /// Sets the output extension.
    #[must_use]
    pub fn with_output_extension(mut self, extension: impl Into<String>) -> Self {
        self.output_extension = extension.into();
        self
    }

    /// Sets whether truncated entries survive a copy failure.
    #[must_use]
    pub fn with_keep_partial_entries(mut self, keep: bool) -> Self {
        self.keep_partial_entries = keep;
        self
    }
}
