//! CLI argument parsing using clap.

use clap::Parser;
use std::path::PathBuf;
use tarzip_core::ConversionConfig;

#[derive(Parser)]
#[command(name = "tar2zip")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Each FILE is written next to itself with its archive suffix replaced by \
    .zip: archive.tar.gz -> archive.zip, notes.txt.gz -> notes.txt.zip.")]
pub struct Cli {
    /// Archives to convert (.tar, .tar.gz, .tgz, .tar.bz2, .tbz2, .gz, .bz2)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Print a line for every converted entry
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output one JSON document per file
    #[arg(short, long)]
    pub json: bool,

    /// Deflate compression level (1-9)
    #[arg(
        short = 'l',
        long,
        default_value = "6",
        value_parser = clap::value_parser!(u8).range(1..=9)
    )]
    pub compression_level: u8,

    /// Drop entries truncated by a read error instead of keeping them
    #[arg(long)]
    pub discard_partial: bool,

    /// Exit with status 1 if any file or entry failed to convert
    #[arg(long)]
    pub strict: bool,
}

impl Cli {
    /// Builds the conversion options selected on the command line.
    pub fn config(&self) -> ConversionConfig {
        ConversionConfig::default()
            .with_verbose(self.verbose && !self.json)
            .with_compression_level(self.compression_level)
            .with_keep_partial_entries(!self.discard_partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["tar2zip", "a.tar"]);
        let config = cli.config();
        assert_eq!(config.compression_level, Some(6));
        assert!(!config.verbose);
        assert!(config.keep_partial_entries);
        assert!(!cli.strict);
    }

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::parse_from([
            "tar2zip",
            "-v",
            "-l",
            "9",
            "--discard-partial",
            "a.tar",
            "b.tgz",
        ]);
        let config = cli.config();
        assert_eq!(cli.files.len(), 2);
        assert!(config.verbose);
        assert_eq!(config.compression_level, Some(9));
        assert!(!config.keep_partial_entries);
    }

    #[test]
    fn test_json_disables_verbose_details() {
        let cli = Cli::parse_from(["tar2zip", "-v", "-j", "a.tar"]);
        assert!(!cli.config().verbose);
    }

    #[test]
    fn test_rejects_out_of_range_level() {
        assert!(Cli::try_parse_from(["tar2zip", "-l", "0", "a.tar"]).is_err());
        assert!(Cli::try_parse_from(["tar2zip", "-l", "10", "a.tar"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["tar2zip", "-q", "-v", "a.tar"]).is_err());
    }
}
