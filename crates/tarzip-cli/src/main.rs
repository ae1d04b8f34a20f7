//! tar2zip - converts tar, tar.gz and tar.bz2 archives (and gzip or bzip2
//! compressed single files) to zip.

mod cli;
mod convert;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();

    let echo = progress::Echo::from_flags(cli.json, cli.verbose, cli.quiet);
    let formatter = output::create_formatter(echo);

    let summary = convert::execute(&cli, echo, &*formatter)?;

    Ok(ExitCode::from(summary.exit_status(cli.strict)))
}
