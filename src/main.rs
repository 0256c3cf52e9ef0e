//! Subgrab CLI: fetch subtitles/audio for a manifest of videos, resuming from the processed log.

use anyhow::Result;
use clap::Parser;
use subgrab::engine::arg_parser::Cli;
use subgrab::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
