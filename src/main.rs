//! Trawler CLI: crawl a directory or path list, resuming from the last
//! committed file after any interruption.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use trawler::engine::Cli;
use trawler::engine::handle_run;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
