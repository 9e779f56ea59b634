//! Command handler: wire CLI options into the pipeline, consume the drain,
//! and report per-item errors plus a final summary.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::engine::arg_parser::Cli;
use crate::engine::progress::{ProgressObserver, create_counter};
use crate::error::{LoadErrorKind, TrawlError};
use crate::loader::ReadLoader;
use crate::observer::{NullObserver, TrawlObserver};
use crate::types::{SortDirection, TrawlOpts};
use crate::utils::file_config::load_file_config;
use crate::utils::setup_logging;
use crate::{clear_checkpoint, trawl_with_observer};

/// Per-kind tallies for the end-of-run summary.
#[derive(Default)]
struct Tally {
    loaded: usize,
    invalid: usize,
    wrong_kind: usize,
    missing: usize,
}

impl Tally {
    fn errored(&self) -> usize {
        self.invalid + self.wrong_kind + self.missing
    }
}

/// Merge CLI flags over `.trawler.toml` (flags win) into TrawlOpts plus the
/// extension filter.
fn build_opts(cli: &Cli) -> (TrawlOpts, Vec<String>) {
    let file = load_file_config(&cli.root).unwrap_or_default().crawl;
    let descending = cli.descending || file.descending.unwrap_or(false);
    let opts = TrawlOpts {
        prefetch_depth: cli.prefetch.or(file.prefetch),
        workers: cli.workers.or(file.workers),
        direction: if descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        },
        state_dir: cli.state_dir.clone().or(file.state_dir),
    };
    let extensions = if cli.extensions.is_empty() {
        file.extensions.unwrap_or_default()
    } else {
        cli.extensions.clone()
    };
    (opts, extensions)
}

/// Run one crawl over `cli.root`. Per-item errors are reported and skipped;
/// fatal errors (stale checkpoint, checkpoint write failure, traversal
/// failure) abort with a diagnostic.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose);
    let (opts, extensions) = build_opts(cli);

    if cli.reset {
        let cleared = clear_checkpoint(&cli.root, &opts)?;
        if cleared {
            info!("cleared checkpoint for {}", cli.root.display());
        }
    }

    let loader = Arc::new(ReadLoader::with_extensions(extensions));
    let (bar, observer): (_, Arc<dyn TrawlObserver>) = if cli.verbose {
        (None, Arc::new(NullObserver))
    } else {
        let bar = create_counter("Trawling");
        (Some(bar.clone()), Arc::new(ProgressObserver::new(bar)))
    };

    let mut trawl = trawl_with_observer(&cli.root, &opts, loader, observer).map_err(|e| {
        match e {
            TrawlError::StaleCheckpoint { .. } => {
                anyhow::Error::new(e).context("run again with --reset to restart from scratch")
            }
            other => anyhow::Error::new(other),
        }
    })?;

    let token = trawl.cancel_token();
    ctrlc::set_handler(move || {
        token.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let mut tally = Tally::default();
    for item in trawl.by_ref() {
        match item.error() {
            None => {
                tally.loaded += 1;
                debug!(
                    "loaded {} ({} bytes)",
                    item.path().display(),
                    item.payload().map_or(0, |p| p.len())
                );
            }
            Some(err) => {
                match err.kind {
                    LoadErrorKind::InvalidFormat => tally.invalid += 1,
                    LoadErrorKind::WrongKind => tally.wrong_kind += 1,
                    LoadErrorKind::NotFound => tally.missing += 1,
                }
                warn!("skipping {}: {}", item.path().display(), err);
            }
        }
        // Downstream processing would go here; releasing the item commits
        // its checkpoint position.
        item.finish()?;
    }

    let cancelled = trawl.cancel_token().load(Ordering::Relaxed);
    let produced = trawl.finish()?;
    drop(bar);

    if tally.errored() > 0 {
        warn!(
            "{} of {} files failed to load ({} invalid, {} wrong kind, {} missing)",
            tally.errored(),
            produced,
            tally.invalid,
            tally.wrong_kind,
            tally.missing
        );
    }
    if cancelled {
        info!(
            "cancelled after {} of {} files; checkpoint kept, rerun to resume",
            tally.loaded + tally.errored(),
            produced
        );
    } else {
        info!("{} files loaded, {} skipped", tally.loaded, tally.errored());
    }
    Ok(())
}
