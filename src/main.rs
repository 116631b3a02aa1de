use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{error, info, warn};

mod config;
mod fetch;
mod filename;
mod stats;
mod walker;

use crate::config::Config;
use crate::fetch::HttpFetcher;
use crate::stats::Stats;
use crate::walker::PageWalker;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Episode Downloader")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Downloads episodes listed on a saved HTML page into per-season directories")
        .arg(
            Arg::new("source")
                .value_name("FILE")
                .help("Path to a local copy of the episode listing page")
                .required(true),
        )
        .arg(
            Arg::new("overwrite")
                .short('o')
                .long("overwrite")
                .help("Overwrite existing files, default=false")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase output verbosity")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let source = PathBuf::from(matches.get_one::<String>("source").unwrap());
    let overwrite = matches.get_flag("overwrite");
    let verbose = matches.get_flag("verbose");

    // Initialize logging
    let filter = if verbose {
        "episode_dl=debug,warn"
    } else {
        "episode_dl=info,warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    config.validate()?;

    let html = tokio::fs::read_to_string(&source)
        .await
        .with_context(|| format!("failed to read '{}'", source.display()))?;
    if html.contains("coinhive") {
        // Parsing never executes scripts, but warn anyway
        warn!("HTML still contains coinhive script, please beware!");
    }

    let fetcher = HttpFetcher::new(&config.download.user_agent);
    let walker = PageWalker::new(fetcher, &config);

    let mut stats = Stats::default();
    let outcome = tokio::select! {
        result = walker.walk(&html, overwrite, &mut stats) => result,
        _ = tokio::signal::ctrl_c() => {
            error!("Program interrupted by user");
            Ok(())
        }
    };

    // The summary prints whatever accumulated, even after an interrupt or a
    // failed fetch
    info!("{}", stats.summary());

    outcome
}
