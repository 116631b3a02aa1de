/// Walks the saved listing page and downloads every missing episode
use anyhow::{anyhow, Context, Result};
use scraper::{ElementRef, Html, Selector};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::fetch::Fetcher;
use crate::filename;
use crate::stats::Stats;

/// Marker classes identifying one season's grouping on the page
const SEASON_CONTAINER_SELECTOR: &str = "div.accordion.ui-accordion.ui-widget.ui-helper-reset";

/// Drives filename derivation and fetching for every episode on the page
pub struct PageWalker<F: Fetcher> {
    fetcher: F,
    base_dir: PathBuf,
    expected_extension: String,
}

impl<F: Fetcher> PageWalker<F> {
    pub fn new(fetcher: F, config: &Config) -> Self {
        Self {
            fetcher,
            base_dir: config.output.base_dir.clone(),
            expected_extension: config.download.expected_extension.clone(),
        }
    }

    /// Walk the document in order, creating one directory per season and
    /// fetching every episode whose file is not already on disk (all of them
    /// when `overwrite` is set). Counters accumulate into `stats` as work
    /// happens, so the caller sees partial numbers after an abort.
    pub async fn walk(&self, html: &str, overwrite: bool, stats: &mut Stats) -> Result<()> {
        let document = Html::parse_document(html);

        let season_selector = Selector::parse(SEASON_CONTAINER_SELECTOR)
            .map_err(|e| anyhow!("invalid season selector: {e}"))?;
        let source_selector =
            Selector::parse("source").map_err(|e| anyhow!("invalid source selector: {e}"))?;

        let seasons: Vec<ElementRef> = document.select(&season_selector).collect();
        info!("Seasons found: {}", seasons.len());

        for season in seasons {
            let season_start = Instant::now();
            let outcome = self
                .download_season(&document, season, &source_selector, overwrite, stats)
                .await;

            // Elapsed time is recorded whether or not the season finished, so
            // a failed fetch does not skew the average speed in the summary
            stats.total_time_sec += season_start.elapsed().as_secs_f64();
            outcome?;
        }

        Ok(())
    }

    async fn download_season(
        &self,
        document: &Html,
        season: ElementRef<'_>,
        source_selector: &Selector,
        overwrite: bool,
        stats: &mut Stats,
    ) -> Result<()> {
        let season_title = find_previous_text(document, season, "h1")
            .context("no h1 heading precedes a season container")?
            .to_lowercase();
        info!("Working on '{}'", season_title);

        let videos: Vec<ElementRef> = season.select(source_selector).collect();
        stats.total_episodes += videos.len() as u64;
        debug!("Videos found: {}", videos.len());

        let season_dir = self.base_dir.join(&season_title);
        if !season_dir.is_dir() {
            tokio::fs::create_dir_all(&season_dir).await?;
            debug!("Dir '{}' created", season_dir.display());
        }

        for video in videos {
            // The title sits in the nearest h3 before the source's
            // enclosing element, not before the source itself
            let title_anchor = video.parent().and_then(ElementRef::wrap).unwrap_or(video);
            let episode_title = find_previous_text(document, title_anchor, "h3")
                .context("no h3 heading precedes a media source")?;

            let src_url = video
                .value()
                .attr("src")
                .context("media source element without a src attribute")?;
            if !src_url.ends_with(&format!(".{}", self.expected_extension)) {
                warn!(
                    "Unfamiliar file type found at '{}', with title '{}'",
                    src_url, episode_title
                );
            }

            let filename = filename::derive(src_url, &episode_title);
            let path = season_dir.join(&filename);

            if path.exists() && !overwrite {
                debug!("Skipping '{}'", episode_title);
                continue;
            }

            self.fetcher.fetch(src_url, &path).await?;
            info!("{} has finished downloading", filename);

            let size = tokio::fs::metadata(&path).await?.len();
            stats.record_download(size);
        }

        Ok(())
    }
}

/// Nearest element named `tag` preceding `target` in document order, as text.
/// Equivalent to walking backwards from the target through the whole document.
fn find_previous_text(document: &Html, target: ElementRef, tag: &str) -> Option<String> {
    let target_id = target.id();
    let mut last = None;

    for node in document.tree.root().descendants() {
        if node.id() == target_id {
            break;
        }
        if let Some(element) = ElementRef::wrap(node) {
            if element.value().name() == tag {
                last = Some(element.text().collect::<String>().trim().to_string());
            }
        }
    }

    last
}
