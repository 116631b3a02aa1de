/// Aggregate download statistics for a single run
use serde::{Deserialize, Serialize};

/// Counters accumulated over one walk of the page.
///
/// Owned by the caller and passed into the walk so partial numbers survive an
/// interrupt or a failed fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Episodes discovered in the page, downloaded or not
    pub total_episodes: u64,

    /// Files actually fetched this run
    pub total_downloads: u64,

    /// Bytes written, in decimal megabytes
    pub total_size_mb: f64,

    /// Wall-clock seconds spent walking seasons
    pub total_time_sec: f64,
}

impl Stats {
    /// Record one completed download of `bytes` bytes
    pub fn record_download(&mut self, bytes: u64) {
        self.total_downloads += 1;
        self.total_size_mb += bytes as f64 / 1_000_000.0;
    }

    /// Average transfer speed in MB/sec, or `None` when no time has elapsed
    pub fn average_speed(&self) -> Option<f64> {
        if self.total_time_sec > 0.0 {
            Some(self.total_size_mb / self.total_time_sec)
        } else {
            None
        }
    }

    /// One-line run summary for the console
    pub fn summary(&self) -> String {
        let speed = match self.average_speed() {
            Some(speed) => format!("{:.1}MB/sec", speed),
            None => "n/a".to_string(),
        };
        format!(
            "Downloaded {} of {} episodes in {:.1}sec. Total size {:.1}MB, average speed {}",
            self.total_downloads, self.total_episodes, self.total_time_sec, self.total_size_mb, speed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_download() {
        let mut stats = Stats::default();
        stats.record_download(2_000_000);
        stats.record_download(500_000);

        assert_eq!(stats.total_downloads, 2);
        assert!((stats.total_size_mb - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_speed_guards_zero_time() {
        let mut stats = Stats::default();
        stats.record_download(1_000_000);
        assert_eq!(stats.average_speed(), None);

        stats.total_time_sec = 2.0;
        assert_eq!(stats.average_speed(), Some(0.5));
    }

    #[test]
    fn test_summary_with_no_downloads() {
        let stats = Stats::default();
        let summary = stats.summary();
        assert!(summary.contains("0 of 0 episodes"));
        assert!(summary.contains("average speed n/a"));
    }
}
