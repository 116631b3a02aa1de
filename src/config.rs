use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default config file looked up in the working directory
const CONFIG_FILE: &str = "episode-dl.toml";

/// Configuration for the episode downloader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Download settings
    pub download: DownloadConfig,

    /// Output and storage settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// User agent sent with download requests
    pub user_agent: String,

    /// Media extension expected on source URLs; anything else logs a warning
    pub expected_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the per-season directories are created under
    pub base_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download: DownloadConfig {
                user_agent: format!("episode-dl/{}", env!("CARGO_PKG_VERSION")),
                expected_extension: "mp4".to_string(),
            },
            output: OutputConfig {
                base_dir: PathBuf::from("."),
            },
        }
    }
}

impl Config {
    /// Load configuration from `episode-dl.toml` if present, falling back to
    /// defaults, with environment variable overrides applied last.
    pub fn load() -> Result<Self> {
        let mut config = if std::path::Path::new(CONFIG_FILE).exists() {
            let contents = std::fs::read_to_string(CONFIG_FILE)?;
            Self::from_toml(&contents)?
        } else {
            Self::default()
        };

        if let Ok(user_agent) = std::env::var("EPISODE_DL_USER_AGENT") {
            config.download.user_agent = user_agent;
        }

        if let Ok(output_dir) = std::env::var("EPISODE_DL_OUTPUT_DIR") {
            config.output.base_dir = PathBuf::from(output_dir);
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.download.expected_extension.is_empty() {
            return Err(anyhow!("expected_extension must not be empty"));
        }

        if self.download.user_agent.is_empty() {
            return Err(anyhow!("user_agent must not be empty"));
        }

        Ok(())
    }
}
