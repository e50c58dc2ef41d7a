use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Browser-like User-Agent sent with every request so sites don't reject the scraper.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

/// HTTP request parameters shared by the page fetch and image downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header value.
    pub user_agent: String,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum redirects followed per request.
    pub max_redirections: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: 30,
            timeout_secs: 300,
            max_redirections: 10,
        }
    }
}

/// Global configuration loaded from `~/.config/imgscrape/config.toml`.
/// CLI flags override these values per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Number of images downloaded concurrently (must be >= 1).
    pub concurrency: usize,
    /// Abort the run (stop starting downloads) on the first failed image
    /// instead of skipping it.
    #[serde(default)]
    pub fail_fast: bool,
    /// Replace existing files instead of choosing a `-N` suffixed name.
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            fail_fast: false,
            overwrite: false,
            http: HttpConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgscrape")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ScrapeConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Like [`load_or_init`] but at an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<ScrapeConfig> {
    if !path.exists() {
        let default_cfg = ScrapeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ScrapeConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    if cfg.concurrency < 1 {
        anyhow::bail!("{}: concurrency must be at least 1", path.display());
    }
    Ok(cfg)
}
