//! CLI for imgscrape.

mod download;

use anyhow::Result;
use clap::Parser;
use imgscrape_core::config::{self, ScrapeConfig};
use imgscrape_core::pipeline::PipelineOptions;

use download::run_download;

/// Download every image referenced by a web page into a local folder.
#[derive(Debug, Parser)]
#[command(name = "imgscrape")]
#[command(about = "Download the images of a web page into a folder", long_about = None)]
pub struct Cli {
    /// URL of the page to scrape.
    pub url: String,

    /// Local folder to save images into (created if missing).
    pub folder: String,

    /// Number of images downloaded concurrently (default from config, 1 if unset).
    #[arg(short, long, value_name = "N", allow_negative_numbers = true, value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Stop starting new downloads after the first failed image and exit with an error.
    #[arg(long, overrides_with = "no_fail_fast")]
    pub fail_fast: bool,

    /// Skip failed images even if the config enables fail-fast.
    #[arg(long, overrides_with = "fail_fast")]
    pub no_fail_fast: bool,

    /// Replace existing files instead of saving as `name-1.ext`, `name-2.ext`, ...
    #[arg(long, overrides_with = "no_overwrite")]
    pub overwrite: bool,

    /// Keep existing files even if the config enables overwrite.
    #[arg(long, overrides_with = "overwrite")]
    pub no_overwrite: bool,

    /// Override the User-Agent header.
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Print the result as JSON (suppresses progress lines).
    #[arg(long)]
    pub json: bool,

    /// Trace-level logging for per-task scheduling events.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Accepts integers >= 1; rejects zero and negatives before anything runs.
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let n: i64 = s
        .trim()
        .parse()
        .map_err(|_| format!("`{s}` is not an integer"))?;
    if n < 1 {
        return Err("concurrency must be greater than 0".to_string());
    }
    usize::try_from(n).map_err(|_| format!("`{s}` is too large"))
}

/// `--x` / `--no-x` pair: the last one given wins, otherwise the config value.
fn flag_or(on: bool, off: bool, configured: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => configured,
    }
}

impl Cli {
    /// Pipeline options: config file values overridden by flags.
    pub fn options(&self, cfg: &ScrapeConfig) -> PipelineOptions {
        let mut opts = PipelineOptions::from_config(self.url.clone(), &self.folder, cfg);
        if let Some(n) = self.concurrency {
            opts.concurrency = n;
        }
        opts.fail_fast = flag_or(self.fail_fast, self.no_fail_fast, opts.fail_fast);
        opts.overwrite = flag_or(self.overwrite, self.no_overwrite, opts.overwrite);
        if let Some(ua) = &self.user_agent {
            opts.http.user_agent = ua.clone();
        }
        opts.quiet = self.json;
        opts
    }

    pub async fn run(self) -> Result<()> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let opts = self.options(&cfg);
        run_download(&opts, self.json).await
    }
}
