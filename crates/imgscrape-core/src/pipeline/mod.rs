//! End-to-end download flow: page → image references → bounded concurrent saves.
//!
//! By default a failed image is reported and skipped (best-effort). With
//! `fail_fast`, the first failure stops new downloads and the run fails with
//! every collected error.

mod error;
mod task;

pub use error::PipelineError;
pub use task::{display_src, load_resource, save_image, TaskContext};

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::{HttpConfig, ScrapeConfig};
use crate::extract;
use crate::fetch;
use crate::scheduler::{self, ScheduleError, TaskFailure};

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Page to scrape.
    pub url: String,
    /// Destination folder (created if missing).
    pub folder: PathBuf,
    /// Images downloaded at once; must be >= 1.
    pub concurrency: usize,
    pub fail_fast: bool,
    pub overwrite: bool,
    /// Suppress `> ...` progress lines on stdout.
    pub quiet: bool,
    pub http: HttpConfig,
}

impl PipelineOptions {
    /// Options with every knob taken from `cfg`.
    pub fn from_config(url: impl Into<String>, folder: impl Into<PathBuf>, cfg: &ScrapeConfig) -> Self {
        Self {
            url: url.into(),
            folder: folder.into(),
            concurrency: cfg.concurrency,
            fail_fast: cfg.fail_fast,
            overwrite: cfg.overwrite,
            quiet: false,
            http: cfg.http.clone(),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub url: String,
    /// Images found in the page.
    pub total: usize,
    /// Written files, in page order.
    pub saved: Vec<PathBuf>,
    /// Images that could not be saved.
    pub failed: usize,
}

/// Prints `> ...` progress lines unless quiet.
#[derive(Debug, Clone, Copy)]
struct Progress {
    quiet: bool,
}

impl Progress {
    fn say(&self, msg: &str) {
        if !self.quiet {
            println!("> {msg}");
        }
    }

    fn warn(&self, msg: &str) {
        if !self.quiet {
            eprintln!("> {msg}");
        }
    }
}

/// Downloads the page at `opts.url` and saves every image it references.
pub async fn run(opts: &PipelineOptions) -> Result<DownloadReport> {
    if opts.concurrency < 1 {
        anyhow::bail!("concurrency must be at least 1");
    }
    let progress = Progress { quiet: opts.quiet };

    progress.say("downloading html...");
    let html = fetch::fetch_page(&opts.url, &opts.http)
        .await
        .with_context(|| format!("download page {}", opts.url))?;
    progress.say(&format!("downloaded html, length = {}", html.len()));
    tracing::info!(url = %opts.url, bytes = html.len(), "page downloaded");

    let images = extract::extract_images(&opts.url, &html);
    progress.say(&format!("extracted {} images from html", images.len()));
    tracing::info!(count = images.len(), "images extracted");

    let report = download_all(opts, images, progress).await?;
    progress.say("done");
    tracing::info!(
        saved = report.saved.len(),
        failed = report.failed,
        "run complete"
    );
    Ok(report)
}

async fn download_all(
    opts: &PipelineOptions,
    images: Vec<extract::ImageRef>,
    progress: Progress,
) -> Result<DownloadReport> {
    progress.say("downloading images...");

    let total = images.len();
    let started = Arc::new(AtomicUsize::new(0));
    let ctx = Arc::new(TaskContext {
        folder: opts.folder.clone(),
        overwrite: opts.overwrite,
        http: opts.http.clone(),
    });
    let fail_fast = opts.fail_fast;

    let outcome = scheduler::run_bounded(opts.concurrency, images, move |image| {
        let ctx = Arc::clone(&ctx);
        let n = started.fetch_add(1, Ordering::Relaxed) + 1;
        async move {
            let tag = format!("({}/{})", n, total);
            let shown = display_src(&image.src);
            progress.say(&format!("{tag} downloading {shown}"));
            match save_image(&image, &ctx).await {
                Ok(path) => {
                    tracing::debug!(src = %shown, path = %path.display(), "image saved");
                    Ok(Some(path))
                }
                Err(e) if !fail_fast => {
                    let err = anyhow::Error::new(e);
                    progress.warn(&format!("{tag} failed to process {shown}: {err:#}"));
                    tracing::warn!(src = %shown, "image failed: {:#}", err);
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        }
    })
    .await;

    match outcome {
        Ok(paths) => {
            let saved: Vec<PathBuf> = paths.into_iter().flatten().collect();
            Ok(DownloadReport {
                url: opts.url.clone(),
                total,
                failed: total - saved.len(),
                saved,
            })
        }
        Err(ScheduleError::Aggregated(agg)) => {
            let summary = agg.to_string();
            let mut first: Option<anyhow::Error> = None;
            for task_err in agg.into_errors() {
                let index = task_err.index;
                let err = match task_err.failure {
                    TaskFailure::Failed(e) => anyhow::Error::new(e),
                    TaskFailure::Panicked(msg) => anyhow::anyhow!("task panicked: {msg}"),
                };
                progress.warn(&format!("image {} failed: {err:#}", index + 1));
                tracing::error!(index, "image failed: {:#}", err);
                first.get_or_insert(err);
            }
            let cause = first.unwrap_or_else(|| anyhow::anyhow!("no failure recorded"));
            Err(cause.context(abort_message(opts.fail_fast, &summary)))
        }
        Err(e @ ScheduleError::InvalidArgument { .. }) => Err(e.into()),
    }
}

/// Top-level message for a run that ended with collected task failures.
/// Without fail-fast only a crashed (panicked) task gets here.
fn abort_message(fail_fast: bool, summary: &str) -> String {
    if fail_fast {
        format!("image downloads aborted (fail-fast): {summary}")
    } else {
        format!("image download task crashed: {summary}")
    }
}
