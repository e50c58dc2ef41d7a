//! `imgscrape <url> <folder>` – scrape a page and save its images.

use anyhow::Result;
use imgscrape_core::pipeline::{self, DownloadReport, PipelineOptions};

pub async fn run_download(opts: &PipelineOptions, json: bool) -> Result<()> {
    tracing::info!(
        url = %opts.url,
        folder = %opts.folder.display(),
        concurrency = opts.concurrency,
        fail_fast = opts.fail_fast,
        "download started"
    );
    let report = pipeline::run(opts).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &DownloadReport) {
    println!("> saved images:");
    for path in &report.saved {
        println!("  {}", path.display());
    }
    if report.failed > 0 {
        println!(
            "> {} of {} images failed (see messages above)",
            report.failed, report.total
        );
    }
}
