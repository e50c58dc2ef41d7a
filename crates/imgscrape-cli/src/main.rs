use clap::Parser;
use imgscrape_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible (file, or stderr fallback).
    logging::init(cli.verbose);

    if let Err(err) = cli.run().await {
        eprintln!("imgscrape error: {:#}", err);
        std::process::exit(1);
    }
}
