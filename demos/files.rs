//! Downloads several URLs concurrently into memory.

use std::num::NonZeroUsize;

use anyhow::{Context, Result};
use clap::Parser;
use httpfetch::{Client, FileRequest};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(about = "Download several URLs concurrently")]
struct Args {
    /// URLs to download.
    #[arg(default_values_t = [
        "http://www.golang.org".to_string(),
        "http://www.clojure.org".to_string(),
        "http://www.erlang.org".to_string(),
    ])]
    urls: Vec<String>,

    /// Maximum requests in flight (unbounded when omitted).
    #[arg(short = 'j', long)]
    jobs: Option<NonZeroUsize>,

    /// Increase verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let requests: Vec<FileRequest> = args
        .urls
        .iter()
        .enumerate()
        .map(|(i, url)| FileRequest::named(format!("file{i}"), url.as_str()))
        .collect();

    let client = Client::new();
    let files = match args.jobs {
        Some(limit) => client.download_all_limited(requests, limit).await,
        None => client.download_all(requests).await,
    }
    .context("batch download failed")?;

    for (file, url) in files.iter().zip(&args.urls) {
        info!(name = %file.name, url = %url, bytes = file.data.len(), "downloaded");
    }
    println!("Download files success!");
    Ok(())
}
