//! Fetches one URL and prints the raw body.

use anyhow::Result;
use clap::Parser;
use httpfetch::Client;
use tracing::info;

#[derive(Debug, Parser)]
#[command(about = "Fetch a URL and print its body as bytes")]
struct Args {
    /// URL to fetch.
    #[arg(default_value = "http://www.example.com")]
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let client = Client::new();
    let content = client.bytes(&args.url).await?;
    info!(url = %args.url, bytes = content.len(), "fetched");
    println!("{content:?}");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
