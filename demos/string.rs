//! Fetches one URL and prints the body as text.

use anyhow::Result;
use clap::Parser;
use httpfetch::Client;

#[derive(Debug, Parser)]
#[command(about = "Fetch a URL and print its body as text")]
struct Args {
    /// URL to fetch.
    #[arg(default_value = "http://www.example.com")]
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let content = Client::new().string(&args.url).await?;
    println!("{content}");
    Ok(())
}
