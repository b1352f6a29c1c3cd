//! Binary crate for the weather dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Serving the dashboard over HTTP

use clap::Parser;

mod cli;
mod error;
mod handlers;
mod page;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
