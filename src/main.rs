//! fconf - configuration editor for Asterisk based radio boxes
//!
//! Reads the Asterisk configuration files of the box (GSM dongles first of
//! all), exposes them as JSON over HTTP and writes edits back.
//!
//! # Features
//! - Scanner and parser for Asterisk style `.conf` files
//! - JSON conversion in both directions
//! - Web server with a development mode working on a copy of sample files
//! - Structural checks of the web interface bundler configuration

use anyhow::Result;
use clap::Parser;
use fconf_lib::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging/tracing system
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("fconf=debug,fconf_lib=debug,tower_http=debug"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("fconf=info,fconf_lib=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    cli.execute().await
}
