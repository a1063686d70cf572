//! dmarc-relay - DMARC aggregate report relay
//!
//! Reads a raw RFC 5322 message, extracts the DMARC aggregate report from its
//! first attachment, and forwards one event per record row to a Splunk HTTP
//! Event Collector. The surrounding mail system decides when to invoke this;
//! each invocation handles exactly one message.

use anyhow::{Context, Result};
use clap::Parser;
use dmarc_relay::{handle_message, Config, HecForwarder};
use std::io::Read;
use std::path::PathBuf;

/// CLI arguments for dmarc-relay.
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Relay DMARC aggregate report emails to a Splunk HTTP Event Collector",
    long_about = "dmarc-relay reads a raw RFC 5322 message, decodes the DMARC aggregate \
                  report in its first attachment (xml, gzip or zip), and posts one event \
                  per record row to the collector configured via HEC_URL and HEC_TOKEN."
)]
struct Cli {
    /// Path to the raw message, or '-' to read it from stdin
    #[arg(value_parser)]
    message: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let raw = if cli.message.to_str() == Some("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read message from stdin")?;
        buf
    } else {
        std::fs::read(&cli.message)
            .with_context(|| format!("failed to read message from {}", cli.message.display()))?
    };

    let forwarder = HecForwarder::from_config(&config).context("failed to create forwarder")?;
    let forwarded = handle_message(&raw, &config, &forwarder)
        .await
        .context("failed to process message")?;

    log::info!("forwarded {} events", forwarded);
    Ok(())
}
