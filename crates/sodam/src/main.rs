//! sodam: a dictionary and translation chat bot driven by a non-blocking
//! request relay.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sodam_relay::ReqwestTransport;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::bot::Bot;
use crate::config::Config;
use crate::gateway::ConsoleResponder;

mod bot;
mod commands;
mod config;
mod console;
mod gateway;
#[cfg(test)]
mod testing;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "sodam.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    info!(config = %cli.config.display(), "starting sodam");

    let transport = ReqwestTransport::new()?;
    let bot = Bot::new(config, transport, Arc::new(ConsoleResponder));

    let mut console = console::spawn_reader();
    bot.run(&mut console).await;

    Ok(())
}
