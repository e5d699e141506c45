//! CLI argument parsing and subcommand handlers.

use crate::{GatewayConfig, config::CONFIG_FILE};
use anyhow::Result;
use clap::{Parser, Subcommand};
use inference::Orchestrator;
use std::path::PathBuf;

/// Inference gateway for summarization, captioning and text-to-speech.
#[derive(Parser, Debug)]
#[command(name = "hfgate", version, about)]
pub struct Cli {
    /// Path to the gateway config file.
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Subcommand to execute. Defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API until ctrl-c.
    Serve {
        /// Bind address (host:port). Defaults to the `[server]` config.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Caption a local image file and print the caption.
    Caption {
        /// Image file.
        path: PathBuf,
    },
}

impl Cli {
    /// Run the selected subcommand.
    pub async fn run(self) -> Result<()> {
        let config = GatewayConfig::load_or_default(&self.config)?;
        match self.command.unwrap_or(Command::Serve { bind: None }) {
            Command::Serve { bind } => serve(&config, bind).await,
            Command::Caption { path } => caption(&config, path).await,
        }
    }
}

async fn serve(config: &GatewayConfig, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.bind_address());
    let handle = crate::serve(config, &bind).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("received ctrl-c, shutting down");
    handle.shutdown().await?;
    tracing::info!("gateway shut down");
    Ok(())
}

async fn caption(config: &GatewayConfig, path: PathBuf) -> Result<()> {
    let registry = provider::build_registry(&config.models).await?;
    let outcome = Orchestrator::new(registry).caption_path(&path).await?;
    println!("{}", outcome.caption);
    Ok(())
}
