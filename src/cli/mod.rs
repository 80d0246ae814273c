//! Command-line interface for the rulebridge binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::adapters::http::HttpEntityClient;
use crate::adapters::mcp::StdioServer;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::services::EntityCoordinator;

/// MCP bridge exposing rule-sharing platform projects and rules to AI agents.
#[derive(Debug, Parser)]
#[command(name = "rulebridge", version, about)]
pub struct Cli {
    /// Path to an explicit configuration file. Defaults to rulebridge.yaml
    /// in the working directory plus RULEBRIDGE_* environment variables.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the MCP stdio server.
    Serve,
    /// Load, validate, and print the effective configuration.
    ConfigCheck,
}

/// Load configuration for the given CLI invocation.
pub fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Run the MCP stdio server with the given configuration.
pub async fn serve(config: Config) -> Result<()> {
    let client = HttpEntityClient::with_timeout(
        &config.api.base_url,
        &config.api.api_key,
        std::time::Duration::from_secs(config.api.timeout_secs),
    )?;
    let coordinator = Arc::new(EntityCoordinator::new(Arc::new(client)));
    StdioServer::new(coordinator).run().await
}

/// Print the effective configuration with the credential masked.
pub fn config_check(config: &Config) -> Result<()> {
    let mut masked = config.clone();
    if !masked.api.api_key.is_empty() {
        masked.api.api_key = "********".to_string();
    }
    println!("{}", serde_yaml::to_string(&masked)?);
    Ok(())
}
