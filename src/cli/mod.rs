//! Command-line interface.
//!
//! A thin operator-facing consumer of the library: check the Alma API
//! configuration, search the reading lists for a course, and render a
//! stored selection as text. Each subcommand lives in its own module and
//! receives the loaded configuration.

mod check;
mod lists;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::api::ReqwestTransport;
use crate::cache::MemoryCache;
use crate::config::AdminConfig;
use crate::AlmaClient;

/// Leganto reading-list tools.
#[derive(Debug, Parser)]
#[command(name = "leganto", version, about = "Leganto reading list integration tools")]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, env = "LEGANTO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report whether the Alma API is fully configured.
    Check(check::CheckArgs),
    /// Search the reading lists associated with a course.
    Lists(lists::ListsArgs),
    /// Render a stored citation selection as text.
    Render(render::RenderArgs),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let path = self.config.unwrap_or_else(AdminConfig::default_path);
        let config = AdminConfig::load(&path)
            .with_context(|| format!("could not load configuration from {}", path.display()))?;

        match self.command {
            Commands::Check(args) => check::execute(&config, &args),
            Commands::Lists(args) => {
                let client = build_client(config)?;
                lists::execute(&client, &args).await
            }
            Commands::Render(args) => {
                let client = build_client(config)?;
                render::execute(&client, &args).await
            }
        }
    }
}

fn build_client(config: AdminConfig) -> Result<AlmaClient<ReqwestTransport, MemoryCache>> {
    let transport = ReqwestTransport::new().context("could not initialise the HTTP transport")?;
    Ok(AlmaClient::new(config, transport, MemoryCache::new()))
}
