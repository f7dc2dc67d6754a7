//! The `check` command: report missing Alma API settings.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::AdminConfig;

/// Arguments for `leganto check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Also print the sanitised configuration values.
    #[arg(long)]
    pub verbose: bool,
}

pub fn execute(config: &AdminConfig, args: &CheckArgs) -> Result<()> {
    let missing = config.missing_settings();

    if missing.is_empty() {
        println!("{} Alma API is fully configured", "✓".green().bold());
    } else {
        for setting in &missing {
            println!("{} setting '{}' is not configured", "✗".red().bold(), setting.yellow());
        }
        println!("{}", "The Alma API is not fully configured; reading lists cannot be retrieved.".red());
    }

    if args.verbose {
        println!();
        println!("api_url: {}", config.api_url);
        println!("code_source: {:?}", config.code_source);
        println!("include_child_codes: {}", config.include_child_codes);
    }

    Ok(())
}
