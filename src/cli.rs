use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use regex::Regex;

use crate::client::HelpdeskClient;
use crate::config::AppConfig;
use crate::load_config::load_config;
use crate::sync::Synchroniser;

/// CLI for helpdesk-sync: mirror local HTML documentation into a helpdesk
/// knowledge base.
#[derive(Parser)]
#[clap(
    name = "helpdesk-sync",
    version,
    about = "Upload a tree of HTML documentation into a helpdesk category, section per directory, article per file"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synchronise the local HTML tree into the target category
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Publish every draft translation of a section's articles
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Exact name of the section to publish
        #[clap(long)]
        section: String,
        /// Id of the section's parent section, when it is not top-level
        #[clap(long)]
        parent: Option<i64>,
    },
}

fn build_engine(config: &AppConfig) -> Result<Synchroniser<HelpdeskClient>> {
    let pattern = config
        .api
        .section_pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid section_pattern in config")?;
    Ok(Synchroniser::new(HelpdeskClient::new(&config.api), pattern))
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config } => {
            let config = load_config(config)?;
            let engine = build_engine(&config)?;
            println!("Synchronise starting...");
            match engine.sync_tree(&config.source_dir).await {
                Ok(report) => {
                    println!("Synchronise complete.\nReport:");
                    println!("{:#?}", report);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Synchronisation failed: {e}");
                    Err(e.into())
                }
            }
        }
        Commands::Publish {
            config,
            section,
            parent,
        } => {
            let config = load_config(config)?;
            let engine = build_engine(&config)?;
            println!("Publishing section '{section}'...");
            let result = match engine.find_section(&section, parent).await {
                Ok(found) => engine.publish_section(&found).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => {
                    println!("Section '{section}' published.");
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Publish failed: {e}");
                    Err(e.into())
                }
            }
        }
    }
}
