//! Playbook catalog commands.

use super::load_config;
use clap::Args;
use console::style;
use playbooks_core::Playbook;
use playbooks_gateway::PlaybookCatalog;
use std::path::{Path, PathBuf};

/// Playbooks command arguments.
#[derive(Args)]
pub struct PlaybooksArgs {
    #[command(subcommand)]
    pub command: PlaybooksCommand,
}

#[derive(clap::Subcommand)]
pub enum PlaybooksCommand {
    /// List example playbooks by title
    List {
        /// Directory to scan instead of the configured one
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// Run the playbooks command.
pub async fn run(args: PlaybooksArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        PlaybooksCommand::List { dir } => {
            let catalog = match dir {
                Some(dir) => PlaybookCatalog::new(dir),
                None => PlaybookCatalog::from_config(&load_config(config_path)?)?,
            };

            let playbooks = catalog.list().await?;
            if playbooks.is_empty() {
                println!("No playbooks found in {}", catalog.dir().display());
                return Ok(());
            }

            println!("Playbooks in {}:\n", catalog.dir().display());
            for (title, source) in &playbooks {
                let sections = Playbook::parse(source)
                    .map(|p| p.sections().len())
                    .unwrap_or(0);
                println!("  {} ({} sections)", style(title).bold(), sections);
            }
        }
    }

    Ok(())
}
