//! Configuration management commands.

use super::load_config;
use clap::Args;
use playbooks_core::config::Config;
use playbooks_core::paths;
use std::path::{Path, PathBuf};

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key (dot-separated path)
        key: String,
    },

    /// Write a configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = load_config(config_path)?;
            println!("{}", config.to_json5()?);
        }

        ConfigCommand::Get { key } => {
            let config = load_config(config_path)?;
            match lookup(&config, &key)? {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => anyhow::bail!("Key not found: {}", key),
            }
        }

        ConfigCommand::Init { force } => {
            let path = target_path(config_path)?;
            init(&path, force)?;
            println!("Created config file: {}", path.display());
        }

        ConfigCommand::Path => {
            println!("{}", target_path(config_path)?.display());
        }

        ConfigCommand::Validate => {
            let config = load_config(config_path)?;
            config.validate()?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

fn target_path(config_path: Option<&Path>) -> anyhow::Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(paths::config_file()?),
    }
}

/// Write the environment-derived defaults to `path`.
fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }

    Config::from_env_defaults().save(path)?;
    Ok(())
}

/// Walk a dot-separated key through the serialized configuration.
fn lookup(config: &Config, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let json = serde_json::to_value(config)?;
    Ok(key
        .split('.')
        .try_fold(&json, |value, part| value.get(part))
        .cloned())
}
