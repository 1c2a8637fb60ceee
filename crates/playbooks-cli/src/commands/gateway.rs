//! Gateway command.

use super::load_config;
use clap::Args;
use playbooks_core::config::{BindMode, Config};
use playbooks_gateway::Gateway;
use std::path::{Path, PathBuf};
use tracing::info;

/// Gateway command arguments.
#[derive(Args)]
pub struct GatewayArgs {
    #[command(subcommand)]
    pub command: GatewayCommand,
}

#[derive(clap::Subcommand)]
pub enum GatewayCommand {
    /// Start the gateway server
    Run {
        /// Bind mode (loopback, lan)
        #[arg(short, long)]
        bind: Option<String>,

        /// Port number
        #[arg(short, long, env = "PLAYBOOKS_PORT")]
        port: Option<u16>,

        /// Chat model used by live runtimes
        #[arg(long, env = "PLAYBOOKS_MODEL")]
        model: Option<String>,

        /// Directory of example playbooks
        #[arg(long)]
        playbooks_dir: Option<PathBuf>,
    },
}

/// Run the gateway command.
pub async fn run(args: GatewayArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        GatewayCommand::Run {
            bind,
            port,
            model,
            playbooks_dir,
        } => {
            let mut config = load_config(config_path)?;
            apply_overrides(&mut config, bind.as_deref(), port, model, playbooks_dir)?;
            config.validate()?;

            info!(
                "Runtime: {:?} ({}), storage: {:?}",
                config.runtime.provider, config.runtime.model, config.session.storage
            );

            let gateway = Gateway::from_config(&config).await?;
            gateway.run().await?;
            Ok(())
        }
    }
}

fn apply_overrides(
    config: &mut Config,
    bind: Option<&str>,
    port: Option<u16>,
    model: Option<String>,
    playbooks_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.gateway.bind = match bind {
            "loopback" => BindMode::Loopback,
            "lan" => BindMode::Lan,
            other => anyhow::bail!("Invalid bind mode: {}. Valid options: loopback, lan", other),
        };
    }
    if let Some(port) = port {
        config.gateway.port = port;
    }
    if let Some(model) = model {
        config.runtime.model = model;
    }
    if let Some(dir) = playbooks_dir {
        config.playbooks.dir = Some(dir);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        apply_overrides(
            &mut config,
            Some("lan"),
            Some(9000),
            Some("gpt-4o-mini".to_string()),
            Some(PathBuf::from("/srv/playbooks")),
        )
        .unwrap();

        assert_eq!(config.gateway.bind, BindMode::Lan);
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.runtime.model, "gpt-4o-mini");
        assert_eq!(config.playbooks.dir, Some(PathBuf::from("/srv/playbooks")));
    }

    #[test]
    fn test_invalid_bind_mode() {
        let mut config = Config::default();
        assert!(apply_overrides(&mut config, Some("tailnet"), None, None, None).is_err());
    }
}
