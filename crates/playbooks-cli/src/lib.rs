//! Playbooks gateway command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Playbooks gateway - serve conversational playbooks over HTTP
#[derive(Parser)]
#[command(name = "playbooks")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "PLAYBOOKS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> String {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        format!("playbooks={level},tower_http={level}")
    }
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the gateway server
    Gateway(commands::gateway::GatewayArgs),

    /// Browse example playbooks
    Playbooks(commands::playbooks::PlaybooksArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Run diagnostics
    Doctor,

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Gateway(args) => commands::gateway::run(args, config_path).await,
        Commands::Playbooks(args) => commands::playbooks::run(args, config_path).await,
        Commands::Config(args) => commands::config::run(args, config_path).await,
        Commands::Doctor => commands::doctor::run(config_path).await,
        Commands::Version => {
            println!("playbooks {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_version() {
        let cli = Cli::try_parse_from(["playbooks", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_parse_gateway_run_overrides() {
        let cli = Cli::try_parse_from([
            "playbooks", "-v", "gateway", "run", "--bind", "lan", "--port", "9000", "--model", "gpt-4o-mini",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Gateway(args) => match args.command {
                commands::gateway::GatewayCommand::Run { bind, port, model, .. } => {
                    assert_eq!(bind.as_deref(), Some("lan"));
                    assert_eq!(port, Some(9000));
                    assert_eq!(model.as_deref(), Some("gpt-4o-mini"));
                }
            },
            _ => panic!("Expected Gateway command"),
        }
    }

    #[test]
    fn test_parse_config_init_force() {
        let cli = Cli::try_parse_from(["playbooks", "config", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Config(args) => {
                assert!(matches!(args.command, commands::config::ConfigCommand::Init { force: true }));
            }
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_parse_playbooks_list_dir() {
        let cli = Cli::try_parse_from(["playbooks", "playbooks", "list", "--dir", "/tmp/pb"]).unwrap();
        match cli.command {
            Commands::Playbooks(args) => match args.command {
                commands::playbooks::PlaybooksCommand::List { dir } => {
                    assert_eq!(dir, Some(PathBuf::from("/tmp/pb")));
                }
            },
            _ => panic!("Expected Playbooks command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["playbooks", "doctor", "--config", "/etc/pb.json5"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/pb.json5")));
    }

    #[test]
    fn test_log_filter_verbosity() {
        let cli = Cli::try_parse_from(["playbooks", "-vv", "version"]).unwrap();
        assert_eq!(cli.log_filter(), "playbooks=trace,tower_http=trace");
    }
}
