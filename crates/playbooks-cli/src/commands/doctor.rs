//! Diagnostic command.

use console::{style, Emoji};
use playbooks_core::config::{Config, RuntimeProvider};
use playbooks_core::error::ConfigError;
use playbooks_core::{env, paths};
use playbooks_gateway::PlaybookCatalog;
use std::path::Path;

static CHECK: Emoji = Emoji("✓", "+");
static CROSS: Emoji = Emoji("✗", "x");
static WARN: Emoji = Emoji("⚠", "!");

/// Run the doctor command.
pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("Playbooks Gateway Doctor\n");

    let mut errors = 0;
    let mut warnings = 0;

    println!("Checking configuration...");

    let loaded = match config_path {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    };
    let config = match loaded {
        Ok(config) => {
            println!("  {} Configuration loaded", style(CHECK).green());
            config
        }
        Err(ConfigError::NotFound(path)) => {
            println!("  {} No configuration file at {}", style(WARN).yellow(), path.display());
            println!("    Run 'playbooks config init' to create one");
            warnings += 1;
            Config::from_env_defaults()
        }
        Err(e) => {
            println!("  {} Configuration error: {}", style(CROSS).red(), e);
            anyhow::bail!("Cannot continue without a readable configuration");
        }
    };

    match config.validate() {
        Ok(()) => println!("  {} Configuration valid", style(CHECK).green()),
        Err(e) => {
            println!("  {} Configuration invalid: {}", style(CROSS).red(), e);
            errors += 1;
        }
    }

    println!("\nChecking runtime...");

    match config.runtime.provider {
        RuntimeProvider::None => {
            println!("  {} Live runtime disabled; sessions use the stand-in", style(WARN).yellow());
            warnings += 1;
        }
        RuntimeProvider::Openai if env::has_credentials(&config.runtime.api_key_env) => {
            println!("  {} {} is set", style(CHECK).green(), config.runtime.api_key_env);
        }
        RuntimeProvider::Openai => {
            println!(
                "  {} {} not set; sessions will use the stand-in",
                style(WARN).yellow(),
                config.runtime.api_key_env
            );
            warnings += 1;
        }
    }

    println!("\nChecking directories...");

    match config.sessions_dir() {
        Ok(dir) if dir.exists() => {
            println!("  {} Sessions directory: {}", style(CHECK).green(), dir.display())
        }
        Ok(dir) => {
            println!("  {} Sessions directory will be created: {}", style(WARN).yellow(), dir.display());
            warnings += 1;
        }
        Err(e) => {
            println!("  {} Sessions directory: {}", style(CROSS).red(), e);
            errors += 1;
        }
    }

    match PlaybookCatalog::from_config(&config) {
        Ok(catalog) => match catalog.list().await {
            Ok(playbooks) => println!(
                "  {} {} playbooks in {}",
                style(CHECK).green(),
                playbooks.len(),
                catalog.dir().display()
            ),
            Err(e) => {
                println!("  {} Playbooks directory: {}", style(CROSS).red(), e);
                errors += 1;
            }
        },
        Err(e) => {
            println!("  {} Playbooks directory: {}", style(CROSS).red(), e);
            errors += 1;
        }
    }

    if let Ok(base) = paths::base_dir() {
        println!("\nBase directory: {}", base.display());
    }

    println!();
    if errors > 0 {
        anyhow::bail!("{} errors, {} warnings", errors, warnings);
    }
    println!("{} warnings, no errors", warnings);
    Ok(())
}
