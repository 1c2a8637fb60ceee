//! CLI command implementations.

pub mod config;
pub mod doctor;
pub mod gateway;
pub mod playbooks;

use playbooks_core::Config;
use std::path::Path;

/// Load the configuration named on the command line, or the default one.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    Ok(Config::load_from(path)?)
}
