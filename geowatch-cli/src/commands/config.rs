//! Configuration inspection CLI commands.

use clap::Subcommand;

use super::common::{resolve_config, resolve_config_path, ConfigOverrides};
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show {
        #[command(flatten)]
        overrides: ConfigOverrides,
    },

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show { overrides } => run_show(&overrides),
        ConfigCommands::Path => run_path(),
    }
}

/// Print every resolved setting, flags folded in.
fn run_show(overrides: &ConfigOverrides) -> Result<(), CliError> {
    let (path, config) = resolve_config(overrides)?;

    println!("# {}", path.display());
    println!("[tracking]");
    println!("min_interval_ms = {}", config.tracking.min_interval_ms);
    println!("min_distance_m = {}", config.tracking.min_distance_m);
    println!();
    println!("[providers]");
    println!("gnss_port = {}", config.providers.gnss_port);
    println!(
        "lookup_url = {}",
        config.providers.lookup_url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "lookup_api_key = {}",
        match config.providers.lookup_api_key {
            Some(_) => "(set)",
            None => "(not set)",
        }
    );
    println!();
    println!("[notification]");
    println!("title = {}", config.notification.title);

    Ok(())
}

/// Print the default config file location.
fn run_path() -> Result<(), CliError> {
    let path = resolve_config_path(None)?;
    println!("{}", path.display());
    Ok(())
}
