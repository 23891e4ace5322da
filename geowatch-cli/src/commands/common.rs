//! Common configuration resolution shared across CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::warn;

use geowatch::config::ConfigFile;
use geowatch::provider::{
    GnssUdpProvider, NetworkLookupProvider, PositionProvider, ReqwestClient,
};

use crate::error::CliError;

/// Overrides every command accepts on top of the config file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigOverrides {
    /// Path to the config file (default: <config dir>/geowatch/config.ini)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// UDP port of the GNSS receiver feed
    #[arg(long, value_name = "PORT")]
    pub gnss_port: Option<u16>,

    /// Geolocation lookup endpoint for the fallback provider
    #[arg(long, value_name = "URL")]
    pub lookup_url: Option<String>,

    /// API key for the lookup endpoint
    #[arg(long, value_name = "KEY")]
    pub lookup_api_key: Option<String>,
}

/// Where the config file is looked for: CLI flag, then the platform
/// config directory.
pub fn resolve_config_path(flag: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match flag {
        Some(path) => Ok(path),
        None => ConfigFile::default_path().ok_or_else(|| {
            CliError::Config("Could not determine a config directory; use --config".to_string())
        }),
    }
}

/// Load the config file and fold the CLI overrides in. CLI > file > default.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<(PathBuf, ConfigFile), CliError> {
    let path = resolve_config_path(overrides.config.clone())?;
    let mut config = ConfigFile::load(&path)?;

    if let Some(port) = overrides.gnss_port {
        config.providers.gnss_port = port;
    }
    if let Some(ref url) = overrides.lookup_url {
        config.providers.lookup_url = Some(url.clone());
    }
    if let Some(ref key) = overrides.lookup_api_key {
        config.providers.lookup_api_key = Some(key.clone());
    }

    Ok((path, config))
}

/// Build the provider set the resolved configuration asks for.
pub fn build_providers(
    config: &ConfigFile,
    runtime: Handle,
) -> Result<Vec<Arc<dyn PositionProvider>>, CliError> {
    let mut providers: Vec<Arc<dyn PositionProvider>> = Vec::new();

    providers.push(Arc::new(GnssUdpProvider::new(
        config.providers.gnss_port,
        runtime,
    )));

    match &config.providers.lookup_url {
        Some(url) => {
            let client = ReqwestClient::new()?;
            let mut provider = NetworkLookupProvider::new(client, url.clone());
            if let Some(key) = &config.providers.lookup_api_key {
                provider = provider.with_api_key(key.clone());
            }
            providers.push(Arc::new(provider));
        }
        None => {
            warn!("No lookup_url configured; running without the fallback provider");
        }
    }

    Ok(providers)
}
