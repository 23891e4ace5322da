//! CLI error type.

use thiserror::Error;

use geowatch::config::ConfigError;
use geowatch::provider::ProviderError;

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration problem (bad file, bad flag combination).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A provider could not be constructed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Failed to create the Tokio runtime.
    #[error("Failed to create runtime: {0}")]
    Runtime(String),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}
