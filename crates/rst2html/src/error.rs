//! CLI error types.

use rst_config::ConfigError;
use rst_renderer::ConvertError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Convert(#[from] ConvertError),
}
