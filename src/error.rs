//! Startup and runtime error types.

use thiserror::Error;

/// Configuration problems detected before the proxy starts listening.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend URL {url:?}: {source}")]
    InvalidBackendUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported backend scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),

    #[error("backend URL {0:?} has no host")]
    MissingHost(String),

    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors that end the process.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
