//! Process configuration, fixed at startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::format::PromptField;

pub const DEFAULT_BACKEND: &str = "http://localhost:11434";
pub const DEFAULT_PORT: u16 = 3131;

pub const ENV_BACKEND: &str = "PROXY_BACKEND";
pub const ENV_PORT: &str = "PROXY_PORT";
pub const ENV_VERBOSE: &str = "PROXY_VERBOSE";
pub const ENV_PROMPT_FIELD: &str = "PROXY_PROMPT_FIELD";

/// Immutable settings shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL every request is forwarded to (e.g. "http://localhost:11434")
    pub backend: String,
    pub port: u16,
    pub verbose: bool,
    /// Bind 127.0.0.1 instead of 0.0.0.0
    pub local_only: bool,
    pub prompt_field: PromptField,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            port: DEFAULT_PORT,
            verbose: false,
            local_only: false,
            prompt_field: PromptField::Auto,
        }
    }
}

impl Config {
    /// Merges command-line flags over environment values over defaults.
    ///
    /// `env` is a lookup function so callers (and tests) decide where the
    /// environment comes from; `main` passes `std::env::var(..).ok()`.
    pub fn resolve<F>(cli: Cli, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = cli
            .backend
            .or_else(|| env(ENV_BACKEND))
            .unwrap_or_else(|| DEFAULT_BACKEND.to_string());

        let port = match cli.port {
            Some(port) => port,
            None => match env(ENV_PORT) {
                Some(raw) => raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidEnv {
                        name: ENV_PORT,
                        value: raw.clone(),
                        reason: e.to_string(),
                    }
                })?,
                None => DEFAULT_PORT,
            },
        };

        let verbose = cli.verbose || env(ENV_VERBOSE).is_some_and(|v| is_truthy(&v));

        let prompt_field = match cli.prompt_field {
            Some(field) => field,
            None => match env(ENV_PROMPT_FIELD) {
                Some(raw) => raw.parse().map_err(|reason| ConfigError::InvalidEnv {
                    name: ENV_PROMPT_FIELD,
                    value: raw.clone(),
                    reason,
                })?,
                None => PromptField::Auto,
            },
        };

        Ok(Self {
            backend,
            port,
            verbose,
            local_only: cli.local_only,
            prompt_field,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        let ip = if self.local_only {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        };
        SocketAddr::new(ip, self.port)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
