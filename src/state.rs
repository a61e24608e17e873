//! Shared application state.

use crate::{config::Config, format::PromptField, proxy::ReverseProxy};

/// Read-only state shared by the middleware and the proxy handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Forwarding target and its HTTP client
    pub proxy: ReverseProxy,
    /// Print the full request instead of just the prompt
    pub verbose: bool,
    /// Body field compact mode shows
    pub prompt_field: PromptField,
}

impl AppState {
    pub fn new(proxy: ReverseProxy, config: &Config) -> Self {
        Self {
            proxy,
            verbose: config.verbose,
            prompt_field: config.prompt_field,
        }
    }
}
