//! Command-line interface configuration.

use argh::FromArgs;

use crate::format::PromptField;

/// A transparent reverse proxy that prints the prompts sent to a local model server
#[derive(Debug, Default, FromArgs)]
pub struct Cli {
    /// show full traffic: method, path, query, headers and body
    #[argh(switch, short = 'v')]
    pub verbose: bool,

    /// backend base URL (default: 'http://localhost:11434', env: PROXY_BACKEND)
    #[argh(option)]
    pub backend: Option<String>,

    /// listen port (default: 3131, env: PROXY_PORT)
    #[argh(option)]
    pub port: Option<u16>,

    /// bind to 127.0.0.1 only instead of all interfaces
    #[argh(switch, long = "local-only")]
    pub local_only: bool,

    /// body field shown in compact mode: auto, prompt or messages (env: PROXY_PROMPT_FIELD)
    #[argh(option, long = "prompt-field")]
    pub prompt_field: Option<PromptField>,
}
