//! A transparent reverse proxy that shows what is being asked of a local
//! model server.
//!
//! Features:
//! - Forwards every request to one backend, rewriting only scheme and host
//! - Prints each prompt (compact) or the full request (verbose)
//! - Logs the backend status with end-to-end latency

use std::{net::SocketAddr, sync::Arc};

use prompt_tap::{
    cli::Cli,
    colors,
    config::Config,
    error::Result,
    format::banner_lines,
    net::{listen_urls, private_ipv4},
    proxy::ReverseProxy,
    state::AppState,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let ansi = colors::enabled_for_stdout();
    colors::set_enabled(ansi);
    tracing_subscriber::fmt()
        .with_ansi(ansi)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Cli = argh::from_env();
    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> Result<()> {
    let config = Config::resolve(args, |key| std::env::var(key).ok())?;
    let proxy = ReverseProxy::new(&config.backend)?;
    let state = Arc::new(AppState::new(proxy, &config));
    let app = prompt_tap::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;

    let private_ip = if config.local_only { None } else { private_ipv4() };
    for line in banner_lines(&listen_urls(config.port, private_ip), &config.backend) {
        info!("{}", line);
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
