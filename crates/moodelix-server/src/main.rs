use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use clap::Parser;
use moodelix_core::Config;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod routes;
mod state;

const DEFAULT_PORT: u16 = 3000;

#[derive(Parser, Debug)]
#[command(name = "moodelix-server", version)]
struct Args {
    /// Listen address, `ip:port` or a bare `ip` (port 3000).
    ///
    /// Overrides `server.listen` from the config file.
    #[arg(long)]
    listen: Option<String>,

    /// Config file (defaults to config.toml in the data directory).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "moodelix_server=info,moodelix_core=info,tower_http=info".into()
            }),
        )
        .init();

    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cfg.apply_env();

    let state = state::AppState::from_config(&cfg)?;

    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listen = args.listen.as_deref().unwrap_or(&cfg.server.listen);
    let addr = parse_listen(listen)?;
    info!("Moodelix listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn parse_listen(input: &str) -> anyhow::Result<SocketAddr> {
    if let Ok(addr) = input.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = input.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }
    if input == "localhost" {
        return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), DEFAULT_PORT));
    }
    if let Some(port) = input.strip_prefix("localhost:") {
        let port: u16 = port.parse().map_err(|_| {
            anyhow::anyhow!("invalid --listen '{input}': bad port. Example: 127.0.0.1:{DEFAULT_PORT}")
        })?;
        return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), port));
    }

    Err(anyhow::anyhow!(
        "invalid --listen '{input}'. Use ip:port (e.g. 127.0.0.1:{DEFAULT_PORT}) or ip (e.g. 127.0.0.1)."
    ))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}
