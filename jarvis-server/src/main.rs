//! JARVIS Server - Headless Daemon
//!
//! A pure Rust HTTP gateway that:
//! - Gates every request on an origin allow-list (CORS echo included)
//! - Serves the banner/health/debug/test diagnostic endpoints
//! - Forwards POST /api/query to a hosted inference API and normalizes
//!   the response envelope

use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};
use jarvis_core::{
    build_gateway_router, AppState, GatePolicy, GatewayConfig, UpstreamApi,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    match &cli.command {
        Some(Commands::Status { port }) => status(*port).await,
        Some(Commands::Serve { port }) => {
            let mut config = build_config(&cli);
            config.port = *port;
            serve(config, cli.listen_all).await
        }
        None => {
            let config = build_config(&cli);
            serve(config, cli.listen_all).await
        }
    }
}

fn build_config(cli: &Cli) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.port = cli.port;

    if !cli.allow_origin.is_empty() {
        config.allowed_origins = cli.allow_origin.clone();
    }

    config.gate_policy = match cli.gate_policy.as_str() {
        "strict" => GatePolicy::Strict,
        "permissive" => GatePolicy::Permissive,
        other => {
            warn!("Unknown gate policy '{}', using permissive", other);
            GatePolicy::Permissive
        }
    };

    config.upstream.api = match cli.upstream_api.as_str() {
        "text-generation" => UpstreamApi::TextGeneration,
        "chat-completions" => UpstreamApi::ChatCompletions,
        other => {
            warn!("Unknown upstream API '{}', using chat-completions", other);
            UpstreamApi::ChatCompletions
        }
    };
    if config.upstream.api == UpstreamApi::TextGeneration {
        // The legacy flavor's observed default cap.
        config.upstream.max_tokens = 150;
    }

    if let Some(url) = &cli.upstream_url {
        config.upstream.endpoint = url.clone();
    }
    if let Some(model) = &cli.model {
        config.upstream.model = model.clone();
    }

    config.with_env_token()
}

async fn serve(config: GatewayConfig, listen_all: bool) -> Result<()> {
    info!("🚀 JARVIS Gateway starting on port {}...", config.port);
    info!(
        "🔐 Gate policy: {:?}, {} allowed origin(s)",
        config.gate_policy,
        config.allowed_origins.len()
    );
    info!("🤖 Upstream model: {}", config.upstream.model);
    if config.api_token.is_none() {
        warn!("⚠️ HUGGINGFACE_TOKEN is not set — /api/query will report a configuration error");
    }

    let port = config.port;
    let state = AppState::new(config);
    let app = build_gateway_router(state);

    let host = if listen_all { [0, 0, 0, 0] } else { [127, 0, 0, 1] };
    let addr = SocketAddr::from((host, port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("🔌 Query endpoint at http://localhost:{}/api/query", port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /health on a local instance and print the body.
async fn status(port: u16) -> Result<()> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("jarvis-server/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let url = format!("http://127.0.0.1:{port}/health");
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Gateway not reachable on port {port}: {e}"))?;

    let status = response.status();
    let body: serde_json::Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        anyhow::bail!("Gateway responded with status {status}");
    }
    Ok(())
}
