// crates/server/src/main.rs
//! Provider-pulse server binary.

use std::net::SocketAddr;

use anyhow::Result;
use provider_pulse_server::{create_app, AppState, Settings};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("provider_pulse_server=info,tower_http=warn")),
        )
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = Settings::from_env();
    let port = settings.port;
    let demo_mode = settings.demo_mode;
    let state = AppState::new(settings);
    let app = create_app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    eprintln!("\n\u{1f3e5} provider-pulse v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("  \u{2192} http://localhost:{port}\n");
    tracing::info!(port, demo_mode, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
