//! Restyler Service - Main Entry Point
//!
//! Grammar correction and multi-style rewriting of long documents over HTTP.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use restyler::api::{self, AppState};
use restyler::types::ServiceConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; LOG_FORMAT=json switches to structured output
    let fmt_layer = match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt::layer().json().boxed(),
        _ => tracing_subscriber::fmt::layer().boxed(),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "restyler=info,tower_http=debug".into()),
        ))
        .with(fmt_layer)
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = ServiceConfig::load()?;

    info!("Starting Restyler Service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        chat_base_url = %config.backend.chat_base_url,
        output_dir = %config.output.dir.display(),
        "Loaded configuration"
    );

    let port = config.server.port;
    let retention = config.server.run_retention();
    let state = Arc::new(AppState::new(config));

    // Drop finished runs once they age out
    let runs = state.runs.clone();
    tokio::spawn(async move {
        let max_age = chrono::Duration::from_std(retention).unwrap_or_else(|_| chrono::Duration::hours(1));
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            ticker.tick().await;
            runs.write().await.cleanup_finished(max_age);
        }
    });

    let app = api::router(state)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
