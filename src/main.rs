//! Repair Intake - messaging intake service for a console repair shop
//!
//! A Rust backend implementing a per-contact conversation state machine
//! that collects customer details into leads, plus reporting endpoints.

mod api;
mod config;
mod content;
mod dashboard;
mod db;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::AppConfig;
use content::Catalog;
use db::Database;
use state_machine::IntakeContext;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repair_intake=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env();

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    // Load menus
    let catalog = Catalog::load(config.content_path.as_deref())?;
    catalog.check_exit_keywords(&config.flow.exit_keywords)?;
    tracing::info!(
        models = catalog.device_models.len(),
        items = catalog.items.len(),
        source = ?config.content_path,
        "Catalog loaded"
    );

    if config.flow.max_items > catalog.items.len() {
        tracing::warn!(
            max_items = config.flow.max_items,
            available = catalog.items.len(),
            "Item bound exceeds catalog size"
        );
    }

    let context = IntakeContext::new(Arc::new(catalog), config.flow);
    let state = AppState::new(db, context);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Repair intake server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
