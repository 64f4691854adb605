//! Parking Analytics Service - Binary Entry Point

use std::sync::Arc;

use parking_analytics::api::http::create_router;
use parking_analytics::api::AppState;
use parking_analytics::event_store::{EventStore, EventStoreConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);

    let store = Arc::new(EventStore::open(EventStoreConfig::new(&data_dir))?);
    println!(
        "Loaded {} events from {}/events.jsonl",
        store.len(),
        data_dir
    );

    let state = Arc::new(AppState::new(store));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    println!(
        "{} v{} listening on http://0.0.0.0:{}",
        parking_analytics::NAME,
        parking_analytics::VERSION,
        port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolve when Ctrl+C / SIGTERM arrives
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("Failed to listen for shutdown signal: {}", e);
    }
    println!("Shutting down");
}
