//! Backrooms chat
//!
//! An HTTP service where a small cast of LLM-voiced entities take turns in
//! a shared conversation that clients poll.

mod api;
mod cast;
mod config;
mod conversation;
mod db;
mod llm;
mod prompt;
mod runtime;

use api::{create_router, AppState};
use config::Config;
use conversation::ConversationStore;
use db::Database;
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
                .unwrap_or_else(|_| "backrooms_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env();

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    // A turn that was in flight when the last process died will never finish
    let cleared = db.clear_generating()?;
    if cleared > 0 {
        tracing::warn!(count = cleared, "Cleared stale generating flags");
    }

    let llm = llm::create_service(&config.llm);
    if llm.is_none() {
        tracing::warn!("No LLM API key configured. Set ANTHROPIC_API_KEY or LLM_GATEWAY.");
    }

    let state = AppState::new(Arc::new(db), llm);
    match state.backrooms.existing()? {
        Some(conversation) => tracing::info!(
            messages = conversation.messages.len(),
            message_count = conversation.message_count,
            next_speaker = %conversation.current_speaker,
            "Resuming conversation"
        ),
        None => tracing::info!("No stored conversation yet"),
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Backrooms chat listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
