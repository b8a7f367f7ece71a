//! Concierge gateway: HTTP front end for the FAQ chat engine.

mod handlers;

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use concierge_core::{Concierge, CoreConfig, FallbackError, IntentEngine, KnowledgeBase, SessionStore};
use concierge_skills::ModelRouter;
use handlers::chat::{chat, end_session};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often idle conversations are swept.
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

fn bind_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], port))
}

/// Pre-flight check: config loads, knowledge base parses, port is available.
fn run_verify() -> Result<(), String> {
    print!("Checking configuration... ");
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;
    println!("OK ({})", config.app_name);

    print!("Checking knowledge base {}... ", config.knowledge_path);
    let kb = KnowledgeBase::load_json_path(&config.knowledge_path)
        .map_err(|e| format!("Knowledge base unreadable: {}", e))?;
    println!("OK ({} entries)", kb.total_entries());
    for status in kb.status().iter().filter(|s| s.entry_count == 0) {
        println!("  warning: category {} ({}) is empty", status.json_key, status.name);
    }

    let port = config.port;
    print!("Checking port {}... ", port);
    match std::net::TcpListener::bind(bind_addr(port)) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => {
            return Err(format!("Port {} BLOCKED: {}", port, e));
        }
    }

    println!("\nSUCCESS: ready to start gateway.");
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[concierge-gateway] .env not loaded: {} (using system environment)", e);
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Gateway stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Arc::new(CoreConfig::load()?);
    let knowledge = Arc::new(KnowledgeBase::load_json_path(&config.knowledge_path)?);
    let sessions = Arc::new(SessionStore::new());
    let concierge = build_concierge(&config, knowledge, Arc::clone(&sessions))?;

    tokio::spawn(eviction_loop(
        sessions,
        Duration::from_secs(config.session_ttl_secs),
        EVICTION_INTERVAL,
    ));

    let app = build_app(AppState {
        config: Arc::clone(&config),
        concierge: Arc::new(concierge),
    });

    let addr = bind_addr(config.port);
    tracing::info!("{} listening on {}", config.app_name, addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Engine with the configured thresholds, plus the model router unless its mode is off.
fn build_concierge(
    config: &CoreConfig,
    knowledge: Arc<KnowledgeBase>,
    sessions: Arc<SessionStore>,
) -> Result<Concierge, FallbackError> {
    let engine = IntentEngine::new(knowledge).with_thresholds(config.thresholds);
    let concierge = Concierge::new(engine, sessions);
    let router = ModelRouter::from_config(config)?;
    if !router.is_enabled() {
        tracing::info!(target: "concierge::fallback", "Fallback disabled; unmatched messages get the no-match answer");
        return Ok(concierge);
    }
    tracing::info!(
        target: "concierge::fallback",
        mode = router.mode().as_str(),
        model = %config.llm_model,
        "Fallback responder ready"
    );
    Ok(concierge.with_fallback(Arc::new(router)))
}

async fn eviction_loop(sessions: Arc<SessionStore>, ttl: Duration, every: Duration) {
    tracing::info!(
        target: "concierge::session",
        ttl_secs = ttl.as_secs(),
        "Session eviction loop started"
    );
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let removed = sessions.evict_idle(ttl);
        if removed > 0 {
            tracing::info!(
                target: "concierge::session",
                removed,
                active = sessions.len(),
                "Idle sessions evicted"
            );
        }
    }
}

fn build_app(state: AppState) -> Router {
    let static_dir = state
        .config
        .frontend_enabled
        .then(|| state.config.static_dir.clone());

    let mut app = Router::new()
        .route("/chat", post(chat))
        .route("/chat/session/:session_id", delete(end_session))
        .route("/api/v1/health", get(health))
        .route("/api/v1/kb-status", get(kb_status))
        .with_state(state);

    // Everything else is a static file (`/` -> index.html).
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) concierge: Arc<Concierge>,
}

/// GET /api/v1/health – liveness check.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/v1/kb-status – entry counts per knowledge-base category.
async fn kb_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let kb = state.concierge.engine().knowledge();
    Json(serde_json::json!({
        "status": "ok",
        "app_name": state.config.app_name,
        "total_entries": kb.total_entries(),
        "categories": kb.status(),
        "active_sessions": state.concierge.sessions().len(),
    }))
}
