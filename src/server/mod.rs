use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::storage::SqliteStore;

pub mod routes;

/// Server state
pub struct AppState {
    pub database_path: PathBuf,
    pub store: Mutex<SqliteStore>,
}

impl AppState {
    pub fn new(database_path: PathBuf, store: SqliteStore) -> Self {
        Self {
            database_path,
            store: Mutex::new(store),
        }
    }
}

/// Build the grid router over `state`
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::grid_page))
        .route("/api/items", get(routes::get_items))
        .route("/api/commit", post(routes::commit))
        .route("/api/preview", post(routes::preview))
        .route("/api/init", post(routes::init))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, database_path: PathBuf, store: SqliteStore) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(database_path, store));
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("Starting grid server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
