//! REST API for running and browsing simulations.
//!
//! Routes:
//! - `POST /simulations` runs a simulation and stores it
//! - `GET /simulations` lists stored runs, newest first
//! - `GET /simulations/{id}` returns one run with its full result
//! - `DELETE /simulations/{id}` removes one run
//! - `GET /simulations/{id}/power` returns the per-tick series with optional range filtering

mod handlers;
pub mod store;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::sync::RwLock;
use tracing::info;

use self::store::SimulationStore;

/// Application state shared across all request handlers.
///
/// Simulations run outside the lock; the store is only locked to insert or
/// read finished results.
#[derive(Debug, Default)]
pub struct AppState {
    pub store: RwLock<SimulationStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/simulations",
            get(handlers::list_simulations).post(handlers::create_simulation),
        )
        .route(
            "/simulations/{id}",
            get(handlers::get_simulation).delete(handlers::delete_simulation),
        )
        .route("/simulations/{id}/power", get(handlers::get_power))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an error if the listener cannot bind to `addr` or the server
/// fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
