//! HTTP surface: routes, shared state and the server entry point.

pub mod forms;
pub mod handlers;
pub mod pages;
pub mod session;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{AdminGuard, LoginThrottle, SessionTrustStore};
use crate::config::GameRosterConfig;
use crate::roster::{AdminConsole, Roster};
use crate::shutdown::shutdown_signal;
use crate::store::{DocumentStore, JsonFileStore};

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<Roster>,
    pub guard: Arc<AdminGuard>,
    pub admin: Arc<AdminConsole>,
    pub cookie_name: Arc<str>,
}

impl AppState {
    pub fn new(roster: Arc<Roster>, guard: Arc<AdminGuard>, cookie_name: &str) -> Self {
        let admin = Arc::new(AdminConsole::new(roster.clone(), guard.clone()));
        Self {
            roster,
            guard,
            admin,
            cookie_name: Arc::from(cookie_name),
        }
    }

    /// Wire a store and the admin settings from configuration
    pub fn from_config(config: &GameRosterConfig, store: Arc<dyn DocumentStore>) -> Self {
        let roster = Arc::new(Roster::new(store));
        let guard = Arc::new(
            AdminGuard::new(
                config.admin.pin.clone(),
                Arc::new(SessionTrustStore::with_ttl(config.admin.session_ttl())),
            )
                .with_throttle(LoginThrottle::per_minute(config.admin.login_attempts_per_minute)),
        );
        Self::new(roster, guard, &config.admin.cookie_name)
    }
}

fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/register", post(handlers::register))
        .route("/registered/:id", get(handlers::registered))
        .route("/admin", get(handlers::admin_page))
        .route("/admin/login", post(handlers::admin_login))
        .route("/admin/toggle", post(handlers::admin_toggle))
        .route("/admin/set-game", post(handlers::admin_set_game))
        .route("/admin/export", get(handlers::admin_export))
        .route("/admin/logout", post(handlers::admin_logout))
}

/// Build the application router. Every route is also reachable under `/api`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(app_routes())
        .nest("/api", app_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until a shutdown signal arrives
pub async fn serve(config: &GameRosterConfig) -> Result<()> {
    let store = JsonFileStore::new(&config.storage.data_file);
    // A corrupt document fails startup instead of the first request
    store
        .read_document()
        .await
        .with_context(|| format!("Failed to open roster document {}", store.location()))?;

    let state = AppState::from_config(config, Arc::new(store));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    info!(
        address = %config.server.bind_address,
        data_file = %config.storage.data_file.display(),
        "Game roster listening"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Game roster stopped");
    Ok(())
}
