// Local HTTP API.
// Exposes the tree builder, notifications, rate limit, and config store to the desktop GUI.

mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{delete, get, patch, post, put};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::ConfigStore;
use crate::error::Result;
use crate::github::Connector;
use crate::tree::TreeBuilder;

/// Origins of the GUI dev servers allowed by default.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

/// Shared state behind every route.
pub struct AppState<C> {
    pub builder: Arc<TreeBuilder<C>>,
    pub config: Arc<Mutex<ConfigStore>>,
    /// Token from the process environment, used when neither header nor config has one.
    pub env_token: Option<String>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            builder: Arc::clone(&self.builder),
            config: Arc::clone(&self.config),
            env_token: self.env_token.clone(),
        }
    }
}

impl<C: Connector> AppState<C> {
    pub fn new(connector: C, config: ConfigStore, env_token: Option<String>) -> Self {
        Self {
            builder: Arc::new(TreeBuilder::new(connector)),
            config: Arc::new(Mutex::new(config)),
            env_token: env_token.filter(|t| !t.trim().is_empty()),
        }
    }
}

/// Build the API router.
pub fn router<C: Connector + 'static>(state: AppState<C>, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/tree", get(handlers::tree::<C>))
        .route("/api/tree/{owner}/{repo}", get(handlers::repository_detail::<C>))
        .route("/api/rate-limit", get(handlers::rate_limit::<C>))
        .route("/api/notifications", get(handlers::notifications::<C>))
        .route(
            "/api/notifications/count",
            get(handlers::notifications_count::<C>),
        )
        .route(
            "/api/notifications/threads/{thread_id}",
            patch(handlers::mark_thread_read::<C>),
        )
        .route(
            "/api/notifications/mark-all-read",
            put(handlers::mark_all_read::<C>),
        )
        .route("/api/config", get(handlers::get_config::<C>))
        .route("/api/config/github", put(handlers::update_github::<C>))
        .route(
            "/api/config/watched-repos",
            get(handlers::watched_repos::<C>).post(handlers::add_watched_repo::<C>),
        )
        .route(
            "/api/config/watched-repos/{owner}/{repo}",
            delete(handlers::remove_watched_repo::<C>),
        )
        .route(
            "/api/config/enabled-repos",
            get(handlers::enabled_repos::<C>).put(handlers::set_enabled_repos::<C>),
        )
        .route("/api/config/ui", put(handlers::update_ui::<C>))
        .route("/api/config/reset", post(handlers::reset_config::<C>))
        .layer(cors)
        .with_state(state)
}

/// Serve `app` on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "repotree API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("repotree API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
