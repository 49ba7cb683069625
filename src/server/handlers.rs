// Route handlers.
// Resolve per-request credentials, call into the tree builder or GitHub, and shape JSON.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::config::{AppConfig, EnabledRepo, GitHubConfig, WatchedRepo, WindowPosition, WindowSize};
use crate::error::{RepoTreeError, Result};
use crate::github::{Connector, GitHubApi, Notification, NotificationQuery, RateLimit};
use crate::tree::{Credentials, TreeNode};

use super::AppState;

/// Header carrying a caller-supplied GitHub token.
pub const TOKEN_HEADER: &str = "x-github-token";
/// Header overriding the GitHub API base URL for one request.
pub const API_URL_HEADER: &str = "x-github-api-url";

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Header first, then the stored configuration, then the startup environment.
pub fn resolve_credentials(
    headers: &HeaderMap,
    github: &GitHubConfig,
    env_token: Option<&str>,
) -> Credentials {
    let stored = github
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let token = header_value(headers, TOKEN_HEADER)
        .or(stored)
        .or_else(|| env_token.map(str::to_string));
    let api_url = header_value(headers, API_URL_HEADER).or_else(|| Some(github.api_url.clone()));
    Credentials::new(token, api_url)
}

/// Everything one request needs from shared state.
struct RequestContext {
    credentials: Credentials,
    default_org: Option<String>,
}

impl<C: Connector> AppState<C> {
    async fn request_context(&self, headers: &HeaderMap) -> RequestContext {
        let store = self.config.lock().await;
        let github = &store.config().github;
        RequestContext {
            credentials: resolve_credentials(headers, github, self.env_token.as_deref()),
            default_org: github.organization.clone(),
        }
    }

    async fn client(&self, headers: &HeaderMap) -> Result<C::Client> {
        let ctx = self.request_context(headers).await;
        self.builder.connect(&ctx.credentials)
    }
}

/// Swallow upstream failures into `fallback`; credential and rate-limit errors still surface.
fn degrade_upstream<T>(what: &str, result: Result<T>, fallback: T) -> Result<T> {
    match result {
        Err(
            e @ (RepoTreeError::Upstream { .. }
            | RepoTreeError::Transport(_)
            | RepoTreeError::Json(_)),
        ) => {
            warn!(what, error = %e, "upstream call failed, returning fallback");
            Ok(fallback)
        }
        other => other,
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "GitHub Repository Explorer API",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
pub struct TreeQuery {
    /// Comma-separated organization or user logins.
    pub orgs: Option<String>,
}

pub async fn tree<C: Connector>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Query(query): Query<TreeQuery>,
) -> Result<Json<Vec<TreeNode>>> {
    let ctx = state.request_context(&headers).await;
    let roots = state
        .builder
        .shallow_tree(
            &ctx.credentials,
            query.orgs.as_deref(),
            ctx.default_org.as_deref(),
        )
        .await?;
    Ok(Json(roots))
}

pub async fn repository_detail<C: Connector>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<Vec<TreeNode>>> {
    let ctx = state.request_context(&headers).await;
    let detail = state
        .builder
        .repository_detail(&ctx.credentials, &owner, &repo)
        .await?;
    Ok(Json(detail.containers))
}

pub async fn rate_limit<C: Connector>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
) -> Result<Json<RateLimit>> {
    let client = state.client(&headers).await?;
    Ok(Json(client.rate_limit().await?))
}

pub async fn notifications<C: Connector>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>> {
    let client = state.client(&headers).await?;
    let notifications = degrade_upstream(
        "notifications",
        client.notifications(&query).await,
        Vec::new(),
    )?;
    Ok(Json(notifications))
}

pub async fn notifications_count<C: Connector>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let client = state.client(&headers).await?;
    let count = degrade_upstream(
        "notifications count",
        client.unread_notification_count().await,
        0,
    )?;
    Ok(Json(json!({ "unread_count": count })))
}

/// Notification thread ids are numeric upstream.
fn validate_thread_id(thread_id: &str) -> Result<()> {
    if thread_id.is_empty() || !thread_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RepoTreeError::InvalidRequest(format!(
            "invalid notification thread id: {:?}",
            thread_id
        )));
    }
    Ok(())
}

pub async fn mark_thread_read<C: Connector>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Path(thread_id): Path<String>,
) -> Result<Json<Value>> {
    validate_thread_id(&thread_id)?;
    let client = state.client(&headers).await?;
    let success = degrade_upstream(
        "mark thread read",
        client.mark_thread_read(&thread_id).await.map(|_| true),
        false,
    )?;
    Ok(Json(json!({ "success": success })))
}

pub async fn mark_all_read<C: Connector>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let client = state.client(&headers).await?;
    let success = degrade_upstream(
        "mark all read",
        client.mark_all_notifications_read().await.map(|_| true),
        false,
    )?;
    Ok(Json(json!({ "success": success })))
}

pub async fn get_config<C: Connector>(State(state): State<AppState<C>>) -> Json<AppConfig> {
    let store = state.config.lock().await;
    Json(store.config().redacted())
}

/// Absent fields stay unchanged; an empty string clears token or organization.
#[derive(Debug, Deserialize)]
pub struct GitHubUpdate {
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub organization: Option<String>,
}

pub async fn update_github<C: Connector>(
    State(state): State<AppState<C>>,
    Json(update): Json<GitHubUpdate>,
) -> Result<Json<AppConfig>> {
    let mut store = state.config.lock().await;
    if let Some(api_url) = update.api_url {
        store.set_api_url(&api_url)?;
    }
    if let Some(token) = update.token {
        store.set_token(Some(token))?;
    }
    if let Some(organization) = update.organization {
        store.set_organization(Some(organization))?;
    }
    Ok(Json(store.config().redacted()))
}

pub async fn watched_repos<C: Connector>(
    State(state): State<AppState<C>>,
) -> Json<Vec<WatchedRepo>> {
    let store = state.config.lock().await;
    Json(store.watched_repos().to_vec())
}

#[derive(Debug, Deserialize)]
pub struct WatchRequest {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_true")]
    pub notifications: bool,
}

fn default_true() -> bool {
    true
}

pub async fn add_watched_repo<C: Connector>(
    State(state): State<AppState<C>>,
    Json(request): Json<WatchRequest>,
) -> Result<Json<Vec<WatchedRepo>>> {
    if request.owner.trim().is_empty() || request.repo.trim().is_empty() {
        return Err(RepoTreeError::InvalidRequest(
            "owner and repo are required".to_string(),
        ));
    }
    let mut store = state.config.lock().await;
    store.add_watched_repo(&request.owner, &request.repo, request.notifications)?;
    Ok(Json(store.watched_repos().to_vec()))
}

pub async fn remove_watched_repo<C: Connector>(
    State(state): State<AppState<C>>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let mut store = state.config.lock().await;
    let removed = store.remove_watched_repo(&owner, &repo)?;
    Ok(Json(json!({ "removed": removed })))
}

pub async fn enabled_repos<C: Connector>(
    State(state): State<AppState<C>>,
) -> Json<Vec<EnabledRepo>> {
    let store = state.config.lock().await;
    Json(store.enabled_repos().to_vec())
}

pub async fn set_enabled_repos<C: Connector>(
    State(state): State<AppState<C>>,
    Json(enabled): Json<Vec<EnabledRepo>>,
) -> Result<Json<Vec<EnabledRepo>>> {
    let mut store = state.config.lock().await;
    store.set_enabled_repos(enabled)?;
    Ok(Json(store.enabled_repos().to_vec()))
}

#[derive(Debug, Deserialize)]
pub struct UiUpdate {
    pub theme: Option<String>,
    pub language: Option<String>,
    pub window_size: Option<WindowSize>,
    pub window_position: Option<WindowPosition>,
}

pub async fn update_ui<C: Connector>(
    State(state): State<AppState<C>>,
    Json(update): Json<UiUpdate>,
) -> Result<Json<AppConfig>> {
    let mut store = state.config.lock().await;
    if let Some(theme) = update.theme {
        store.set_theme(&theme)?;
    }
    if let Some(language) = update.language {
        store.set_language(&language)?;
    }
    if update.window_size.is_some() || update.window_position.is_some() {
        store.set_window(update.window_size, update.window_position)?;
    }
    Ok(Json(store.config().redacted()))
}

pub async fn reset_config<C: Connector>(
    State(state): State<AppState<C>>,
) -> Result<Json<AppConfig>> {
    let mut store = state.config.lock().await;
    store.reset()?;
    Ok(Json(store.config().redacted()))
}
