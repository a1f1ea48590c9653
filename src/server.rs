//! Live serving with draft preview.
//!
//! | Route | |
//! |-------|---|
//! | `GET /` | The page. Published renders are cached for `revalidate.interval_secs`; draft renders never are |
//! | `GET /health` | `{ status, version, service }` |
//! | `GET /api/draft` | Validate a preview secret, set the draft cookie, redirect |
//! | `GET /api/disable-draft` | Clear the draft cookie, redirect home |
//! | `GET /style.css`, `/folio.js` | Embedded static assets |
//! | anything else | Files under `assets_dir` |
//!
//! All per-request state is the cookie: [`DraftSession::is_enabled`] decides
//! the [`RenderContext`] and from it the store perspective.

use crate::cache::PageCache;
use crate::config::SiteConfig;
use crate::generate::{RenderContext, StaticAssets, render_page};
use crate::layout::layout_rng;
use crate::preview::{DraftSession, PreviewDecision, validate_preview_url};
use crate::store::queries::fetch_all;
use crate::store::{ContentStore, StoreError};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Content store error: {0}")]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<SiteConfig>,
    store: Arc<dyn ContentStore>,
    session: Arc<DraftSession>,
    cache: Arc<PageCache>,
    assets: Arc<StaticAssets>,
    assets_dir: PathBuf,
}

impl AppState {
    pub fn new(
        config: SiteConfig,
        config_dir: &Path,
        store: Arc<dyn ContentStore>,
        session: DraftSession,
    ) -> Self {
        let interval = Duration::from_secs(config.revalidate.interval_secs);
        Self {
            assets: Arc::new(StaticAssets::new(&config)),
            assets_dir: config_dir.join(&config.assets_dir),
            cache: Arc::new(PageCache::new(interval)),
            session: Arc::new(session),
            store,
            config: Arc::new(config),
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    async fn render(&self, draft: bool) -> Result<String, ServeError> {
        let ctx = RenderContext::new(&self.config, draft);
        let snapshot = fetch_all(self.store.as_ref(), ctx.perspective()).await?;
        let mut rng = layout_rng(self.config.skills.layout_seed);
        Ok(render_page(&snapshot, &ctx, &self.assets, &mut rng).into_string())
    }
}

pub fn build_router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.assets_dir);
    Router::new()
        .route("/", get(page_handler))
        .route("/health", get(health_handler))
        .route("/api/draft", get(enable_draft_handler))
        .route("/api/disable-draft", get(disable_draft_handler))
        .route("/style.css", get(style_handler))
        .route("/folio.js", get(script_handler))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> Result<(), ServeError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not install Ctrl-C handler");
    }
    info!("shutting down");
}

fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let cookies: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    (!cookies.is_empty()).then(|| cookies.join("; "))
}

/// Weak comparison against an `If-None-Match` list: `*` matches anything,
/// `W/` prefixes are ignored.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    let etag = etag.strip_prefix("W/").unwrap_or(etag);
    if_none_match
        .split(',')
        .map(str::trim)
        .any(|tag| tag == "*" || tag.strip_prefix("W/").unwrap_or(tag) == etag)
}

async fn page_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ServeError> {
    if state.session.is_enabled(cookie_header(&headers).as_deref()) {
        let html = state.render(true).await?;
        debug!("rendered draft page");
        return Ok(([(header::CACHE_CONTROL, "no-store")], Html(html)).into_response());
    }

    let page = state.cache.get_or_render(|| state.render(false)).await?;
    debug!(stats = %state.cache.stats(), "served published page");

    let not_modified = headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|list| etag_matches(list, &page.etag));
    if not_modified {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, page.etag.clone())]).into_response());
    }

    Ok((
        [
            (header::ETAG, page.etag.clone()),
            (header::CACHE_CONTROL, "public, max-age=0, must-revalidate".to_string()),
        ],
        Html(page.html.clone()),
    )
        .into_response())
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
    }))
}

#[derive(Debug, Deserialize)]
struct DraftParams {
    #[serde(rename = "sanity-preview-secret")]
    secret: Option<String>,
    #[serde(rename = "sanity-preview-pathname")]
    pathname: Option<String>,
}

async fn enable_draft_handler(
    State(state): State<AppState>,
    Query(params): Query<DraftParams>,
) -> Result<Response, ServeError> {
    let decision = validate_preview_url(
        state.store.as_ref(),
        params.secret.as_deref(),
        params.pathname.as_deref(),
        Utc::now(),
    )
    .await?;
    match decision {
        PreviewDecision::Granted { redirect_to } => Ok((
            [(header::SET_COOKIE, state.session.enable_cookie())],
            Redirect::temporary(&redirect_to),
        )
            .into_response()),
        PreviewDecision::Denied => {
            info!("preview secret rejected");
            Ok((StatusCode::UNAUTHORIZED, "Invalid secret").into_response())
        }
    }
}

async fn disable_draft_handler() -> Response {
    (
        [(header::SET_COOKIE, DraftSession::disable_cookie())],
        Redirect::temporary("/"),
    )
        .into_response()
}

const IMMUTABLE: &str = "public, max-age=31536000, immutable";

async fn style_handler(State(state): State<AppState>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, IMMUTABLE),
        ],
        state.assets.css.clone(),
    )
        .into_response()
}

async fn script_handler(State(state): State<AppState>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, IMMUTABLE),
        ],
        state.assets.js,
    )
        .into_response()
}
