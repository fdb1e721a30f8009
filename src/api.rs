//! HTTP surface: one feed endpoint plus a usage page.
//!
//! Path shapes:
//!   `/`                              → usage text
//!   `/{instance}/{token}`            → detect the software, build the feed
//!   `/{software}/{instance}/{token}` → explicit software, build the feed
//! Anything else is rejected with 400 before any network call.

use std::time::Duration;

use chrono::Utc;
use shuttle_axum::axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use crate::detect::{self, SoftwareFamily};
use crate::error::FeedError;
use crate::feed::{self, FeedMetadata};
use crate::upstream::{self, types::InstanceRef};

const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const USAGE: &str = "\
fedi-timeline-feed

Turns the home timeline of a Mastodon- or Misskey-compatible account into
an RSS feed.

  GET /{instance}/{access-token}
      Detect the instance software, then build the feed.

  GET /{software}/{instance}/{access-token}
      Skip detection. The software segment is any supported server name:
      mastodon, gotosocial, pleroma, akkoma, hometown, misskey, firefish,
      iceshrimp, sharkey, catodon, foundkey.
";

#[derive(Clone)]
pub struct AppState {
    http: reqwest::Client,
}

impl AppState {
    /// Build the shared HTTP client from the environment:
    /// `TIMELINE_HTTP_TIMEOUT_SECS` (default 15) and `TIMELINE_USER_AGENT`.
    pub fn from_env() -> Self {
        let timeout = std::env::var("TIMELINE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let user_agent =
            std::env::var("TIMELINE_USER_AGENT").unwrap_or_else(|_| feed::GENERATOR.to_owned());

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout))
            .build()
            .expect("reqwest client");
        Self { http }
    }
}

pub fn router() -> Router {
    router_with_state(AppState::from_env())
}

pub fn router_with_state(state: AppState) -> Router {
    upstream::ensure_metrics_described();

    Router::new()
        .route("/", get(usage))
        .route("/{host}/{token}", get(feed_detected))
        .route("/{software}/{host}/{token}", get(feed_explicit))
        .fallback(bad_path)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn usage() -> &'static str {
    USAGE
}

/// Anything that is not the root or a 2-/3-segment feed path.
async fn bad_path() -> (StatusCode, &'static str) {
    (
        StatusCode::BAD_REQUEST,
        "expected /{instance}/{token} or /{software}/{instance}/{token}",
    )
}

async fn feed_detected(
    State(state): State<AppState>,
    Path((host, token)): Path<(String, String)>,
) -> Result<Response, FeedError> {
    let family = detect::detect_family(&state.http, &host).await;
    build_feed(&state, family, host, token).await
}

async fn feed_explicit(
    State(state): State<AppState>,
    Path((software, host, token)): Path<(String, String, String)>,
) -> Result<Response, FeedError> {
    let family = detect::classify_software(&software)
        .ok_or_else(|| FeedError::BadRequest(format!("unsupported software: {software}")))?;
    build_feed(&state, family, host, token).await
}

/// The whole pipeline for one request: identity, timeline, assembly.
async fn build_feed(
    state: &AppState,
    family: SoftwareFamily,
    host: String,
    token: String,
) -> Result<Response, FeedError> {
    let instance = InstanceRef::new(host, token, family);
    let adapter = upstream::adapter_for(family, state.http.clone());

    let account = adapter.fetch_account(&instance).await?;
    let items = adapter.fetch_timeline(&instance).await?;
    tracing::info!(
        source = adapter.name(),
        host = %instance.host,
        items = items.len(),
        "timeline normalized"
    );

    let meta = FeedMetadata::new(&instance, &account, Utc::now());
    let channel = feed::assemble(&meta, items, family);

    Ok((
        [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        channel.to_string(),
    )
        .into_response())
}
