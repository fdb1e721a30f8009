//! Request error taxonomy.
//!
//! Three failure classes reach a response: upstream refusals passed through
//! with their original status, transport failures mapped to 502, and bad
//! request shapes rejected with 400 before any network call. Absorbed
//! failures (software detection, Mastodon identity and reply lookups) are
//! handled at their call sites and never become a `FeedError`.

use shuttle_axum::axum::http::StatusCode;
use shuttle_axum::axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// Upstream answered a call that has no fallback with a non-success
    /// status. Code and status text are passed through verbatim.
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Transport-level failure talking to the upstream: DNS, TLS, timeout,
    /// or an undecodable body.
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request rejected before any network call was made.
    #[error("{0}")]
    BadRequest(String),
}

impl FeedError {
    /// Pass-through variant for an upstream non-success response.
    pub fn upstream(status: reqwest::StatusCode) -> Self {
        FeedError::Upstream {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("upstream error")
                .to_owned(),
        }
    }
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        match self {
            FeedError::Upstream { status, message } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, message).into_response()
            }
            FeedError::Http(e) => {
                tracing::error!(error = ?e, "upstream transport failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream request failed".to_owned(),
                )
                    .into_response()
            }
            FeedError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_keeps_status_and_reason() {
        let err = FeedError::upstream(reqwest::StatusCode::UNAUTHORIZED);
        match err {
            FeedError::Upstream { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
