//! Forwarding failures and the responses they turn into.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForwardError {
    /// The backend could not be reached: connect, DNS, TLS or timeout failure.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] reqwest::Error),

    /// The backend did not send response headers within the request timeout.
    #[error("upstream timed out after {0:?}")]
    UpstreamTimeout(std::time::Duration),

    #[error("invalid target url: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ForwardError {
    /// Status returned to the caller when forwarding fails.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::UpstreamUnreachable(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::UpstreamUnreachable(_) | ForwardError::InvalidTarget(_) => {
                StatusCode::BAD_GATEWAY
            }
            ForwardError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let message = match &self {
            ForwardError::UpstreamUnreachable(_) => "Upstream request failed",
            ForwardError::UpstreamTimeout(_) => "Upstream timed out",
            ForwardError::InvalidTarget(_) => "Invalid upstream target",
            ForwardError::Client(_) => "Upstream client unavailable",
        };
        (self.status(), message).into_response()
    }
}

pub type ForwardResult<T> = Result<T, ForwardError>;
