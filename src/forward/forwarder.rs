//! The forwarder: one inbound request in, one outbound call, one response out.

use std::time::Duration;

use axum::body::{Body, HttpBody};
use axum::http::{header, Request};
use axum::response::Response;
use reqwest::redirect::Policy;
use url::Url;

use crate::config::{BackendConfig, TimeoutConfig};
use crate::forward::error::{ForwardError, ForwardResult};
use crate::forward::headers::{outbound_request_headers, relayed_response_headers};
use crate::forward::target::{build_target, is_bodyless};

const MAX_REDIRECTS: usize = 10;

/// Relays requests to a backend over a pooled HTTP client.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    response_timeout: Duration,
}

impl Forwarder {
    /// Build a forwarder whose client honours the configured timeouts and
    /// redirect policy.
    ///
    /// `request_secs` bounds the time until the backend's response headers
    /// arrive. Once they have been relayed the body streams without a deadline.
    pub fn new(backend: &BackendConfig, timeouts: &TimeoutConfig) -> ForwardResult<Self> {
        let redirect = if backend.follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .redirect(redirect)
            .no_proxy()
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self {
            client,
            response_timeout: Duration::from_secs(timeouts.request_secs),
        })
    }

    /// Forward `request` to `base + prefix + sub_path`, keeping its query.
    ///
    /// Method and end-to-end headers are copied. The body is streamed for
    /// methods that may carry one and omitted for GET and HEAD. The backend's
    /// status, headers and streamed body come back unchanged.
    pub async fn forward(
        &self,
        request: Request<Body>,
        base: &Url,
        prefix: &str,
        sub_path: &str,
    ) -> ForwardResult<Response> {
        let (parts, body) = request.into_parts();
        let target = build_target(base, prefix, sub_path, parts.uri.query())?;

        let mut headers = outbound_request_headers(&parts.headers);
        let send_body = !is_bodyless(&parts.method) && body.size_hint().exact() != Some(0);
        if !send_body {
            headers.remove(header::CONTENT_LENGTH);
        }

        tracing::debug!(
            method = %parts.method,
            target = %target,
            with_body = send_body,
            "Forwarding request"
        );

        let mut outbound = self
            .client
            .request(parts.method.clone(), target)
            .headers(headers);
        if send_body {
            outbound = outbound.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let upstream = match tokio::time::timeout(self.response_timeout, outbound.send()).await {
            Ok(Ok(upstream)) => upstream,
            Ok(Err(e)) => {
                tracing::error!(method = %parts.method, error = %e, "Upstream error");
                return Err(ForwardError::UpstreamUnreachable(e));
            }
            Err(_) => {
                tracing::error!(
                    method = %parts.method,
                    timeout = ?self.response_timeout,
                    "Upstream did not respond in time"
                );
                return Err(ForwardError::UpstreamTimeout(self.response_timeout));
            }
        };

        let status = upstream.status();
        let headers = relayed_response_headers(upstream.headers());

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}
