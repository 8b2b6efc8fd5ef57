//! Header pass-through.
//!
//! End-to-end headers are copied verbatim in both directions. Hop-by-hop
//! headers describe a single connection and are dropped, together with any
//! header the `Connection` header names. `Host` is dropped on the way out;
//! the client derives it from the target URL.

use axum::http::header::{self, HeaderMap, HeaderName};

fn is_hop_by_hop(name: &HeaderName, connection_listed: &[HeaderName]) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-connection"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    ) || connection_listed.contains(name)
}

fn connection_listed(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect()
}

fn end_to_end(headers: &HeaderMap, also_drop: Option<&HeaderName>) -> HeaderMap {
    let listed = connection_listed(headers);
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name, &listed) || also_drop == Some(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Headers to send to the backend for an inbound request.
pub fn outbound_request_headers(inbound: &HeaderMap) -> HeaderMap {
    end_to_end(inbound, Some(&header::HOST))
}

/// Headers to return to the caller for a backend response.
pub fn relayed_response_headers(upstream: &HeaderMap) -> HeaderMap {
    end_to_end(upstream, None)
}
