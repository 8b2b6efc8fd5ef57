//! Target URL construction.

use axum::http::Method;
use url::Url;

/// Prefix of the general API proxy, on both the inbound and outbound side.
pub const API_PREFIX: &str = "/api";

/// Path of the health-check proxy.
pub const HEALTH_PATH: &str = "/health";

/// Build `base + prefix + sub_path [+ "?" + query]`.
///
/// A trailing `/` on the base is dropped so it is not doubled by the prefix.
/// The query is appended verbatim; `None` means the inbound URL had no `?`.
pub fn build_target(
    base: &Url,
    prefix: &str,
    sub_path: &str,
    query: Option<&str>,
) -> Result<Url, url::ParseError> {
    let base = base.as_str().trim_end_matches('/');
    let target = match query {
        Some(q) => format!("{base}{prefix}{sub_path}?{q}"),
        None => format!("{base}{prefix}{sub_path}"),
    };
    Url::parse(&target)
}

/// The raw path remainder after `prefix`, or `""` when the path is the prefix
/// itself or does not start with it.
pub fn sub_path<'a>(path: &'a str, prefix: &str) -> &'a str {
    path.strip_prefix(prefix).unwrap_or("")
}

/// Methods that must not carry a request body.
pub fn is_bodyless(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}
