//! Shared utilities for integration testing.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::Router;
use futures_util::stream;
use edge_forwarder::config::ForwarderConfig;
use edge_forwarder::{HttpServer, Shutdown};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use url::Url;

/// A request as the mock backend saw it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub requests: mpsc::UnboundedReceiver<Captured>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The next captured request; panics if none arrived.
    pub fn next(&mut self) -> Captured {
        self.requests.try_recv().expect("backend received no request")
    }
}

/// Start a backend that records every request and answers with `status`,
/// an `x-backend: <name>` header and a `<name> <method> <path>` body.
pub async fn start_mock_backend(name: &'static str, status: StatusCode) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, requests) = mpsc::unbounded_channel();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let tx = tx.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
            let reply = format!("{name} {} {}", parts.method, parts.uri.path());
            let _ = tx.send(Captured {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body,
            });
            (status, [("x-backend", name)], reply)
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, requests }
}

/// Start a backend that waits `delay` before answering `200 OK`.
#[allow(dead_code)]
pub async fn start_slow_backend(delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        "late"
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// Start a backend that sends headers at once, then `chunks` body chunks
/// `interval` apart (`chunk0\n`, `chunk1\n`, ...).
#[allow(dead_code)]
pub async fn start_streaming_backend(chunks: usize, interval: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(move || async move {
        let body = stream::unfold(0, move |i| async move {
            if i == chunks {
                return None;
            }
            tokio::time::sleep(interval).await;
            Some((Ok::<_, Infallible>(Bytes::from(format!("chunk{i}\n"))), i + 1))
        });
        Body::from_stream(body)
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub struct RunningForwarder {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<ForwarderConfig>,
}

#[allow(dead_code)]
impl RunningForwarder {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the forwarder on an ephemeral port in front of `base_url`.
pub async fn start_forwarder(base_url: &str) -> RunningForwarder {
    start_forwarder_with(base_url, |_| {}).await
}

/// Like [`start_forwarder`], with a hook to adjust the config first.
#[allow(dead_code)]
pub async fn start_forwarder_with(
    base_url: &str,
    adjust: impl FnOnce(&mut ForwarderConfig),
) -> RunningForwarder {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = ForwarderConfig::default();
    config.listener.bind_address = addr.to_string();
    config.backend.base_url = Url::parse(base_url).unwrap();
    adjust(&mut config);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    RunningForwarder {
        addr,
        shutdown,
        config_tx,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
