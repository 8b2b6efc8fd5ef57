//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the API and health proxy handlers
//! - Wire up middleware (tracing, request timeout)
//! - Bind server to listener
//! - Swap backend and client when a new configuration arrives
//! - Drain in-flight requests on shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;
use uuid::Uuid;

use crate::config::ForwarderConfig;
use crate::forward::target::sub_path;
use crate::forward::{ForwardError, Forwarder, API_PREFIX, HEALTH_PATH};
use crate::observability::metrics;

/// Backend origin and the client used to reach it, swapped as one unit.
#[derive(Debug)]
pub struct Upstream {
    pub base_url: Url,
    pub forwarder: Forwarder,
}

impl Upstream {
    fn from_config(config: &ForwarderConfig) -> Result<Self, ForwardError> {
        Ok(Self {
            base_url: config.backend.base_url.clone(),
            forwarder: Forwarder::new(&config.backend, &config.timeouts)?,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<ArcSwap<Upstream>>,
}

/// HTTP server for the forwarder.
pub struct HttpServer {
    router: Router,
    config: ForwarderConfig,
    upstream: Arc<ArcSwap<Upstream>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ForwarderConfig) -> Result<Self, ForwardError> {
        let upstream = Arc::new(ArcSwap::from_pointee(Upstream::from_config(&config)?));
        let state = AppState {
            upstream: upstream.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            upstream,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The inbound deadline sits one second past the outbound one so a slow
    /// backend is reported by the forwarder itself.
    fn build_router(config: &ForwarderConfig, state: AppState) -> Router {
        Router::new()
            .route(API_PREFIX, any(api_proxy))
            .route(&format!("{API_PREFIX}/{{*path}}"), any(api_proxy))
            .route(HEALTH_PATH, any(health_proxy))
            .fallback(fallback)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<Body>| {
                            tracing::info_span!(
                                "request",
                                id = %Uuid::new_v4(),
                                method = %request.method(),
                                path = %request.uri().path(),
                            )
                        },
                    ))
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::GATEWAY_TIMEOUT,
                        Duration::from_secs(config.timeouts.request_secs + 1),
                    )),
            )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configurations received on `config_updates` replace the backend and
    /// client; the listener and inbound timeout keep their startup values.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<ForwarderConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.base_url,
            "HTTP server starting"
        );

        let reloader = tokio::spawn(apply_config_updates(
            self.upstream.clone(),
            self.config.clone(),
            config_updates,
        ));

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        reloader.abort();
        result?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ForwarderConfig {
        &self.config
    }
}

async fn apply_config_updates(
    upstream: Arc<ArcSwap<Upstream>>,
    startup: ForwarderConfig,
    mut updates: mpsc::UnboundedReceiver<ForwarderConfig>,
) {
    while let Some(config) = updates.recv().await {
        if config.listener != startup.listener
            || config.timeouts.request_secs != startup.timeouts.request_secs
        {
            tracing::warn!("Listener and inbound timeout changes take effect after a restart");
        }

        match Upstream::from_config(&config) {
            Ok(next) => {
                tracing::info!(backend = %next.base_url, "Backend configuration reloaded");
                upstream.store(Arc::new(next));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to apply reloaded config, keeping current backend");
            }
        }
    }
}

/// `ANY /api` and `ANY /api/{*path}`.
async fn api_proxy(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ForwardError> {
    let path = request.uri().path().to_owned();
    forward(&state, "api", request, API_PREFIX, sub_path(&path, API_PREFIX)).await
}

/// `ANY /health`. Only method, headers and query reach the backend.
async fn health_proxy(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ForwardError> {
    let (parts, _) = request.into_parts();
    let request = Request::from_parts(parts, Body::empty());
    forward(&state, "health", request, HEALTH_PATH, "").await
}

/// Catches `/api/`, which the wildcard route does not match, and 404s the rest.
async fn fallback(State(state): State<AppState>, request: Request<Body>) -> Response {
    if request.uri().path().starts_with(&format!("{API_PREFIX}/")) {
        return api_proxy(State(state), request).await.into_response();
    }
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

async fn forward(
    state: &AppState,
    route: &'static str,
    request: Request<Body>,
    prefix: &str,
    sub_path: &str,
) -> Result<Response, ForwardError> {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let upstream = state.upstream.load_full();

    let result = upstream
        .forwarder
        .forward(request, &upstream.base_url, prefix, sub_path)
        .await;

    let status = match &result {
        Ok(response) => response.status(),
        Err(e) => e.status(),
    };
    metrics::record_request(route, &method, status.as_u16(), start_time);

    result
}
