//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and agent routes
//! - Wire up middleware (tracing, body limit, request ID)
//! - Bind server to listener
//! - Hand agent requests to the relay
//! - Observability (metrics, correlation IDs)

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, Request},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::health;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::observability::metrics;
use crate::relay::{Relay, ReqwestTransport, Route, Transport, TransportError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server that reaches the upstream through a shared `reqwest` client.
    pub fn new(config: ProxyConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.timeouts.request())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a server with a caller-supplied transport.
    pub fn with_transport(config: ProxyConfig, transport: Arc<dyn Transport>) -> Self {
        let state = AppState {
            relay: Arc::new(Relay::new(&config, transport)),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let path = config.public.path.as_str();
        let card_path = format!("{}.json", path);

        Router::new()
            .route("/healthz", get(health::healthz))
            .route(&card_path, get(agent_card_handler))
            .route(path, post(action_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request.headers().request_id(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The configured router, e.g. for driving it without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            agent_path = %self.config.public.path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `GET <path>.json`
async fn agent_card_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    relay_request(state, Route::AgentCard, method, headers, body).await
}

/// `POST <path>`
async fn action_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    relay_request(state, Route::Action, method, headers, body).await
}

async fn relay_request(
    state: AppState,
    route: Route,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();
    let method_str = method.to_string();

    tracing::debug!(
        request_id = %headers.request_id(),
        route = route.as_str(),
        body_len = body.len(),
        "Relaying request"
    );

    let response = match state.relay.forward(route, method, &headers, body).await {
        Ok(relayed) => relayed.into_response(),
        Err(e) => {
            tracing::warn!(
                request_id = %headers.request_id(),
                route = route.as_str(),
                status = e.status().as_u16(),
                error = %e,
                "Relay failed"
            );
            e.into_response()
        }
    };

    metrics::record_request(&method_str, route.as_str(), response.status().as_u16(), start_time);
    response
}
