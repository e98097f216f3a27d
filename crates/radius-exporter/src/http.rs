//! HTTP server for the landing page and Prometheus metrics.

use crate::collector::Collector;
use crate::metrics::{CONTENT_TYPE, PrometheusMetrics};
use axum::{
    Router,
    extract::{ConnectInfo, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use ipnetwork::IpNetwork;
use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Header carrying the scrape token
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Who may read the metrics endpoint
///
/// With neither a token nor networks configured, everyone may.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    token: Option<String>,
    allowed: Vec<IpNetwork>,
}

impl AccessPolicy {
    pub fn new(token: Option<String>, allowed: Vec<IpNetwork>) -> Self {
        Self { token, allowed }
    }

    pub fn is_open(&self) -> bool {
        self.token.is_none() && self.allowed.is_empty()
    }

    pub fn permits(&self, token: Option<&str>, peer: Option<IpAddr>) -> bool {
        if self.is_open() {
            return true;
        }
        if let (Some(expected), Some(given)) = (self.token.as_deref(), token)
            && expected == given
        {
            return true;
        }
        peer.is_some_and(|ip| self.allowed.iter().any(|network| network.contains(ip)))
    }
}

/// State shared by the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<Collector>,
    pub policy: Arc<AccessPolicy>,
    pub metrics_path: String,
}

impl AppState {
    pub fn new(collector: Collector, policy: AccessPolicy, metrics_path: impl Into<String>) -> Self {
        Self {
            collector: Arc::new(collector),
            policy: Arc::new(policy),
            metrics_path: metrics_path.into(),
        }
    }
}

async fn access_control(
    State(policy): State<Arc<AccessPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if policy.permits(token, peer) {
        next.run(request).await
    } else {
        debug!(peer = ?peer, "Rejected metrics request");
        (StatusCode::FORBIDDEN, "Forbidden").into_response()
    }
}

/// Prometheus metrics endpoint.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let samples = state.collector.collect().await;
    let body = PrometheusMetrics::render(&samples).content;
    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body)
}

async fn landing_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html><head><title>FreeRADIUS Exporter</title></head>\
         <body><h1>FreeRADIUS Exporter</h1><p><a href='{}'>Metrics</a></p></body></html>",
        state.metrics_path
    ))
}

/// Build the HTTP router with all endpoints.
///
/// Access control applies to the metrics route only.
pub fn build_router(state: AppState) -> Router {
    let metrics = Router::new()
        .route(&state.metrics_path, get(metrics_handler))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.policy),
            access_control,
        ));

    Router::new()
        .route("/", get(landing_page))
        .merge(metrics)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve_listener<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

/// Start the HTTP server; stops on Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, path = %state.metrics_path, "HTTP server listening for metrics");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    if let Err(e) = serve_listener(listener, state, shutdown).await {
        error!(error = %e, "HTTP server error");
        return Err(e);
    }

    Ok(())
}
