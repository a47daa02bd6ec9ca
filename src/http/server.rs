//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the single catch-all proxy route
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener with graceful shutdown
//! - Run each exchange: director → upstream fetch → transformer

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, Version},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ProxyConfig, ValidationError};
use crate::http::director::Director;
use crate::http::error::ProxyError;
use crate::http::headers::{append_forwarded_for, strip_hop_by_hop};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::transform::{Exchange, ResponseTransformer};
use crate::observability::metrics;

pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub director: Arc<Director>,
    pub transformer: Arc<ResponseTransformer>,
    pub client: UpstreamClient,
}

/// HTTP server for the mount proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server from a validated configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ValidationError> {
        let state = AppState {
            director: Arc::new(Director::from_config(&config)?),
            transformer: Arc::new(ResponseTransformer::from_config(&config)?),
            client: build_client(&config),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            mount = %self.config.mount.path,
            public_domain = %self.config.mount.public_domain,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn build_client(config: &ProxyConfig) -> UpstreamClient {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));

    let https = HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .wrap_connector(http);

    Client::builder(TokioExecutor::new()).build(https)
}

/// Main proxy handler.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request).to_string();
    let (mut parts, body) = request.into_parts();
    let inbound_path = parts.uri.path().to_string();

    strip_hop_by_hop(&mut parts.headers);
    append_forwarded_for(&mut parts.headers, addr.ip());
    parts.version = Version::HTTP_11;
    let path = state.director.direct(&mut parts);

    let exchange = Exchange {
        method: parts.method.clone(),
        path,
    };

    tracing::debug!(
        request_id = %request_id,
        method = %exchange.method,
        path = %inbound_path,
        upstream_path = %exchange.path,
        "Proxying request"
    );

    let response = match forward(&state, &exchange, Request::from_parts(parts, body)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                path = %exchange.path,
                kind = e.kind(),
                error = %e,
                "Exchange failed"
            );
            e.into_response()
        }
    };

    metrics::record_request(exchange.method.as_str(), response.status().as_u16(), start);
    response
}

async fn forward(
    state: &AppState,
    exchange: &Exchange,
    request: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let response: Response<Incoming> = state.client.request(request).await?;

    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);

    state
        .transformer
        .transform(exchange, Response::from_parts(parts, Body::new(body)))
        .await
}
