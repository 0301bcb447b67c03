use std::net::SocketAddr;

use anyhow::{Context, Result, anyhow};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::{CorsConfig, TripflowConfig};

/// Browser access to `/api/*` is limited to the configured origins, methods
/// GET/POST/OPTIONS and the `Content-Type` header.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

/// The complete application: liveness routes plus `/api`
pub fn app(state: AppState, config: &TripflowConfig) -> Result<Router> {
    let api = api::router(state).layer(cors_layer(&config.cors)?);

    Ok(Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(config.server.max_body_bytes)),
        ))
}

async fn health() -> &'static str {
    "OK"
}

async fn home() -> &'static str {
    "TripFlow backend is running"
}

pub async fn run(config: TripflowConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let app = app(state, &config)?;

    let addr = resolve(&config.server.host, config.server.port).await?;

    #[cfg(feature = "tls")]
    if let (Some(cert), Some(key)) = (&config.server.tls_cert, &config.server.tls_key) {
        return serve_tls(app, addr, cert, key).await;
    }

    if config.server.tls_cert.is_some() {
        tracing::warn!("TLS certificate configured but the `tls` feature is disabled; serving plain HTTP");
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("Failed to resolve {host}:{port}"))?
        .next()
        .ok_or_else(|| anyhow!("No address found for {host}:{port}"))
}

#[cfg(feature = "tls")]
async fn serve_tls(
    app: Router,
    addr: SocketAddr,
    cert: &std::path::Path,
    key: &std::path::Path,
) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| format!("Failed to load TLS files {} / {}", cert.display(), key.display()))?;

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
    });

    tracing::info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
