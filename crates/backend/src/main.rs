mod proxy;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{FromRef, State};
use axum::http::HeaderValue;
use axum::response::{Html, Redirect};
use axum::routing::{any, get};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;
use trafficflow_shared::protocol::API_PREFIX;

use proxy::Upstream;

#[derive(Debug, Clone)]
struct AppConfig {
    port: String,
    dist_dir: PathBuf,
    sim_api_url: String,
}

impl AppConfig {
    fn from_env() -> Self {
        Self {
            port: std::env::var("PORT").unwrap_or_else(|_| "8080".to_string()),
            dist_dir: PathBuf::from(std::env::var("DIST_DIR").unwrap_or_else(|_| "dist".to_string())),
            sim_api_url: std::env::var("SIM_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
        }
    }
}

#[derive(Clone)]
struct AppState {
    dist_dir: Arc<PathBuf>,
    upstream: Upstream,
}

impl FromRef<AppState> for Upstream {
    fn from_ref(state: &AppState) -> Self {
        state.upstream.clone()
    }
}

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Build the full application router.
fn build_app(config: &AppConfig) -> Router {
    // Static file routers are stateless; merge them after the state is attached
    let static_files = Router::new()
        .nest(
            "/dist",
            cached_static_router(&config.dist_dir, CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(&config.dist_dir.join("assets"), CACHE_IMMUTABLE),
        );

    let state = AppState {
        dist_dir: Arc::new(config.dist_dir.clone()),
        upstream: Upstream::new(config.sim_api_url.clone()),
    };

    Router::new()
        .route("/", get(serve_index))
        .route("/frontend", get(redirect_to_root))
        .route("/frontend/", get(redirect_to_root))
        .route(&format!("{API_PREFIX}/{{*path}}"), any(proxy::forward))
        .with_state(state)
        .merge(static_files)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    let app = build_app(&config);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(
        port = %config.port,
        dist = %config.dist_dir.display(),
        upstream = %config.sim_api_url,
        "viewer host listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}

async fn redirect_to_root() -> Redirect {
    Redirect::permanent("/")
}

async fn serve_index(State(state): State<AppState>) -> Html<String> {
    // Serve the built viewer, or a short placeholder until it has been bundled
    match tokio::fs::read_to_string(state.dist_dir.join("index.html")).await {
        Ok(html) => Html(html),
        Err(_) => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>TrafficFlow</title></head>
<body>
<h1>TrafficFlow</h1>
<p>Viewer not built yet. The simulation API is available under <a href="/api/state">/api/state</a>.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}
