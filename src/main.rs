use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::env;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use joblens::core::error::ScrapeError;
use joblens::types::*;
use joblens::{AppState, ScrapeOptions};

fn parse_port_from_args() -> Option<u16> {
    let mut args = std::env::args().peekable();
    while let Some(a) = args.next() {
        if a == "--port" {
            if let Some(v) = args.next() {
                if let Ok(p) = v.parse::<u16>() {
                    return Some(p);
                }
            }
        } else if let Some(rest) = a.strip_prefix("--port=") {
            if let Ok(p) = rest.parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

fn port_from_env() -> Option<u16> {
    for k in ["JOBLENS_PORT", "PORT"] {
        if let Ok(v) = std::env::var(k) {
            if let Ok(p) = v.trim().parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting joblens");

    let http_timeout = env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(30);
    let connect_timeout = env::var("HTTP_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(10);
    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(http_timeout))
        .connect_timeout(std::time::Duration::from_secs(connect_timeout))
        .build()?;

    let state = Arc::new(AppState::new(http_client));

    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/scrape", post(scrape_job_handler))
        .route("/can-scrape", post(can_scrape_handler))
        .route("/domains", get(domains_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/clear", post(cache_clear_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let port: u16 = parse_port_from_args().or_else(port_from_env).unwrap_or(5000);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            anyhow::bail!(
                "Address already in use: {}. Stop the existing process or run with --port {} (or set PORT/JOBLENS_PORT).",
                bind_addr,
                port.saturating_add(1)
            )
        }
        Err(e) => return Err(e.into()),
    };
    info!("joblens listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).ok();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                if let Some(ref mut s) = sigterm {
                    s.recv().await;
                } else {
                    futures::future::pending::<()>().await;
                }
            } => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    state.service.shutdown().await;
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "joblens",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn error_response(err: ScrapeError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        ScrapeError::UnsupportedDomain { .. } => StatusCode::BAD_REQUEST,
        ScrapeError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }),
    )
}

async fn scrape_job_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScrapeJobRequest>,
) -> Result<Json<ScrapedJob>, (StatusCode, Json<ErrorResponse>)> {
    let options = ScrapeOptions {
        skip_cache: request.skip_cache,
        method: request.method,
        ai_model: request.ai_model.clone(),
    };
    match state.service.scrape_job(&request.url, &options).await {
        Ok(job) => Ok(Json(job)),
        Err(e) => {
            error!("scrape failed for {}: {}", request.url, e);
            Err(error_response(e))
        }
    }
}

async fn can_scrape_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CanScrapeRequest>,
) -> Json<CanScrapeResponse> {
    Json(state.service.can_scrape(&request.url))
}

async fn domains_handler(State(state): State<Arc<AppState>>) -> Json<SupportedDomainsResponse> {
    Json(SupportedDomainsResponse {
        domains: state.service.supported_domains(),
    })
}

async fn cache_stats_handler(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.service.cache_stats())
}

async fn cache_clear_handler(State(state): State<Arc<AppState>>) -> Json<ClearCacheResponse> {
    state.service.clear_cache();
    Json(ClearCacheResponse { success: true })
}
