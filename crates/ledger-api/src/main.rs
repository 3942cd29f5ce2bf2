//! Ledger API 서버 진입점.
//!
//! # 환경 변수
//!
//! - `LEDGER__SERVER__HOST`, `LEDGER__SERVER__PORT`: 바인드 주소
//! - `LEDGER__DATABASE__URL`: 설정 시 PostgreSQL 저장소 사용 (없으면 메모리)
//! - `LEDGER__AUTH__JWT_SECRET`: 토큰 서명 시크릿
//! - `LEDGER_SEED=1` 또는 `--seed`: 데모 계좌 생성
//! - `RUST_LOG`, `LOG_FORMAT`: 로그 필터/형식
//! - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{HeaderName, StatusCode},
    middleware,
    routing::get,
    Router,
};
use ledger_api::auth::TokenService;
use ledger_api::metrics::setup_metrics_recorder;
use ledger_api::middleware::metrics_layer;
use ledger_api::repository::PgAccountStore;
use ledger_api::routes::{construct_account, create_api_router};
use ledger_api::state::AppState;
use ledger_core::{
    init_logging, AccountStore, AppConfig, DatabaseConfig, LogConfig, MemoryAccountStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use secrecy::SecretString;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// 데모 계좌 (이름, 성, 비밀번호).
const SEED_ACCOUNT: (&str, &str, &str) = ("parteeek", "kumar", "hunter88888");

/// CORS 레이어 설정.
///
/// `CORS_ORIGINS`가 없으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer(token_header: HeaderName) -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                AllowOrigin::list(origins)
            }
        }
        _ => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            token_header,
        ])
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let token_header = state.gateway.header().clone();
    let api_router = create_api_router(state.gateway.clone()).with_state(state);

    Router::new()
        .merge(metrics_router)
        .merge(api_router)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer(token_header))
}

/// 설정에 따라 계좌 저장소 선택.
async fn create_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn AccountStore>> {
    match config.url.as_deref() {
        Some(url) if !url.is_empty() => {
            let store = PgAccountStore::connect(url, config)
                .await
                .context("PostgreSQL 연결 실패")?;
            Ok(Arc::new(store))
        }
        _ => {
            warn!("database.url not set, using in-memory account store");
            Ok(Arc::new(MemoryAccountStore::new()))
        }
    }
}

/// `--seed` 플래그 또는 `LEDGER_SEED` 환경변수 확인.
fn seed_requested() -> bool {
    std::env::args().any(|arg| arg == "--seed")
        || std::env::var("LEDGER_SEED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false)
}

/// 데모 계좌 생성.
async fn seed_accounts(store: &dyn AccountStore) -> anyhow::Result<()> {
    let (first_name, last_name, password) = SEED_ACCOUNT;
    let account = construct_account(first_name, last_name, password)?;
    let account = store.create_account(account).await?;

    info!(
        id = account.id,
        number = account.number,
        "Seeded demo account"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default().context("설정 로드 실패")?;

    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    info!("Starting Ledger API server...");

    let metrics_handle = setup_metrics_recorder().context("Prometheus 레코더 설치 실패")?;

    if config.auth.uses_default_secret() {
        warn!("auth.jwt_secret not set, using default (INSECURE for development only)");
    }
    let token_ttl = chrono::Duration::try_seconds(config.auth.token_ttl_secs)
        .context("auth.token_ttl_secs가 범위를 벗어났습니다")?;
    let tokens = TokenService::new(
        &SecretString::new(config.auth.jwt_secret.clone().into()),
        token_ttl,
    );

    let store = create_store(&config.database).await?;
    if seed_requested() {
        seed_accounts(store.as_ref()).await.context("데모 계좌 생성 실패")?;
    }

    let state = AppState::new(store, tokens)
        .with_token_header(&config.auth.token_header)
        .context("auth.token_header가 유효한 헤더 이름이 아닙니다")?;

    info!(
        version = %state.version,
        store = state.store.backend_name(),
        token_header = state.gateway.header().as_str(),
        token_ttl_secs = config.auth.token_ttl_secs,
        "Application state initialized"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "소켓 주소가 유효하지 않습니다: {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let app = create_router(
        Arc::new(state),
        metrics_handle,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    info!(%addr, "API server listening");
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM을 기다립니다. 핸들러 설치에 실패하면 해당 시그널은 무시합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
