//! 원장 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - 계좌번호를 담은 HS256 세션 토큰 발급/검증
//! - 토큰의 계좌와 경로의 계좌를 대조하는 접근 게이트웨이
//! - PostgreSQL 계좌 저장소
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 토큰, 비밀번호, 접근 게이트웨이
//! - [`repository`]: PostgreSQL 저장소
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{
    hash_password, require_account_owner, verify_password, AccessDenied, AccessGateway,
    Claims, TokenError, TokenService,
};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use repository::PgAccountStore;
pub use routes::*;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, TEST_JWT_SECRET};
