//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/login` - 토큰 발급
//! - `/account` - 계좌 목록/생성
//! - `/account/{id}` - 계좌 조회/삭제 (소유자 전용)
//! - `/account/{id}/transfer` - 이체 (소유자 전용)

pub mod accounts;
pub mod health;
pub mod login;

pub use accounts::{
    accounts_router, construct_account, CreateAccountRequest, DeleteAccountResponse,
    TransferRequest,
};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use login::{login_router, LoginRequest, LoginResponse};

use axum::Router;
use std::sync::Arc;

use crate::auth::AccessGateway;
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 소유자 전용 라우트에는 `gateway`가 미들웨어로 적용됩니다.
pub fn create_api_router(gateway: AccessGateway) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .merge(login_router())
        .merge(accounts_router(gateway))
}
