//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! `Arc<AppState>`로 래핑되어 Axum State extractor를 통해 핸들러에 주입됩니다.

use std::sync::Arc;

use axum::http::header::InvalidHeaderName;
use ledger_core::AccountStore;

use crate::auth::{AccessGateway, TokenService};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 계좌 저장소 (메모리 또는 PostgreSQL)
    pub store: Arc<dyn AccountStore>,

    /// 토큰 발급/검증 서비스
    pub tokens: TokenService,

    /// 보호 라우트용 접근 게이트웨이
    pub gateway: AccessGateway,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// 게이트웨이는 같은 저장소와 토큰 서비스를 공유하며 기본 토큰 헤더를 사용합니다.
    pub fn new(store: Arc<dyn AccountStore>, tokens: TokenService) -> Self {
        let gateway = AccessGateway::new(tokens.clone(), Arc::clone(&store));

        Self {
            store,
            tokens,
            gateway,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 토큰 헤더 이름 변경.
    pub fn with_token_header(mut self, name: &str) -> Result<Self, InvalidHeaderName> {
        self.gateway = self.gateway.with_header(name)?;
        Ok(self)
    }

    /// 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        self.store.health_check().await
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend_name())
            .field("gateway", &self.gateway)
            .field("version", &self.version)
            .finish()
    }
}

/// 테스트용 서명 시크릿.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-ledger-api-tests";

/// 테스트용 AppState 생성 헬퍼.
///
/// 메모리 저장소와 15분 TTL 토큰 서비스로 구성됩니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use ledger_core::MemoryAccountStore;
    use secrecy::SecretString;

    let tokens = TokenService::new(
        &SecretString::new(TEST_JWT_SECRET.into()),
        chrono::Duration::minutes(15),
    );
    AppState::new(Arc::new(MemoryAccountStore::new()), tokens)
}
