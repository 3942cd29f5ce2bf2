//! 계좌 접근 게이트웨이.
//!
//! `/account/{id}` 처럼 계좌 ID를 경로에 담는 보호 라우트 앞에서 동작하는
//! Axum 미들웨어입니다. 요청마다 다음 순서로 진행하며, 어느 단계에서든 실패하면
//! 같은 403 응답으로 거부합니다.
//!
//! ```text
//! Start ─▶ TokenExtracted ─▶ TokenValidated ─▶ IdentityResolved ─▶ Authorized
//!   │            │                 │                  │
//!   └────────────┴─────────────────┴──────────────────┴──────────▶ Denied
//! ```
//!
//! 1. 토큰 헤더(`x-jwt-token`) 추출
//! 2. [`TokenService`]로 서명/만료 검증
//! 3. 경로의 `{id}`를 정수로 파싱하고 저장소에서 계좌 조회
//! 4. 계좌의 번호와 토큰의 `accountNumber` 비교
//!
//! 검증된 토큰이나 조회한 계좌는 캐시하지 않습니다. 삭제되거나 변경된 계좌는
//! 다음 요청에서 바로 반영됩니다.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path, Request, State},
    http::{header::InvalidHeaderName, HeaderMap, HeaderName, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use ledger_core::{Account, AccountStore, LedgerError};
use serde_json::json;
use tracing::{debug, warn};

use super::token::{TokenError, TokenService};
use crate::metrics::{record_access_authorized, record_access_denied};

/// 토큰을 전달하는 기본 헤더.
pub use ledger_core::DEFAULT_TOKEN_HEADER as TOKEN_HEADER;

/// 거부 응답 메시지. 거부 사유와 관계없이 동일합니다.
pub const DENIED_MESSAGE: &str = "permission denied";

/// 요청 하나에 대한 게이트 진행 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStage {
    Start,
    TokenExtracted,
    TokenValidated,
    IdentityResolved,
    Authorized,
    Denied,
}

impl GateStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateStage::Start => "start",
            GateStage::TokenExtracted => "token_extracted",
            GateStage::TokenValidated => "token_validated",
            GateStage::IdentityResolved => "identity_resolved",
            GateStage::Authorized => "authorized",
            GateStage::Denied => "denied",
        }
    }
}

/// 접근 거부 사유.
///
/// 로그와 테스트에서는 구분되지만 클라이언트에는 항상 같은 응답이 나갑니다.
#[derive(Debug, thiserror::Error)]
pub enum AccessDenied {
    #[error("토큰 헤더가 없습니다")]
    MissingToken,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    #[error("만료된 토큰")]
    ExpiredToken,
    #[error("잘못된 계좌 ID: {0:?}")]
    BadIdentity(String),
    #[error("계좌 조회 실패: {0}")]
    AccountUnavailable(#[source] LedgerError),
    #[error("토큰 계좌번호 불일치 (토큰 {claimed}, 계좌 {actual})")]
    IdentityMismatch { claimed: i64, actual: i64 },
}

impl AccessDenied {
    /// 메트릭 라벨용 사유 코드.
    pub fn reason(&self) -> &'static str {
        match self {
            AccessDenied::MissingToken => "missing_token",
            AccessDenied::InvalidToken => "invalid_token",
            AccessDenied::ExpiredToken => "expired_token",
            AccessDenied::BadIdentity(_) => "bad_identity",
            AccessDenied::AccountUnavailable(_) => "account_unavailable",
            AccessDenied::IdentityMismatch { .. } => "identity_mismatch",
        }
    }

    /// 거부 직전에 도달해 있던 단계.
    pub fn stage(&self) -> GateStage {
        match self {
            AccessDenied::MissingToken => GateStage::Start,
            AccessDenied::InvalidToken | AccessDenied::ExpiredToken => GateStage::TokenExtracted,
            AccessDenied::BadIdentity(_) | AccessDenied::AccountUnavailable(_) => {
                GateStage::TokenValidated
            }
            AccessDenied::IdentityMismatch { .. } => GateStage::IdentityResolved,
        }
    }
}

impl From<TokenError> for AccessDenied {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AccessDenied::ExpiredToken,
            TokenError::Invalid | TokenError::Encoding(_) | TokenError::TtlOutOfRange(_) => {
                AccessDenied::InvalidToken
            }
        }
    }
}

impl IntoResponse for AccessDenied {
    fn into_response(self) -> Response {
        permission_denied()
    }
}

/// 고정 형태의 403 응답.
pub fn permission_denied() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": DENIED_MESSAGE })),
    )
        .into_response()
}

/// 토큰 검증과 계좌 대조를 수행하는 게이트웨이.
///
/// 불변 토큰 서비스와 저장소 핸들만 가지므로 복제해서 미들웨어 상태로 사용합니다.
#[derive(Clone)]
pub struct AccessGateway {
    tokens: TokenService,
    store: Arc<dyn AccountStore>,
    header: HeaderName,
}

impl AccessGateway {
    /// 기본 헤더(`x-jwt-token`)를 사용하는 게이트웨이 생성.
    pub fn new(tokens: TokenService, store: Arc<dyn AccountStore>) -> Self {
        Self {
            tokens,
            store,
            header: HeaderName::from_static(TOKEN_HEADER),
        }
    }

    /// 토큰 헤더 이름 변경.
    ///
    /// # Errors
    ///
    /// 헤더 이름으로 쓸 수 없는 문자열이면 `InvalidHeaderName`
    pub fn with_header(mut self, name: &str) -> Result<Self, InvalidHeaderName> {
        self.header = HeaderName::try_from(name.trim().to_ascii_lowercase())?;
        Ok(self)
    }

    /// 토큰 헤더 이름.
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// 요청 헤더에서 토큰 문자열 추출.
    ///
    /// 헤더가 없거나, 비어 있거나, UTF-8이 아니면 `None`.
    pub fn extract_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get(&self.header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// 접근 허용 여부 판정.
    ///
    /// # Arguments
    ///
    /// * `token` - 요청 헤더의 토큰 (없으면 `None`)
    /// * `raw_id` - 경로의 계좌 ID 문자열 (없으면 `None`)
    /// * `now` - 만료 판정 기준 시각
    ///
    /// # Returns
    ///
    /// 허용되면 경로가 가리키는 계좌, 거부되면 거부 사유
    pub async fn authorize(
        &self,
        token: Option<&str>,
        raw_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Account, AccessDenied> {
        // Start → TokenExtracted
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AccessDenied::MissingToken)?;

        // TokenExtracted → TokenValidated
        let claims = self.tokens.validate_at(token, now)?;

        // TokenValidated → IdentityResolved
        let raw_id = raw_id.unwrap_or_default();
        let id: i64 = raw_id
            .trim()
            .parse()
            .map_err(|_| AccessDenied::BadIdentity(raw_id.to_string()))?;
        let account = self
            .store
            .get_account_by_id(id)
            .await
            .map_err(AccessDenied::AccountUnavailable)?;

        // IdentityResolved → Authorized | Denied
        if account.number != claims.account_number {
            return Err(AccessDenied::IdentityMismatch {
                claimed: claims.account_number,
                actual: account.number,
            });
        }

        Ok(account)
    }
}

impl std::fmt::Debug for AccessGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGateway")
            .field("tokens", &self.tokens)
            .field("store", &self.store.backend_name())
            .field("header", &self.header)
            .finish()
    }
}

/// 계좌 소유자만 통과시키는 미들웨어.
///
/// `{id}` 경로 파라미터가 있는 라우트에 `route_layer`로 적용합니다.
/// 허용된 요청은 원본 그대로 다음 핸들러로 전달됩니다.
///
/// ```rust,ignore
/// Router::new()
///     .route("/account/{id}", get(get_account))
///     .route_layer(middleware::from_fn_with_state(gateway, require_account_owner))
/// ```
pub async fn require_account_owner(
    State(gateway): State<AccessGateway>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    // Path 추출은 extensions를 읽기만 하므로 요청은 변하지 않음
    let raw_id = Path::<HashMap<String, String>>::from_request_parts(&mut parts, &())
        .await
        .ok()
        .and_then(|Path(mut params)| params.remove("id"));
    let token = gateway.extract_token(&parts.headers);

    let decision = gateway.authorize(token, raw_id.as_deref(), Utc::now()).await;

    let path = parts.uri.path().to_string();
    match decision {
        Ok(account) => {
            debug!(
                path = %path,
                account_id = account.id,
                stage = GateStage::Authorized.as_str(),
                "계좌 접근 허용"
            );
            record_access_authorized();
            next.run(Request::from_parts(parts, body)).await
        }
        Err(denied) => {
            warn!(
                path = %path,
                reason = denied.reason(),
                stage = denied.stage().as_str(),
                error = %denied,
                "계좌 접근 거부"
            );
            record_access_denied(denied.reason());
            denied.into_response()
        }
    }
}
