//! API 에러 응답.
//!
//! 게이트웨이 거부를 제외한 모든 엔드포인트 에러는 다음 형식을 사용합니다.
//!
//! ```json
//! { "error": "계좌를 찾을 수 없습니다: id=42" }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ledger_core::LedgerError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// 에러 응답 본문.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

/// 상태 코드가 붙은 API 에러.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse {
                error: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 내부 에러. 상세 내용은 로그에만 남기고 응답에는 일반 메시지를 보냅니다.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        error!(error = %err, "내부 에러");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }

    pub fn message(&self) -> &str {
        &self.body.error
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.body.error)
    }
}

impl std::error::Error for ApiError {}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match &err {
            LedgerError::InvalidInput(_) | LedgerError::InsufficientFunds { .. } => {
                Self::bad_request(err.to_string())
            }
            LedgerError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            LedgerError::DuplicateNumber(_) => Self::new(StatusCode::CONFLICT, err.to_string()),
            LedgerError::Storage(_) | LedgerError::Config(_) | LedgerError::Internal(_) => {
                Self::internal(err)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
///
/// ```rust,ignore
/// async fn get_account(State(state): State<Arc<AppState>>) -> ApiResult<Json<Account>> {
///     let account = state.store.get_account_by_id(id).await?;
///     Ok(Json(account))
/// }
/// ```
pub type ApiResult<T> = Result<T, ApiError>;
