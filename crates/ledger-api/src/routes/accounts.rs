//! 계좌 endpoint.
//!
//! # 엔드포인트
//!
//! | 메서드 | 경로 | 게이트 |
//! |---|---|---|
//! | GET | `/account` | - |
//! | POST | `/account` | - |
//! | GET | `/account/{id}` | 소유자 |
//! | DELETE | `/account/{id}` | 소유자 |
//! | POST | `/account/{id}/transfer` | 소유자 |

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use ledger_core::{Account, LedgerError, LedgerResult, Transfer};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{
    hash_password, require_account_owner, AccessGateway, PasswordError,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 계좌 생성 요청.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// 이체 요청.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// 입금 계좌번호
    pub to_account: i64,
    pub amount: i64,
}

/// 계좌 삭제 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAccountResponse {
    pub deleted: i64,
}

/// 평문 비밀번호로 새 계좌 구성.
///
/// 비밀번호를 Argon2로 해싱한 뒤 무작위 계좌번호를 가진 계좌를 만듭니다.
/// 저장은 하지 않습니다.
///
/// # Errors
///
/// - 이름/성/비밀번호가 비어 있으면 `LedgerError::InvalidInput`
/// - 해싱 실패 시 `LedgerError::Internal`
pub fn construct_account(
    first_name: &str,
    last_name: &str,
    password: &str,
) -> LedgerResult<Account> {
    let hash = hash_password(password).map_err(|err| match err {
        PasswordError::Empty => LedgerError::InvalidInput("비밀번호가 비어 있습니다".to_string()),
        other => LedgerError::Internal(other.to_string()),
    })?;

    Account::new(first_name, last_name, hash)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

// ==================== 핸들러 ====================

/// 전체 계좌 목록.
///
/// GET /account
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Account>>> {
    let accounts = state.store.list_accounts().await?;
    Ok(Json(accounts))
}

/// 계좌 생성.
///
/// POST /account
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<Json<Account>> {
    let request = json_body(payload)?;

    let account = construct_account(&request.first_name, &request.last_name, &request.password)?;
    let account = state.store.create_account(account).await?;

    info!(id = account.id, number = account.number, "계좌 생성");
    Ok(Json(account))
}

/// 계좌 조회.
///
/// GET /account/{id}
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Account>> {
    let account = state.store.get_account_by_id(id).await?;
    Ok(Json(account))
}

/// 계좌 삭제.
///
/// DELETE /account/{id}
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteAccountResponse>> {
    state.store.delete_account(id).await?;

    info!(id, "계좌 삭제");
    Ok(Json(DeleteAccountResponse { deleted: id }))
}

/// 경로의 계좌에서 다른 계좌번호로 이체.
///
/// POST /account/{id}/transfer
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<Json<Transfer>> {
    let request = json_body(payload)?;

    let transfer = state
        .store
        .transfer(id, request.to_account, request.amount)
        .await?;

    info!(
        from = transfer.from_account,
        to = transfer.to_account,
        amount = transfer.amount,
        "이체"
    );
    Ok(Json(transfer))
}

/// 계좌 라우터 생성.
///
/// `{id}` 경로는 모두 게이트를 거칩니다.
pub fn accounts_router(gateway: AccessGateway) -> Router<Arc<AppState>> {
    let owner_only = Router::new()
        .route("/account/{id}", get(get_account).delete(delete_account))
        .route("/account/{id}/transfer", post(transfer))
        .route_layer(middleware::from_fn_with_state(gateway, require_account_owner));

    Router::new()
        .route("/account", get(list_accounts).post(create_account))
        .merge(owner_only)
}
