//! 로그인 endpoint.
//!
//! 계좌번호와 비밀번호를 확인하고 세션 토큰을 발급합니다.
//! 계좌가 없거나 비밀번호가 틀리면 게이트 거부와 같은 403 응답을 반환합니다.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{permission_denied, verify_decoy, verify_password};
use crate::error::ApiError;
use crate::metrics::{record_login, record_token_issued};
use crate::state::AppState;

/// 로그인 요청.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub number: i64,
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub number: i64,
    pub token: String,
}

/// 토큰 발급.
///
/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return ApiError::bad_request(rejection.body_text()).into_response(),
    };

    let account = match state.store.get_account_by_number(request.number).await {
        Ok(account) => account,
        Err(err) => {
            warn!(number = request.number, error = %err, "로그인 실패: 계좌 조회");
            verify_decoy(&request.password);
            record_login(false);
            return permission_denied();
        }
    };

    match verify_password(&request.password, &account.encrypted_password) {
        Ok(true) => {}
        Ok(false) => {
            warn!(number = request.number, "로그인 실패: 비밀번호 불일치");
            record_login(false);
            return permission_denied();
        }
        Err(err) => {
            warn!(number = request.number, error = %err, "로그인 실패: 저장된 해시 손상");
            record_login(false);
            return permission_denied();
        }
    }

    match state.tokens.issue(&account) {
        Ok(token) => {
            info!(number = account.number, "토큰 발급");
            record_login(true);
            record_token_issued();
            Json(LoginResponse {
                number: account.number,
                token,
            })
            .into_response()
        }
        Err(err) => ApiError::internal(err).into_response(),
    }
}

/// 로그인 라우터 생성.
pub fn login_router() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::construct_account;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use ledger_core::Account;
    use tower::ServiceExt;

    async fn setup() -> (Router, AppState, Account) {
        let state = create_test_state();
        let account = state
            .store
            .create_account(construct_account("parteeek", "kumar", "hunter88888").unwrap())
            .await
            .unwrap();
        let app = login_router().with_state(Arc::new(state.clone()));
        (app, state, account)
    }

    fn login_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/login")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_issues_token() {
        let (app, state, account) = setup().await;

        let response = app
            .oneshot(login_request(format!(
                r#"{{"number":{},"password":"hunter88888"}}"#,
                account.number
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let login: LoginResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(login.number, account.number);
        let claims = state.tokens.validate(&login.token).unwrap();
        assert_eq!(claims.account_number, account.number);
    }

    #[tokio::test]
    async fn test_wrong_password_denied() {
        let (app, _, account) = setup().await;

        let response = app
            .oneshot(login_request(format!(
                r#"{{"number":{},"password":"wrong"}}"#,
                account.number
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"error":"permission denied"}"#);
    }

    #[tokio::test]
    async fn test_unknown_number_denied() {
        let (app, _, _) = setup().await;

        let response = app
            .oneshot(login_request(
                r#"{"number":1,"password":"hunter88888"}"#.to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"error":"permission denied"}"#);
    }

    #[tokio::test]
    async fn test_unknown_number_pays_hash_cost() {
        let (app, _, account) = setup().await;

        // decoy 해시 생성 비용을 미리 치름
        verify_decoy("warmup");

        let started = std::time::Instant::now();
        verify_password("wrong", &account.encrypted_password).unwrap();
        let hash_cost = started.elapsed();

        let started = std::time::Instant::now();
        let response = app
            .oneshot(login_request(r#"{"number":1,"password":"wrong"}"#.to_string()))
            .await
            .unwrap();
        let unknown_cost = started.elapsed();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(
            unknown_cost * 4 >= hash_cost,
            "unknown number answered in {:?}, hash check takes {:?}",
            unknown_cost,
            hash_cost
        );
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (app, _, _) = setup().await;

        let response = app
            .oneshot(login_request(r#"{"number":"abc"}"#.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
