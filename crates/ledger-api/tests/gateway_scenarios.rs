//! 접근 게이트웨이 시나리오 테스트.
//!
//! 실제 라우터에 게이트를 걸고 핸들러 호출 횟수와 저장소 조회 횟수를 관찰합니다.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::Response,
    routing::get,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use ledger_api::{
    create_api_router, require_account_owner, AccessGateway, AppState, TokenService,
};
use ledger_core::{Account, AccountStore, LedgerResult, MemoryAccountStore, Transfer};
use secrecy::SecretString;
use tower::ServiceExt;

const SECRET: &str = "integration-secret-for-gateway-scenarios";

/// 조회 횟수를 세는 저장소 래퍼.
#[derive(Default)]
struct CountingStore {
    inner: MemoryAccountStore,
    lookups: AtomicUsize,
}

impl CountingStore {
    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for CountingStore {
    async fn create_account(&self, account: Account) -> LedgerResult<Account> {
        self.inner.create_account(account).await
    }

    async fn get_account_by_id(&self, id: i64) -> LedgerResult<Account> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_account_by_id(id).await
    }

    async fn get_account_by_number(&self, number: i64) -> LedgerResult<Account> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_account_by_number(number).await
    }

    async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        self.inner.list_accounts().await
    }

    async fn delete_account(&self, id: i64) -> LedgerResult<()> {
        self.inner.delete_account(id).await
    }

    async fn update_account(&self, account: &Account) -> LedgerResult<()> {
        self.inner.update_account(account).await
    }

    async fn transfer(&self, from_id: i64, to_number: i64, amount: i64) -> LedgerResult<Transfer> {
        self.inner.transfer(from_id, to_number, amount).await
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

struct Fixture {
    store: Arc<CountingStore>,
    tokens: TokenService,
    calls: Arc<AtomicUsize>,
    app: Router,
    owner: Account,
    other: Account,
}

fn token_service(secret: &str) -> TokenService {
    TokenService::new(&SecretString::new(secret.into()), Duration::minutes(15))
}

/// 게이트 뒤에 호출 횟수만 세는 핸들러를 둔 라우터.
async fn fixture() -> Fixture {
    let store = Arc::new(CountingStore::default());
    let owner = store
        .create_account(Account::with_number("Alice", "Kim", "hash", 49838).unwrap())
        .await
        .unwrap();
    let other = store
        .create_account(Account::with_number("Bob", "Lee", "hash", 636918).unwrap())
        .await
        .unwrap();

    let tokens = token_service(SECRET);
    let gateway = AccessGateway::new(tokens.clone(), store.clone());

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let app = Router::new()
        .route(
            "/account/{id}",
            get(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    "handled"
                }
            }),
        )
        .route_layer(middleware::from_fn_with_state(gateway, require_account_owner));

    Fixture {
        store,
        tokens,
        calls,
        app,
        owner,
        other,
    }
}

fn get_account(id: i64, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(format!("/account/{}", id));
    if let Some(token) = token {
        builder = builder.header("x-jwt-token", token);
    }
    builder.body(Body::empty()).unwrap()
}

async fn assert_denied(response: Response) {
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], br#"{"error":"permission denied"}"#);
}

#[tokio::test]
async fn owner_token_invokes_handler_once() {
    let f = fixture().await;
    let token = f.tokens.issue(&f.owner).unwrap();

    let response = f
        .app
        .oneshot(get_account(f.owner.id, Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(f.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn token_for_other_account_is_denied() {
    let f = fixture().await;
    let token = f.tokens.issue(&f.owner).unwrap();

    let response = f
        .app
        .oneshot(get_account(f.other.id, Some(&token)))
        .await
        .unwrap();

    assert_denied(response).await;
    assert_eq!(f.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_or_empty_header_is_denied() {
    let f = fixture().await;

    for token in [None, Some("")] {
        let response = f
            .app
            .clone()
            .oneshot(get_account(f.owner.id, token))
            .await
            .unwrap();
        assert_denied(response).await;
    }

    assert_eq!(f.calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.store.lookups(), 0);
}

#[tokio::test]
async fn expired_token_never_reaches_store() {
    let f = fixture().await;
    let token = f
        .tokens
        .issue_at(&f.owner, Utc::now() - Duration::hours(2))
        .unwrap();

    let response = f
        .app
        .oneshot(get_account(f.owner.id, Some(&token)))
        .await
        .unwrap();

    assert_denied(response).await;
    assert_eq!(f.calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.store.lookups(), 0);
}

#[tokio::test]
async fn token_from_other_secret_is_denied() {
    let f = fixture().await;
    let token = token_service("another-secret-entirely-different")
        .issue(&f.owner)
        .unwrap();

    let response = f
        .app
        .oneshot(get_account(f.owner.id, Some(&token)))
        .await
        .unwrap();

    assert_denied(response).await;
    assert_eq!(f.store.lookups(), 0);
}

#[tokio::test]
async fn unsigned_token_is_denied() {
    let f = fixture().await;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(
        format!(
            r#"{{"accountNumber":{},"expiresAt":{}}}"#,
            f.owner.number,
            (Utc::now() + Duration::hours(1)).timestamp()
        )
        .as_bytes(),
    );
    let token = format!("{}.{}.", header, claims);

    let response = f
        .app
        .oneshot(get_account(f.owner.id, Some(&token)))
        .await
        .unwrap();

    assert_denied(response).await;
    assert_eq!(f.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_or_malformed_id_is_denied() {
    let f = fixture().await;
    let token = f.tokens.issue(&f.owner).unwrap();

    let response = f
        .app
        .clone()
        .oneshot(get_account(9_999, Some(&token)))
        .await
        .unwrap();
    assert_denied(response).await;

    let request = Request::builder()
        .uri("/account/not-a-number")
        .header("x-jwt-token", &token)
        .body(Body::empty())
        .unwrap();
    let response = f.app.oneshot(request).await.unwrap();
    assert_denied(response).await;

    assert_eq!(f.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn deleted_account_token_stops_working() {
    let f = fixture().await;
    let token = f.tokens.issue(&f.owner).unwrap();

    f.store.delete_account(f.owner.id).await.unwrap();

    let response = f
        .app
        .oneshot(get_account(f.owner.id, Some(&token)))
        .await
        .unwrap();
    assert_denied(response).await;
}

#[tokio::test]
async fn full_router_login_then_access() {
    let store: Arc<dyn AccountStore> = Arc::new(MemoryAccountStore::new());
    let account = store
        .create_account(ledger_api::construct_account("parteeek", "kumar", "hunter88888").unwrap())
        .await
        .unwrap();

    let state = AppState::new(Arc::clone(&store), token_service(SECRET));
    let app = create_api_router(state.gateway.clone()).with_state(Arc::new(state));

    let login = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from(format!(
            r#"{{"number":{},"password":"hunter88888"}}"#,
            account.number
        )))
        .unwrap();
    let response = app.clone().oneshot(login).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let login: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let token = login["token"].as_str().unwrap().to_string();
    assert_eq!(token.split('.').count(), 3);

    let response = app
        .oneshot(get_account(account.id, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let fetched: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched["number"], account.number);
    assert_eq!(fetched["firstName"], "parteeek");
}
