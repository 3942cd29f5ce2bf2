//! 인증 및 계좌 접근 제어.
//!
//! # 구성 요소
//!
//! - [`TokenService`]: 계좌번호를 담은 HS256 토큰 발급/검증
//! - [`hash_password`] / [`verify_password`]: Argon2 비밀번호 해싱
//! - [`AccessGateway`]: 토큰의 계좌번호와 경로의 계좌를 대조하는 게이트
//! - [`require_account_owner`]: 게이트를 Axum 미들웨어로 적용
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/account/{id}", get(get_account))
//!     .route_layer(middleware::from_fn_with_state(gateway, require_account_owner))
//! ```

mod gateway;
mod password;
mod token;

pub use gateway::{
    permission_denied, require_account_owner, AccessDenied, AccessGateway, GateStage,
    DENIED_MESSAGE, TOKEN_HEADER,
};
pub use password::{hash_password, verify_decoy, verify_password, PasswordError};
pub use token::{Claims, TokenError, TokenService, TOKEN_ALGORITHM};
