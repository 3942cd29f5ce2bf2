//! 계좌 토큰 발급 및 검증.
//!
//! HS256으로 서명된 JWT에 계좌번호와 만료 시각을 담습니다.
//!
//! ```text
//! header : {"typ":"JWT","alg":"HS256"}
//! claims : {"accountNumber":49838,"expiresAt":1767225600}
//! ```
//!
//! 검증 시 헤더의 알고리즘을 HS256으로 고정하므로 `none`이나 비대칭 알고리즘을
//! 선언한 토큰은 서명 검증 전에 거부됩니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ledger_core::Account;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 발급/검증에 사용하는 유일한 서명 알고리즘.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// 토큰 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// 토큰이 발급된 계좌번호
    pub account_number: i64,
    /// 만료 시각 (Unix timestamp, 초)
    pub expires_at: i64,
}

impl Claims {
    /// 계좌에 대한 Claims 생성.
    ///
    /// # Errors
    ///
    /// 만료 시각이 표현 범위를 넘으면 `TokenError::TtlOutOfRange`
    pub fn for_account(
        account: &Account,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenError::TtlOutOfRange(ttl.num_seconds()))?;

        Ok(Self {
            account_number: account.number,
            expires_at: expires_at.timestamp(),
        })
    }

    /// `now` 시점에 만료되었는지 확인. 만료 시각과 같으면 만료로 봅니다.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp()
    }
}

/// 토큰 처리 에러.
///
/// 게이트웨이는 이 구분을 로그에만 남기고 클라이언트에는 노출하지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
    #[error("유효하지 않은 토큰")]
    Invalid,
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("토큰 유효 시간이 범위를 벗어났습니다: {0}초")]
    TtlOutOfRange(i64),
}

/// 토큰 발급/검증 서비스.
///
/// 비밀 키와 유효 시간만 보관하는 불변 값이므로 복제해서 여러 요청에서 공유합니다.
/// 현재 시각은 `*_at` 메서드로 주입할 수 있습니다.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// 서명 + 알고리즘 검증
    strict: Validation,
    /// 서명 검증 없이 Claims만 읽기 (만료 판정용)
    peek: Validation,
    ttl: Duration,
}

impl TokenService {
    /// 새 토큰 서비스 생성.
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC 비밀 키
    /// * `ttl` - 발급 토큰 유효 시간
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();

        // 만료는 expiresAt으로 직접 판정하므로 표준 exp 클레임은 요구하지 않음
        let mut strict = Validation::new(TOKEN_ALGORITHM);
        strict.validate_exp = false;
        strict.required_spec_claims.clear();
        strict.leeway = 0;

        let mut peek = strict.clone();
        peek.insecure_disable_signature_validation();

        Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            strict,
            peek,
            ttl,
        }
    }

    /// 토큰 유효 시간.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 현재 시각 기준으로 토큰 발급.
    pub fn issue(&self, account: &Account) -> Result<String, TokenError> {
        self.issue_at(account, Utc::now())
    }

    /// `now` 시각 기준으로 토큰 발급.
    pub fn issue_at(&self, account: &Account, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::for_account(account, now, self.ttl)?;
        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    /// 현재 시각 기준으로 토큰 검증.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// `now` 시각 기준으로 토큰 검증.
    ///
    /// 만료된 토큰은 서명 유효 여부와 관계없이 `Expired`를 반환합니다.
    ///
    /// # Errors
    ///
    /// - `TokenError::Invalid`: 형식 오류, 허용되지 않은 알고리즘, 서명 불일치
    /// - `TokenError::Expired`: `expiresAt <= now`
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let unverified = decode::<Claims>(token, &self.decoding_key, &self.peek)
            .map_err(|e| {
                debug!(error = %e, "토큰 디코딩 실패");
                TokenError::Invalid
            })?
            .claims;

        if unverified.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        let verified = decode::<Claims>(token, &self.decoding_key, &self.strict)
            .map_err(|e| {
                debug!(error = %e, "토큰 서명 검증 실패");
                TokenError::Invalid
            })?
            .claims;

        Ok(verified)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &TOKEN_ALGORITHM)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}
