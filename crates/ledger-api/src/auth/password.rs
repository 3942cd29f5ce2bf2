//! 계좌 비밀번호 해싱.
//!
//! Argon2id + 무작위 솔트로 해싱하고 PHC 문자열로 저장합니다.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 존재하지 않는 계좌에 대한 로그인 시 비교 대상으로 쓰는 비밀번호.
const DECOY_PASSWORD: &str = "ledger-decoy-password";

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호가 비어 있습니다")]
    Empty,
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 평문 비밀번호를 PHC 형식 해시로 변환.
///
/// 같은 비밀번호라도 호출마다 다른 솔트가 사용됩니다.
///
/// ```rust,ignore
/// let hash = hash_password("hunter88888")?;
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

/// 저장된 해시와 비밀번호 비교.
///
/// 일치하면 `Ok(true)`, 불일치하면 `Ok(false)`.
/// 해시 문자열 자체가 손상된 경우에만 에러를 반환합니다.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// 실제 계좌와 같은 파라미터로 만든 decoy 해시. 최초 호출 시 한 번 생성합니다.
fn decoy_hash() -> Option<&'static str> {
    static DECOY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DECOY_HASH
        .get_or_init(|| hash_password(DECOY_PASSWORD).ok())
        .as_deref()
}

/// 계좌가 없을 때 호출하는 검증.
///
/// 비밀번호 불일치와 같은 Argon2 비용을 치르고, 입력과 관계없이 항상 `false`를
/// 반환합니다. 응답 시간으로 계좌번호 존재 여부가 드러나지 않게 합니다.
pub fn verify_decoy(password: &str) -> bool {
    if let Some(hash) = decoy_hash() {
        let _ = verify_password(password, hash);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter88888").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter88888", &hash).unwrap());
        assert!(!verify_password("hunter99999", &hash).unwrap());
    }

    #[test]
    fn test_salted_hashes_differ() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("same-password", &first).unwrap());
        assert!(verify_password("same-password", &second).unwrap());
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(hash_password(""), Err(PasswordError::Empty)));
    }

    #[test]
    fn test_corrupted_hash() {
        assert!(matches!(
            verify_password("password", "not-a-valid-hash"),
            Err(PasswordError::InvalidHashFormat)
        ));
    }

    #[test]
    fn test_decoy_never_matches() {
        assert!(!verify_decoy("hunter88888"));
        assert!(!verify_decoy(DECOY_PASSWORD));
        assert!(!verify_decoy(""));
    }

    #[test]
    fn test_decoy_uses_account_hash_params() {
        let decoy = PasswordHash::new(decoy_hash().unwrap()).unwrap();
        let real_hash = hash_password("hunter88888").unwrap();
        let real = PasswordHash::new(&real_hash).unwrap();

        assert_eq!(decoy.algorithm, real.algorithm);
        assert_eq!(decoy.params, real.params);
    }
}
