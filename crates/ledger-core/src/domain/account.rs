//! 계좌 엔티티.
//!
//! 이 모듈은 원장의 신원 레코드인 `Account`를 정의합니다.
//! - `id`: 저장소가 부여하는 순차 ID (내부 식별자)
//! - `number`: 무작위로 생성되는 계좌번호 (토큰에 포함되는 외부 식별자)

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// 계좌번호 하한 (포함).
pub const ACCOUNT_NUMBER_MIN: i64 = 100_000;

/// 계좌번호 상한 (제외).
pub const ACCOUNT_NUMBER_MAX: i64 = 1_000_000_000;

/// 원장 계좌.
///
/// 비밀번호는 해시 형태로만 보관되며 API 응답으로 직렬화되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// 저장소가 부여한 순차 ID (저장 전에는 0)
    pub id: i64,
    /// 이름
    pub first_name: String,
    /// 성
    pub last_name: String,
    /// 계좌번호
    pub number: i64,
    /// Argon2 PHC 형식 비밀번호 해시
    #[serde(skip_serializing, default)]
    pub encrypted_password: String,
    /// 잔고 (최소 화폐 단위)
    pub balance: i64,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// 새 계좌를 생성합니다.
    ///
    /// 계좌번호는 `[ACCOUNT_NUMBER_MIN, ACCOUNT_NUMBER_MAX)` 범위에서 무작위로 생성됩니다.
    /// 번호 중복 검사는 저장소의 `create_account`가 담당합니다.
    ///
    /// # Arguments
    ///
    /// * `first_name` - 이름
    /// * `last_name` - 성
    /// * `password_hash` - 이미 해싱된 비밀번호
    ///
    /// # Errors
    ///
    /// 이름, 성, 비밀번호 해시 중 하나라도 비어 있으면 `LedgerError::InvalidInput`
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> LedgerResult<Self> {
        Self::with_number(first_name, last_name, password_hash, generate_account_number())
    }

    /// 계좌번호를 지정하여 새 계좌를 생성합니다.
    ///
    /// 시드 데이터나 테스트처럼 번호가 미리 정해진 경우에 사용합니다.
    pub fn with_number(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password_hash: impl Into<String>,
        number: i64,
    ) -> LedgerResult<Self> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let password_hash = password_hash.into();

        if first_name.trim().is_empty() {
            return Err(LedgerError::InvalidInput("이름이 비어 있습니다".to_string()));
        }
        if last_name.trim().is_empty() {
            return Err(LedgerError::InvalidInput("성이 비어 있습니다".to_string()));
        }
        if password_hash.is_empty() {
            return Err(LedgerError::InvalidInput(
                "비밀번호가 비어 있습니다".to_string(),
            ));
        }
        if number <= 0 {
            return Err(LedgerError::InvalidInput(format!(
                "계좌번호는 양수여야 합니다: {}",
                number
            )));
        }

        Ok(Self {
            id: 0,
            first_name,
            last_name,
            number,
            encrypted_password: password_hash,
            balance: 0,
            created_at: Utc::now(),
        })
    }

    /// 주어진 금액을 출금할 수 있는지 확인.
    pub fn can_debit(&self, amount: i64) -> bool {
        amount > 0 && self.balance >= amount
    }

    /// 표시용 전체 이름.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// 무작위 계좌번호 생성.
pub fn generate_account_number() -> i64 {
    rand::thread_rng().gen_range(ACCOUNT_NUMBER_MIN..ACCOUNT_NUMBER_MAX)
}
