//! 원장 시스템의 에러 타입.
//!
//! 계좌 생성, 저장소 조회, 이체 과정에서 발생하는 에러를 정의합니다.
//! 인증 관련 에러(토큰, 접근 거부)는 API 크레이트에서 별도로 정의합니다.

use thiserror::Error;

/// 핵심 원장 에러.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// 잘못된 입력 (빈 이름, 빈 비밀번호, 0 이하 금액 등)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 이미 사용 중인 계좌번호
    #[error("이미 사용 중인 계좌번호: {0}")]
    DuplicateNumber(i64),

    /// 잔고 부족
    #[error("잔고 부족: 잔고 {balance}, 요청 {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },

    /// 저장소 에러 (연결 실패, 타임아웃 등)
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 원장 작업을 위한 Result 타입.
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// ID로 계좌를 찾지 못한 경우의 에러.
    pub fn account_id_not_found(id: i64) -> Self {
        LedgerError::NotFound(format!("계좌 ID {}", id))
    }

    /// 계좌번호로 계좌를 찾지 못한 경우의 에러.
    pub fn account_number_not_found(number: i64) -> Self {
        LedgerError::NotFound(format!("계좌번호 {}", number))
    }

    /// 조회 실패(NotFound)인지 확인합니다.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound(_))
    }

    /// 호출자의 입력 문제로 발생한 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidInput(_)
                | LedgerError::NotFound(_)
                | LedgerError::DuplicateNumber(_)
                | LedgerError::InsufficientFunds { .. }
        )
    }
}

impl From<config::ConfigError> for LedgerError {
    fn from(err: config::ConfigError) -> Self {
        LedgerError::Config(err.to_string())
    }
}
