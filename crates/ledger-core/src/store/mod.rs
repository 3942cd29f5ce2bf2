//! 계좌 저장소 추상화.
//!
//! 인증 게이트웨이와 토큰 발급 흐름이 의존하는 저장소 계약을 정의합니다.
//! 실제 저장 엔진(PostgreSQL 등)은 이 trait를 구현하는 쪽의 책임입니다.
//!
//! # 구현체
//!
//! - [`MemoryAccountStore`]: 테스트/개발용 인메모리 저장소
//! - `PgAccountStore` (ledger-api): PostgreSQL 저장소

mod memory;

pub use memory::MemoryAccountStore;

use async_trait::async_trait;

use crate::domain::{Account, Transfer};
use crate::error::LedgerResult;

/// 계좌 저장소 trait.
///
/// 구현체는 동시 읽기를 안전하게 처리하고, 같은 계좌에 대한 동시 쓰기를 직렬화해야 합니다.
/// 한 번 부여된 ID와 계좌번호는 삭제 후에도 다른 계좌에 재사용되지 않습니다.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// 계좌 저장.
    ///
    /// 새 ID를 부여하고 저장된 계좌를 반환합니다.
    ///
    /// # Errors
    ///
    /// - `LedgerError::DuplicateNumber`: 계좌번호가 이미 사용 중(또는 사용된 적 있음)
    /// - `LedgerError::Storage`: 저장소 장애
    async fn create_account(&self, account: Account) -> LedgerResult<Account>;

    /// ID로 계좌 조회.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NotFound`: 해당 ID의 계좌가 없음
    async fn get_account_by_id(&self, id: i64) -> LedgerResult<Account>;

    /// 계좌번호로 계좌 조회.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NotFound`: 해당 번호의 계좌가 없음
    async fn get_account_by_number(&self, number: i64) -> LedgerResult<Account>;

    /// 전체 계좌 목록 (ID 오름차순).
    async fn list_accounts(&self) -> LedgerResult<Vec<Account>>;

    /// 계좌 삭제.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NotFound`: 해당 ID의 계좌가 없음
    async fn delete_account(&self, id: i64) -> LedgerResult<()>;

    /// 계좌 갱신.
    ///
    /// 이름과 잔고만 갱신됩니다. ID와 계좌번호는 변경되지 않습니다.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NotFound`: 해당 ID의 계좌가 없음
    async fn update_account(&self, account: &Account) -> LedgerResult<()>;

    /// 계좌 간 이체.
    ///
    /// 출금과 입금은 원자적으로 반영됩니다.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidInput`: 0 이하 금액, 자기 자신에게 이체
    /// - `LedgerError::InsufficientFunds`: 잔고 부족
    /// - `LedgerError::NotFound`: 출금 또는 입금 계좌 없음
    async fn transfer(&self, from_id: i64, to_number: i64, amount: i64) -> LedgerResult<Transfer>;

    /// 저장소 연결 상태 확인.
    async fn health_check(&self) -> bool {
        true
    }

    /// 저장소 이름 (로그/헬스 체크용).
    fn backend_name(&self) -> &'static str;
}
