//! Account Repository
//!
//! PostgreSQL 기반 `AccountStore` 구현체입니다.
//!
//! 삭제는 `deleted_at`을 채우는 소프트 삭제로 처리합니다. 행이 남아 있으므로
//! `BIGSERIAL` ID와 `UNIQUE` 계좌번호가 다른 계좌에 재사용되지 않습니다.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ledger_core::{
    apply_transfer, validate_transfer, Account, AccountStore, DatabaseConfig, LedgerError,
    LedgerResult, Transfer,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tracing::{debug, info};

// ================================================================================================
// Types
// ================================================================================================

/// account 테이블 레코드
#[derive(Debug, Clone, FromRow)]
struct AccountRecord {
    id: i64,
    first_name: String,
    last_name: String,
    number: i64,
    encrypted_password: String,
    balance: i64,
    created_at: DateTime<Utc>,
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        Account {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            number: record.number,
            encrypted_password: record.encrypted_password,
            balance: record.balance,
            created_at: record.created_at,
        }
    }
}

const ACCOUNT_COLUMNS: &str =
    "id, first_name, last_name, number, encrypted_password, balance, created_at";

const CREATE_ACCOUNT_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS account (
        id                 BIGSERIAL PRIMARY KEY,
        first_name         VARCHAR(100) NOT NULL,
        last_name          VARCHAR(100) NOT NULL,
        number             BIGINT NOT NULL UNIQUE,
        encrypted_password TEXT NOT NULL,
        balance            BIGINT NOT NULL DEFAULT 0,
        created_at         TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at         TIMESTAMPTZ
    )
"#;

fn storage_error(err: sqlx::Error) -> LedgerError {
    LedgerError::Storage(err.to_string())
}

// ================================================================================================
// Repository
// ================================================================================================

/// PostgreSQL 계좌 저장소
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// 기존 커넥션 풀로 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 설정으로 커넥션 풀을 만들고 스키마를 준비합니다.
    ///
    /// 풀 획득 타임아웃은 요청 단위 저장소 에러로 드러납니다.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> LedgerResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(url)
            .await
            .map_err(storage_error)?;

        let store = Self::new(pool);
        store.init().await?;
        info!(max_connections = config.max_connections, "PostgreSQL 계좌 저장소 연결됨");
        Ok(store)
    }

    /// account 테이블 생성 (없을 때만).
    pub async fn init(&self) -> LedgerResult<()> {
        sqlx::query(CREATE_ACCOUNT_TABLE)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create_account(&self, account: Account) -> LedgerResult<Account> {
        let query = format!(
            r#"
            INSERT INTO account (first_name, last_name, number, encrypted_password, balance, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        let record = sqlx::query_as::<_, AccountRecord>(&query)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(account.number)
            .bind(&account.encrypted_password)
            .bind(account.balance)
            .bind(account.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => {
                    LedgerError::DuplicateNumber(account.number)
                }
                _ => storage_error(err),
            })?;

        debug!(id = record.id, number = record.number, "계좌 생성");
        Ok(record.into())
    }

    async fn get_account_by_id(&self, id: i64) -> LedgerResult<Account> {
        let query =
            format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = $1 AND deleted_at IS NULL");

        sqlx::query_as::<_, AccountRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(Account::from)
            .ok_or_else(|| LedgerError::account_id_not_found(id))
    }

    async fn get_account_by_number(&self, number: i64) -> LedgerResult<Account> {
        let query = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE number = $1 AND deleted_at IS NULL"
        );

        sqlx::query_as::<_, AccountRecord>(&query)
            .bind(number)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(Account::from)
            .ok_or_else(|| LedgerError::account_number_not_found(number))
    }

    async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        let query =
            format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE deleted_at IS NULL ORDER BY id");

        let records = sqlx::query_as::<_, AccountRecord>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(records.into_iter().map(Account::from).collect())
    }

    async fn delete_account(&self, id: i64) -> LedgerResult<()> {
        let result = sqlx::query(
            "UPDATE account SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::account_id_not_found(id));
        }
        debug!(id, "계좌 삭제");
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> LedgerResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE account
            SET first_name = $2, last_name = $3, balance = $4
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(account.id)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.balance)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::account_id_not_found(account.id));
        }
        Ok(())
    }

    async fn transfer(&self, from_id: i64, to_number: i64, amount: i64) -> LedgerResult<Transfer> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        // 두 행을 ID 순서로 잠가 교차 이체 간 교착을 피합니다.
        let query = format!(
            r#"
            SELECT {ACCOUNT_COLUMNS} FROM account
            WHERE (id = $1 OR number = $2) AND deleted_at IS NULL
            ORDER BY id
            FOR UPDATE
            "#
        );
        let locked: Vec<Account> = sqlx::query_as::<_, AccountRecord>(&query)
            .bind(from_id)
            .bind(to_number)
            .fetch_all(&mut *tx)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(Account::from)
            .collect();

        let mut from = locked
            .iter()
            .find(|account| account.id == from_id)
            .cloned()
            .ok_or_else(|| LedgerError::account_id_not_found(from_id))?;
        let mut to = locked
            .iter()
            .find(|account| account.number == to_number)
            .cloned()
            .ok_or_else(|| LedgerError::account_number_not_found(to_number))?;

        validate_transfer(&from, &to, amount)?;
        let transfer = apply_transfer(&mut from, &mut to, amount);

        for account in [&from, &to] {
            sqlx::query("UPDATE account SET balance = $2 WHERE id = $1")
                .bind(account.id)
                .bind(account.balance)
                .execute(&mut *tx)
                .await
                .map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;

        debug!(
            from = transfer.from_account,
            to = transfer.to_account,
            amount,
            "이체 완료"
        );
        Ok(transfer)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
