//! 인메모리 계좌 저장소.
//!
//! 테스트와 로컬 개발용 [`AccountStore`] 구현체입니다.
//! 프로세스가 종료되면 모든 데이터가 사라집니다.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::AccountStore;
use crate::domain::{apply_transfer, validate_transfer, Account, Transfer};
use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Default)]
struct Inner {
    /// ID → 계좌
    accounts: BTreeMap<i64, Account>,
    /// 계좌번호 → ID
    numbers: HashMap<i64, i64>,
    /// 삭제된 계좌가 사용하던 번호 (재사용 금지)
    retired_numbers: HashSet<i64>,
    /// 마지막으로 부여한 ID
    last_id: i64,
}

/// `RwLock`으로 보호되는 인메모리 저장소.
///
/// 읽기는 동시에 수행되고 쓰기는 직렬화됩니다.
/// ID는 단조 증가하며 삭제 후에도 재사용되지 않습니다.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    inner: RwLock<Inner>,
}

impl MemoryAccountStore {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 계좌 수.
    pub async fn len(&self) -> usize {
        self.inner.read().await.accounts.len()
    }

    /// 저장소가 비어 있는지 확인.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.accounts.is_empty()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_account(&self, mut account: Account) -> LedgerResult<Account> {
        let mut inner = self.inner.write().await;

        if inner.numbers.contains_key(&account.number)
            || inner.retired_numbers.contains(&account.number)
        {
            return Err(LedgerError::DuplicateNumber(account.number));
        }

        inner.last_id += 1;
        account.id = inner.last_id;

        inner.numbers.insert(account.number, account.id);
        inner.accounts.insert(account.id, account.clone());

        debug!(id = account.id, number = account.number, "계좌 생성");
        Ok(account)
    }

    async fn get_account_by_id(&self, id: i64) -> LedgerResult<Account> {
        self.inner
            .read()
            .await
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::account_id_not_found(id))
    }

    async fn get_account_by_number(&self, number: i64) -> LedgerResult<Account> {
        let inner = self.inner.read().await;
        inner
            .numbers
            .get(&number)
            .and_then(|id| inner.accounts.get(id))
            .cloned()
            .ok_or_else(|| LedgerError::account_number_not_found(number))
    }

    async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        Ok(self.inner.read().await.accounts.values().cloned().collect())
    }

    async fn delete_account(&self, id: i64) -> LedgerResult<()> {
        let mut inner = self.inner.write().await;

        let removed = inner
            .accounts
            .remove(&id)
            .ok_or_else(|| LedgerError::account_id_not_found(id))?;
        inner.numbers.remove(&removed.number);
        inner.retired_numbers.insert(removed.number);

        debug!(id, number = removed.number, "계좌 삭제");
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> LedgerResult<()> {
        let mut inner = self.inner.write().await;

        let stored = inner
            .accounts
            .get_mut(&account.id)
            .ok_or_else(|| LedgerError::account_id_not_found(account.id))?;
        stored.first_name = account.first_name.clone();
        stored.last_name = account.last_name.clone();
        stored.balance = account.balance;

        Ok(())
    }

    async fn transfer(&self, from_id: i64, to_number: i64, amount: i64) -> LedgerResult<Transfer> {
        let mut inner = self.inner.write().await;

        let to_id = *inner
            .numbers
            .get(&to_number)
            .ok_or_else(|| LedgerError::account_number_not_found(to_number))?;
        let mut from = inner
            .accounts
            .get(&from_id)
            .cloned()
            .ok_or_else(|| LedgerError::account_id_not_found(from_id))?;
        let mut to = inner
            .accounts
            .get(&to_id)
            .cloned()
            .ok_or_else(|| LedgerError::account_id_not_found(to_id))?;

        validate_transfer(&from, &to, amount)?;
        let transfer = apply_transfer(&mut from, &mut to, amount);

        inner.accounts.insert(from.id, from);
        inner.accounts.insert(to.id, to);

        debug!(
            from = transfer.from_account,
            to = transfer.to_account,
            amount,
            "이체 완료"
        );
        Ok(transfer)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
