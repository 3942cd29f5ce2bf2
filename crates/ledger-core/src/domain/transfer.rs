//! 계좌 간 이체.

use serde::{Deserialize, Serialize};

use super::Account;
use crate::error::{LedgerError, LedgerResult};

/// 완료된 이체 내역.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    /// 출금 계좌번호
    pub from_account: i64,
    /// 입금 계좌번호
    pub to_account: i64,
    /// 이체 금액
    pub amount: i64,
    /// 이체 후 출금 계좌 잔고
    pub balance: i64,
}

/// 이체 가능 여부 검증.
///
/// 저장소 구현체는 잔고를 변경하기 전에 반드시 이 검증을 거쳐야 합니다.
///
/// # Errors
///
/// - 금액이 0 이하이거나 자기 자신에게 이체하면 `InvalidInput`
/// - 입금 후 잔고가 `i64` 범위를 넘으면 `InvalidInput`
/// - 출금 계좌 잔고가 부족하면 `InsufficientFunds`
pub fn validate_transfer(from: &Account, to: &Account, amount: i64) -> LedgerResult<()> {
    if amount <= 0 {
        return Err(LedgerError::InvalidInput(format!(
            "이체 금액은 양수여야 합니다: {}",
            amount
        )));
    }
    if from.id == to.id {
        return Err(LedgerError::InvalidInput(
            "같은 계좌로 이체할 수 없습니다".to_string(),
        ));
    }
    if !from.can_debit(amount) {
        return Err(LedgerError::InsufficientFunds {
            balance: from.balance,
            requested: amount,
        });
    }
    if to.balance.checked_add(amount).is_none() {
        return Err(LedgerError::InvalidInput(format!(
            "입금 계좌 잔고 한도 초과: {} + {}",
            to.balance, amount
        )));
    }
    Ok(())
}

/// 검증된 이체를 두 계좌에 반영합니다.
///
/// `validate_transfer`가 성공한 뒤에만 호출해야 합니다. 검증을 통과했다면
/// 두 연산 모두 범위를 넘지 않습니다.
pub fn apply_transfer(from: &mut Account, to: &mut Account, amount: i64) -> Transfer {
    from.balance -= amount;
    to.balance += amount;

    Transfer {
        from_account: from.number,
        to_account: to.number,
        amount,
        balance: from.balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: i64, number: i64, balance: i64) -> Account {
        let mut account = Account::with_number("Test", "User", "hash", number).unwrap();
        account.id = id;
        account.balance = balance;
        account
    }

    #[test]
    fn test_validate_transfer_ok() {
        let from = account(1, 111_111, 500);
        let to = account(2, 222_222, 0);
        assert!(validate_transfer(&from, &to, 500).is_ok());
    }

    #[test]
    fn test_validate_transfer_rejects_bad_amount_and_self() {
        let from = account(1, 111_111, 500);
        let to = account(2, 222_222, 0);

        assert!(matches!(
            validate_transfer(&from, &to, 0),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_transfer(&from, &from.clone(), 10),
            Err(LedgerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_transfer_insufficient_funds() {
        let from = account(1, 111_111, 99);
        let to = account(2, 222_222, 0);

        match validate_transfer(&from, &to, 100) {
            Err(LedgerError::InsufficientFunds { balance, requested }) => {
                assert_eq!(balance, 99);
                assert_eq!(requested, 100);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_transfer_rejects_credit_overflow() {
        let from = account(1, 111_111, 500);
        let to = account(2, 222_222, i64::MAX - 10);

        assert!(matches!(
            validate_transfer(&from, &to, 11),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(validate_transfer(&from, &to, 10).is_ok());
    }

    #[test]
    fn test_apply_transfer_conserves_total() {
        let mut from = account(1, 111_111, 300);
        let mut to = account(2, 222_222, 50);

        let transfer = apply_transfer(&mut from, &mut to, 120);

        assert_eq!(from.balance, 180);
        assert_eq!(to.balance, 170);
        assert_eq!(from.balance + to.balance, 350);
        assert_eq!(transfer.from_account, 111_111);
        assert_eq!(transfer.to_account, 222_222);
        assert_eq!(transfer.balance, 180);
    }
}
