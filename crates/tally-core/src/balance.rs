//! # Account Balance & Credit Policy
//!
//! Balances are never stored as mutable numbers inside the kernel. They are
//! always folded from the account's transaction history, which the host
//! reads from its own tables.
//!
//! ## Credit Check Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Credit sale of $250 to customer with limit $1,000                      │
//! │                                                                         │
//! │  history ──► customer_balance ──► $800                                  │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                    can_purchase($800, $250, $1,000)                     │
//! │                                     │                                   │
//! │                     $1,050 > $1,000 │                                   │
//! │                                     ▼                                   │
//! │                   false ──► UI asks for a payment first                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{AccountParty, AccountStatus, LedgerTransaction, StatementLine};

fn require_non_negative_amount(tx: &LedgerTransaction) -> CoreResult<()> {
    if tx.amount.is_negative() {
        debug!(kind = %tx.kind, amount = %tx.amount, "Rejected negative ledger amount");
        return Err(CoreError::NegativeAmount {
            field: "transaction amount",
            value: tx.amount,
        });
    }
    Ok(())
}

/// Posts one transaction onto a running balance.
fn post(balance: Money, tx: &LedgerTransaction, party: AccountParty) -> CoreResult<Money> {
    require_non_negative_amount(tx)?;
    let next = match tx.kind.sign_for(party) {
        1 => balance.checked_add(tx.amount),
        -1 => balance.checked_sub(tx.amount),
        _ => Some(balance),
    };
    next.ok_or(CoreError::Overflow("account balance"))
}

/// Folds a transaction history into the balance of the given party.
///
/// Kinds that do not belong to the party's ledger contribute nothing.
///
/// # Errors
/// - `NegativeAmount` if any transaction carries a negative amount
/// - `Overflow` if the running balance leaves the `i64` range
///
/// No partial balance is returned.
pub fn account_balance(
    party: AccountParty,
    transactions: &[LedgerTransaction],
) -> CoreResult<Money> {
    transactions
        .iter()
        .try_fold(Money::ZERO, |balance, tx| post(balance, tx, party))
}

/// Customer balance: credit sales and opening balance add, payments and
/// refunds subtract.
///
/// ```rust
/// use tally_core::{customer_balance, LedgerTransaction, LedgerTransactionKind, Money};
///
/// let history = [
///     LedgerTransaction::new(LedgerTransactionKind::CreditSale, Money::from_cents(10_000)),
///     LedgerTransaction::new(LedgerTransactionKind::Payment, Money::from_cents(3_000)),
/// ];
/// assert_eq!(customer_balance(&history).unwrap(), Money::from_cents(7_000));
/// ```
pub fn customer_balance(transactions: &[LedgerTransaction]) -> CoreResult<Money> {
    account_balance(AccountParty::Customer, transactions)
}

/// Supplier balance: credit purchases and opening balance add, payments and
/// returns subtract.
pub fn supplier_balance(transactions: &[LedgerTransaction]) -> CoreResult<Money> {
    account_balance(AccountParty::Supplier, transactions)
}

/// Running balance after each transaction, for account statements.
///
/// The balance on the last line always equals [`account_balance`] of the
/// same history.
pub fn statement(
    party: AccountParty,
    transactions: &[LedgerTransaction],
) -> CoreResult<Vec<StatementLine>> {
    let mut balance = Money::ZERO;
    let mut lines = Vec::with_capacity(transactions.len());
    for tx in transactions {
        balance = post(balance, tx, party)?;
        lines.push(StatementLine {
            kind: tx.kind,
            amount: tx.amount,
            balance,
        });
    }
    Ok(lines)
}

fn require_valid_limit(limit: Money) -> CoreResult<()> {
    if limit.is_negative() {
        return Err(CoreError::InvalidLimit(limit));
    }
    Ok(())
}

/// True when `balance > limit`.
///
/// # Errors
/// `InvalidLimit` if the limit is negative.
pub fn exceeds_credit_limit(balance: Money, limit: Money) -> CoreResult<bool> {
    require_valid_limit(limit)?;
    Ok(balance > limit)
}

/// Credit left before the limit is reached, floored at zero.
///
/// A customer credit so large that `limit - balance` passes `i64::MAX`
/// reports `i64::MAX` cents.
pub fn available_credit(balance: Money, limit: Money) -> Money {
    match limit.checked_sub(balance) {
        Some(left) => left.max(Money::ZERO),
        None if balance.is_negative() => Money::from_cents(i64::MAX),
        None => Money::ZERO,
    }
}

/// True when adding `amount` keeps the balance within the limit.
///
/// # Errors
/// - `NegativeAmount` if the amount is negative
/// - `InvalidLimit` if the limit is negative
pub fn can_purchase(balance: Money, amount: Money, limit: Money) -> CoreResult<bool> {
    if amount.is_negative() {
        return Err(CoreError::NegativeAmount {
            field: "purchase amount",
            value: amount,
        });
    }
    // past i64::MAX is over any limit
    let over = match balance.checked_add(amount) {
        Some(projected) => exceeds_credit_limit(projected, limit)?,
        None => {
            require_valid_limit(limit)?;
            true
        }
    };
    if over {
        debug!(
            balance = %balance,
            amount = %amount,
            limit = %limit,
            "Purchase would exceed credit limit"
        );
    }
    Ok(!over)
}

/// Classifies an account.
///
/// ```text
/// balance <= 0           → CLEAR
/// balance >  limit       → OVER_LIMIT
/// otherwise              → ACTIVE
/// ```
///
/// # Errors
/// `InvalidLimit` if the limit is negative.
pub fn account_status(balance: Money, limit: Money) -> CoreResult<AccountStatus> {
    require_valid_limit(limit)?;
    if !balance.is_positive() {
        return Ok(AccountStatus::Clear);
    }
    if exceeds_credit_limit(balance, limit)? {
        Ok(AccountStatus::OverLimit)
    } else {
        Ok(AccountStatus::Active)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LedgerTransactionKind::{self, *};

    fn tx(kind: LedgerTransactionKind, cents: i64) -> LedgerTransaction {
        LedgerTransaction::new(kind, Money::from_cents(cents))
    }

    #[test]
    fn test_customer_balance() {
        assert_eq!(customer_balance(&[]).unwrap(), Money::ZERO);
        let history = [tx(CreditSale, 10_000), tx(Payment, 3_000)];
        assert_eq!(customer_balance(&history).unwrap(), Money::from_cents(7_000));
    }

    #[test]
    fn test_customer_balance_ignores_supplier_kinds() {
        let history = [
            tx(OpeningBalance, 500),
            tx(CreditSale, 1_000),
            tx(Refund, 200),
            tx(CreditPurchase, 9_999),
            tx(Return, 9_999),
        ];
        assert_eq!(customer_balance(&history).unwrap(), Money::from_cents(1_300));
    }

    #[test]
    fn test_supplier_balance() {
        let history = [
            tx(OpeningBalance, 1_000),
            tx(CreditPurchase, 5_000),
            tx(Payment, 2_000),
            tx(Return, 500),
            tx(CreditSale, 9_999),
            tx(Refund, 9_999),
        ];
        assert_eq!(supplier_balance(&history).unwrap(), Money::from_cents(3_500));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let history = [tx(CreditSale, 100), tx(Payment, -50)];
        assert!(matches!(
            customer_balance(&history),
            Err(CoreError::NegativeAmount { .. })
        ));
        assert!(supplier_balance(&history).is_err());
        assert!(statement(AccountParty::Customer, &history).is_err());
    }

    #[test]
    fn test_statement_running_balance() {
        let history = [tx(CreditSale, 10_000), tx(Payment, 3_000), tx(Payment, 8_000)];
        let lines = statement(AccountParty::Customer, &history).unwrap();
        let balances: Vec<i64> = lines.iter().map(|l| l.balance.cents()).collect();
        assert_eq!(balances, vec![10_000, 7_000, -1_000]);
        assert_eq!(
            lines.last().unwrap().balance,
            customer_balance(&history).unwrap()
        );
    }

    #[test]
    fn test_exceeds_credit_limit() {
        let limit = Money::from_cents(1_000);
        assert!(!exceeds_credit_limit(Money::from_cents(1_000), limit).unwrap());
        assert!(exceeds_credit_limit(Money::from_cents(1_001), limit).unwrap());
        assert!(matches!(
            exceeds_credit_limit(Money::ZERO, Money::from_cents(-1)),
            Err(CoreError::InvalidLimit(_))
        ));
    }

    #[test]
    fn test_available_credit() {
        let limit = Money::from_cents(1_000);
        assert_eq!(available_credit(Money::from_cents(400), limit), Money::from_cents(600));
        assert_eq!(available_credit(Money::from_cents(1_500), limit), Money::ZERO);
        assert_eq!(available_credit(Money::from_cents(-200), limit), Money::from_cents(1_200));
    }

    #[test]
    fn test_can_purchase() {
        let limit = Money::from_cents(100_000);
        let owed = Money::from_cents(80_000);
        assert!(can_purchase(owed, Money::from_cents(20_000), limit).unwrap());
        assert!(!can_purchase(owed, Money::from_cents(25_000), limit).unwrap());
        assert!(matches!(
            can_purchase(Money::ZERO, Money::from_cents(-1), limit),
            Err(CoreError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_balance_overflow_is_reported() {
        let history = [tx(CreditSale, i64::MAX), tx(OpeningBalance, 1)];
        assert_eq!(
            customer_balance(&history),
            Err(CoreError::Overflow("account balance"))
        );
        assert_eq!(
            statement(AccountParty::Customer, &history),
            Err(CoreError::Overflow("account balance"))
        );
        // the supplier ledger ignores credit sales, so it never gets there
        assert_eq!(supplier_balance(&history).unwrap(), Money::from_cents(1));
    }

    #[test]
    fn test_extreme_balances_do_not_panic() {
        let max = Money::from_cents(i64::MAX);
        assert!(!can_purchase(max, Money::from_cents(1), max).unwrap());
        assert_eq!(available_credit(Money::from_cents(-1), max), max);
        assert_eq!(
            available_credit(Money::from_cents(i64::MIN), Money::ZERO),
            max
        );
    }

    #[test]
    fn test_account_status() {
        let limit = Money::from_cents(1_000);
        assert_eq!(account_status(Money::ZERO, limit).unwrap(), AccountStatus::Clear);
        assert_eq!(account_status(Money::from_cents(-5), limit).unwrap(), AccountStatus::Clear);
        assert_eq!(account_status(Money::from_cents(500), limit).unwrap(), AccountStatus::Active);
        assert_eq!(account_status(Money::from_cents(1_000), limit).unwrap(), AccountStatus::Active);
        assert_eq!(
            account_status(Money::from_cents(1_001), limit).unwrap(),
            AccountStatus::OverLimit
        );
        assert!(account_status(Money::from_cents(1), Money::from_cents(-1)).is_err());
    }
}
