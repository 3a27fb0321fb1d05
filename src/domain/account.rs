use crate::domain::money::{Amount, Money};
use crate::error::AtmError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier a customer uses to pick one of the accounts behind a card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of an account as reported by the bank's directory.
///
/// The bank owns the account; the controller holds this view only for the
/// duration of a session. `overdraft_limit` is non-negative and expresses how
/// far below zero the balance may go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: AccountId,
    pub balance: Money,
    pub overdraft_limit: Money,
}

/// The authoritative-for-this-session balance and overdraft rule.
///
/// Built from an [`AccountView`] at selection time and mutated only by the
/// session holding it. `debit` checks the overdraft bound and applies the
/// mutation in one call, so there is no gap between the check and the write.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountLedger {
    id: AccountId,
    balance: Money,
    overdraft_limit: Money,
}

impl AccountLedger {
    pub fn new(view: AccountView) -> Self {
        debug_assert!(view.overdraft_limit >= Money::ZERO);
        Self {
            id: view.id,
            balance: view.balance,
            overdraft_limit: view.overdraft_limit,
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Whether `amount` fits within balance plus overdraft. The boundary is
    /// inclusive: debiting exactly `balance + overdraft_limit` is allowed.
    pub fn can_debit(&self, amount: Amount) -> bool {
        amount.value() <= self.balance + self.overdraft_limit
    }

    pub fn debit(&mut self, amount: Amount) -> Result<Money, AtmError> {
        if self.can_debit(amount) {
            self.balance -= amount.value();
            Ok(self.balance)
        } else {
            Err(AtmError::InsufficientFunds {
                balance: self.balance,
            })
        }
    }

    pub fn credit(&mut self, amount: Amount) -> Money {
        self.balance += amount.value();
        self.balance
    }
}
