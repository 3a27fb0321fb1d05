use crate::domain::account::AccountId;
use crate::domain::money::Money;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AtmError>;

/// Every failure a session operation can report.
///
/// Only `LockedOut` and `Timeout` force the session into its terminal state;
/// all other failures leave the session where it was so the caller can retry
/// or correct the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AtmError {
    #[error("card could not be read")]
    CardNotDetected,
    #[error("timed out waiting for customer input")]
    Timeout,
    #[error("wrong PIN, {remaining} attempts remaining")]
    WrongPin { remaining: u8 },
    #[error("too many failed PIN attempts, session locked")]
    LockedOut,
    #[error("unknown account {0}")]
    UnknownAccount(AccountId),
    #[error("invalid amount {0}")]
    InvalidAmount(Money),
    #[error("insufficient funds, current balance is {balance}")]
    InsufficientFunds { balance: Money },
    #[error("cash bin cannot supply the requested amount")]
    CashBinInsufficient,
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("{operation} is not permitted while the session is {state}")]
    StateViolation {
        operation: &'static str,
        state: &'static str,
    },
}
