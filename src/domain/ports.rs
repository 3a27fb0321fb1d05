use crate::domain::account::{AccountId, AccountView};
use crate::domain::money::Amount;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Opaque identifier the reader hardware extracts from a card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A PIN as entered by the customer.
///
/// Consumed by the single verification call and redacted from `Debug`
/// output; the controller never stores or logs it.
pub struct Pin(String);

impl Pin {
    pub fn new(digits: impl Into<String>) -> Self {
        Self(digits.into())
    }

    /// For authorizer implementations only.
    pub fn as_digits(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

/// Outcome of a PIN verification. The bank never returns the PIN itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinVerdict {
    Match,
    NoMatch,
}

/// Card reader hardware.
#[async_trait]
pub trait CardReader: Send + Sync {
    /// Waits up to `timeout` for a card and returns its identifier.
    ///
    /// Errors: [`AtmError::Timeout`] when the bound elapses with no card,
    /// [`AtmError::CardNotDetected`] when a presented card cannot be read.
    ///
    /// [`AtmError::Timeout`]: crate::error::AtmError::Timeout
    /// [`AtmError::CardNotDetected`]: crate::error::AtmError::CardNotDetected
    async fn detect_card(&self, timeout: Duration) -> Result<CardId>;
}

/// The bank's PIN verification service.
#[async_trait]
pub trait BankAuthorizer: Send + Sync {
    async fn verify_pin(&self, card_id: &CardId, pin: Pin) -> Result<PinVerdict>;
}

/// The bank's account lookup service.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn fetch_account(
        &self,
        card_id: &CardId,
        account_id: &AccountId,
    ) -> Result<Option<AccountView>>;
}

/// Bill-dispensing hardware. Physical bill combination lives behind this
/// port; the controller only asks for an aggregate amount.
#[async_trait]
pub trait CashDispenser: Send + Sync {
    async fn dispense(&self, amount: Amount) -> Result<()>;
}

/// One-way advisory text for the customer-facing display. Fire-and-forget:
/// the controller never bases a decision on it.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

pub type CardReaderBox = Box<dyn CardReader>;
pub type BankAuthorizerBox = Box<dyn BankAuthorizer>;
pub type AccountDirectoryBox = Box<dyn AccountDirectory>;
pub type CashDispenserBox = Box<dyn CashDispenser>;
pub type NotifierBox = Box<dyn Notifier>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_debug_is_redacted() {
        let pin = Pin::new("1234");
        assert_eq!(format!("{pin:?}"), "Pin(****)");
    }
}
