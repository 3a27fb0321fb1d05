use crate::domain::money::{Amount, Money};
use crate::error::AtmError;

/// Aggregate count of currency units physically inside the machine.
///
/// Bill denominations are the dispenser driver's problem; the controller only
/// accounts for one quantity. The count never goes below zero: a withdrawal
/// that would drain past empty fails before any customer-visible state moves.
#[derive(Debug, Clone, PartialEq)]
pub struct CashBin {
    available: Money,
}

impl CashBin {
    pub fn new(available: Money) -> Self {
        debug_assert!(available >= Money::ZERO);
        Self { available }
    }

    pub fn available(&self) -> Money {
        self.available
    }

    pub fn can_dispense(&self, amount: Amount) -> bool {
        amount.value() <= self.available
    }

    pub fn dispense(&mut self, amount: Amount) -> Result<(), AtmError> {
        if self.can_dispense(amount) {
            self.available -= amount.value();
            Ok(())
        } else {
            Err(AtmError::CashBinInsufficient)
        }
    }

    pub fn accept_deposit(&mut self, amount: Amount) {
        self.available += amount.value();
    }
}
