use crate::domain::account::{AccountId, AccountLedger};
use crate::domain::cash_bin::CashBin;
use crate::domain::money::{Amount, Money};
use crate::domain::ports::{
    AccountDirectoryBox, BankAuthorizerBox, CardId, CardReaderBox, CashDispenserBox, NotifierBox,
    Pin, PinVerdict,
};
use crate::error::{AtmError, Result};
use std::time::Duration;
use tokio::time::Instant;

/// Tuning knobs for a single machine.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub machine_id: String,
    pub max_pin_retries: u8,
    pub pin_entry_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            machine_id: "atm-0".to_string(),
            max_pin_retries: 3,
            pin_entry_timeout: Duration::from_secs(60),
        }
    }
}

/// Why a session reached [`SessionState::Ended`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Completed,
    LockedOut,
    TimedOut,
}

/// Lifecycle of one customer interaction.
///
/// Session-scoped data (card id, attempt counter, ledger) lives inside the
/// variant that needs it, so leaving a state destroys it by construction.
/// `Ended` is terminal: a new customer means a fresh `begin_session` on a
/// controller reset to `Idle`.
#[derive(Debug)]
pub enum SessionState {
    Idle,
    CardPresented {
        card_id: CardId,
        pin_deadline: Instant,
    },
    PinEntry {
        card_id: CardId,
        attempts: u8,
        pin_deadline: Instant,
    },
    Authorized {
        card_id: CardId,
    },
    /// An account is selected; balance, deposit and withdraw are legal.
    /// Selecting another account stays within this state.
    Active {
        card_id: CardId,
        ledger: AccountLedger,
    },
    Ended {
        reason: EndReason,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CardPresented { .. } => "card-presented",
            Self::PinEntry { .. } => "pin-entry",
            Self::Authorized { .. } => "authorized",
            Self::Active { .. } => "active",
            Self::Ended { .. } => "ended",
        }
    }
}

/// The transaction controller for one physical machine.
///
/// Owns the session lifecycle and the cash-bin accounting; everything
/// external (reader, bank, dispenser, display) is reached through the boxed
/// ports injected at construction. One instance serves one machine and one
/// session at a time; every operation takes `&mut self`, so there is no
/// intra-session interleaving to guard against.
pub struct SessionController {
    card_reader: CardReaderBox,
    authorizer: BankAuthorizerBox,
    directory: AccountDirectoryBox,
    dispenser: CashDispenserBox,
    notifier: NotifierBox,
    cash_bin: CashBin,
    config: SessionConfig,
    state: SessionState,
}

impl SessionController {
    pub fn new(
        card_reader: CardReaderBox,
        authorizer: BankAuthorizerBox,
        directory: AccountDirectoryBox,
        dispenser: CashDispenserBox,
        notifier: NotifierBox,
        cash_bin: CashBin,
        config: SessionConfig,
    ) -> Self {
        Self {
            card_reader,
            authorizer,
            directory,
            dispenser,
            notifier,
            cash_bin,
            config,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn cash_bin(&self) -> &CashBin {
        &self.cash_bin
    }

    /// Readies the controller for the next customer. Legal only once the
    /// previous session has ended (or before any session ran).
    pub fn reset(&mut self) -> Result<()> {
        match self.state {
            SessionState::Idle | SessionState::Ended { .. } => {
                self.state = SessionState::Idle;
                Ok(())
            }
            _ => Err(self.violation("reset")),
        }
    }

    /// Waits up to `timeout` for a card and opens a session for it.
    ///
    /// The bounded wait is delegated to the card reader port; the controller
    /// never polls. On timeout or a read failure no session data has been
    /// created, so the controller simply stays `Idle`.
    pub async fn begin_session(&mut self, timeout: Duration) -> Result<CardId> {
        if !matches!(self.state, SessionState::Idle) {
            return Err(self.violation("begin_session"));
        }
        let card_id = self.card_reader.detect_card(timeout).await?;
        let pin_deadline = Instant::now() + self.config.pin_entry_timeout;
        tracing::debug!(
            machine = %self.config.machine_id,
            card = %card_id,
            "card presented"
        );
        self.state = SessionState::CardPresented {
            card_id: card_id.clone(),
            pin_deadline,
        };
        Ok(card_id)
    }

    /// Forwards the PIN to the bank for verification.
    ///
    /// The `Pin` is consumed by the verification call and never stored. A
    /// mismatch leaves the session in `PinEntry` until the retry budget is
    /// spent, at which point the session ends locked out. Letting the
    /// PIN-entry window lapse ends the session timed out.
    pub async fn submit_pin(&mut self, pin: Pin) -> Result<()> {
        let (card_id, attempts, pin_deadline) = match &self.state {
            SessionState::CardPresented {
                card_id,
                pin_deadline,
            } => (card_id.clone(), 0, *pin_deadline),
            SessionState::PinEntry {
                card_id,
                attempts,
                pin_deadline,
            } => (card_id.clone(), *attempts, *pin_deadline),
            _ => return Err(self.violation("submit_pin")),
        };

        if Instant::now() >= pin_deadline {
            self.notifier.notify("Session timed out, please take your card");
            self.finish(EndReason::TimedOut);
            return Err(AtmError::Timeout);
        }

        match self.authorizer.verify_pin(&card_id, pin).await? {
            PinVerdict::Match => {
                tracing::debug!(machine = %self.config.machine_id, "PIN verified");
                self.state = SessionState::Authorized { card_id };
                Ok(())
            }
            PinVerdict::NoMatch => {
                let attempts = attempts + 1;
                if attempts >= self.config.max_pin_retries {
                    tracing::warn!(
                        machine = %self.config.machine_id,
                        "PIN retries exhausted, locking session"
                    );
                    self.notifier.notify("Too many failed attempts");
                    self.finish(EndReason::LockedOut);
                    Err(AtmError::LockedOut)
                } else {
                    let remaining = self.config.max_pin_retries - attempts;
                    self.notifier
                        .notify(&format!("Wrong PIN, {remaining} attempts remaining"));
                    self.state = SessionState::PinEntry {
                        card_id,
                        attempts,
                        pin_deadline,
                    };
                    Err(AtmError::WrongPin { remaining })
                }
            }
        }
    }

    /// Fetches the account's current view from the bank and makes it the
    /// session's active ledger. Re-entrant: a customer may switch accounts
    /// while the session stays active.
    pub async fn select_account(&mut self, account_id: &AccountId) -> Result<Money> {
        let card_id = match &self.state {
            SessionState::Authorized { card_id } | SessionState::Active { card_id, .. } => {
                card_id.clone()
            }
            _ => return Err(self.violation("select_account")),
        };
        let view = self
            .directory
            .fetch_account(&card_id, account_id)
            .await?
            .ok_or_else(|| AtmError::UnknownAccount(account_id.clone()))?;
        let ledger = AccountLedger::new(view);
        let balance = ledger.balance();
        tracing::debug!(
            machine = %self.config.machine_id,
            account = %account_id,
            "account selected"
        );
        self.state = SessionState::Active { card_id, ledger };
        Ok(balance)
    }

    /// Current balance of the selected account. Pure read.
    pub fn balance(&self) -> Result<Money> {
        match &self.state {
            SessionState::Active { ledger, .. } => Ok(ledger.balance()),
            _ => Err(self.violation("balance")),
        }
    }

    /// Accepts `amount` into the account and the cash bin together.
    ///
    /// Both mutations are in-memory and infallible once the amount is
    /// validated, so they apply atomically or not at all.
    pub fn deposit(&mut self, amount: Money) -> Result<Money> {
        let SessionState::Active { ledger, .. } = &mut self.state else {
            return Err(self.violation("deposit"));
        };
        let amount = Amount::new(amount)?;
        let new_balance = ledger.credit(amount);
        self.cash_bin.accept_deposit(amount);
        tracing::debug!(
            machine = %self.config.machine_id,
            amount = amount.value().units(),
            "deposit accepted"
        );
        self.notifier.notify(&format!("New balance is {new_balance}"));
        Ok(new_balance)
    }

    /// Dispenses `amount` and debits the account.
    ///
    /// Order is mandatory: funds check, bin capacity check, hardware
    /// dispense, then the accounting. The account is debited only after the
    /// dispenser reports success, so a short bin or a jam leaves the balance
    /// untouched.
    pub async fn withdraw(&mut self, amount: Money) -> Result<Money> {
        let SessionState::Active { ledger, .. } = &mut self.state else {
            return Err(self.violation("withdraw"));
        };
        let amount = Amount::new(amount)?;

        if !ledger.can_debit(amount) {
            let balance = ledger.balance();
            self.notifier
                .notify(&format!("Insufficient funds, your balance is {balance}"));
            return Err(AtmError::InsufficientFunds { balance });
        }
        if !self.cash_bin.can_dispense(amount) {
            self.notifier
                .notify("This machine cannot dispense that amount right now");
            return Err(AtmError::CashBinInsufficient);
        }

        if let Err(err) = self.dispenser.dispense(amount).await {
            tracing::warn!(
                machine = %self.config.machine_id,
                error = %err,
                "dispense failed, withdrawal aborted"
            );
            return Err(err);
        }

        // The hardware has committed; the bin count follows it.
        self.cash_bin.dispense(amount)?;
        let new_balance = ledger.debit(amount)?;
        tracing::debug!(
            machine = %self.config.machine_id,
            amount = amount.value().units(),
            "withdrawal dispensed"
        );
        self.notifier.notify(&format!("New balance is {new_balance}"));
        Ok(new_balance)
    }

    /// Ends the session. Idempotent: a session that already ended keeps its
    /// original end reason.
    pub fn end_session(&mut self) {
        if matches!(self.state, SessionState::Ended { .. }) {
            return;
        }
        self.notifier.notify("Thank you, please take your card");
        self.finish(EndReason::Completed);
    }

    fn finish(&mut self, reason: EndReason) {
        tracing::debug!(
            machine = %self.config.machine_id,
            ?reason,
            "session ended"
        );
        self.state = SessionState::Ended { reason };
    }

    fn violation(&self, operation: &'static str) -> AtmError {
        AtmError::StateViolation {
            operation,
            state: self.state.name(),
        }
    }
}
