use crate::domain::account::{AccountId, AccountView};
use crate::domain::money::{Amount, Money};
use crate::domain::ports::{
    AccountDirectory, BankAuthorizer, CardId, CardReader, CashDispenser, Notifier, Pin, PinVerdict,
};
use crate::error::{AtmError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

/// What the scripted reader does when asked for a card.
enum ReadOutcome {
    /// A readable card appears after the delay.
    Card(CardId, Duration),
    /// A card appears but its data cannot be read.
    Unreadable,
    /// No card is ever presented; the caller's timeout decides.
    NoCard,
}

/// Card reader double with a scripted outcome.
pub struct ScriptedCardReader {
    outcome: ReadOutcome,
}

impl ScriptedCardReader {
    /// A card is present immediately.
    pub fn with_card(card: CardId) -> Self {
        Self {
            outcome: ReadOutcome::Card(card, Duration::ZERO),
        }
    }

    /// A card appears only after `delay`.
    pub fn with_card_after(card: CardId, delay: Duration) -> Self {
        Self {
            outcome: ReadOutcome::Card(card, delay),
        }
    }

    /// A card appears but cannot be read.
    pub fn unreadable() -> Self {
        Self {
            outcome: ReadOutcome::Unreadable,
        }
    }

    /// No card is ever presented.
    pub fn empty() -> Self {
        Self {
            outcome: ReadOutcome::NoCard,
        }
    }
}

#[async_trait]
impl CardReader for ScriptedCardReader {
    async fn detect_card(&self, timeout: Duration) -> Result<CardId> {
        let wait = async {
            match &self.outcome {
                ReadOutcome::Card(card, delay) => {
                    tokio::time::sleep(*delay).await;
                    Ok(card.clone())
                }
                ReadOutcome::Unreadable => Err(AtmError::CardNotDetected),
                ReadOutcome::NoCard => std::future::pending().await,
            }
        };
        match tokio::time::timeout(timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(AtmError::Timeout),
        }
    }
}

struct CardRecord {
    pin: String,
    accounts: HashMap<AccountId, AccountView>,
}

/// In-memory bank backing both the authorizer and the directory ports.
///
/// Clones share state, so one instance can be boxed into both port slots of a
/// controller while a test keeps a handle to it.
#[derive(Default, Clone)]
pub struct InMemoryBank {
    cards: Arc<RwLock<HashMap<CardId, CardRecord>>>,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enroll_card(&self, card_id: CardId, pin: &str) {
        let mut cards = self.cards.write().await;
        cards.insert(
            card_id,
            CardRecord {
                pin: pin.to_string(),
                accounts: HashMap::new(),
            },
        );
    }

    /// Attaches an account to an enrolled card. Unknown cards are ignored.
    pub async fn add_account(&self, card_id: &CardId, view: AccountView) {
        let mut cards = self.cards.write().await;
        if let Some(record) = cards.get_mut(card_id) {
            record.accounts.insert(view.id.clone(), view);
        }
    }
}

#[async_trait]
impl BankAuthorizer for InMemoryBank {
    async fn verify_pin(&self, card_id: &CardId, pin: Pin) -> Result<PinVerdict> {
        let cards = self.cards.read().await;
        match cards.get(card_id) {
            Some(record) if record.pin == pin.as_digits() => Ok(PinVerdict::Match),
            _ => Ok(PinVerdict::NoMatch),
        }
    }
}

#[async_trait]
impl AccountDirectory for InMemoryBank {
    async fn fetch_account(
        &self,
        card_id: &CardId,
        account_id: &AccountId,
    ) -> Result<Option<AccountView>> {
        let cards = self.cards.read().await;
        Ok(cards
            .get(card_id)
            .and_then(|record| record.accounts.get(account_id).cloned()))
    }
}

/// Dispenser double that records what it was asked to dispense and can be
/// jammed to simulate a hardware fault.
#[derive(Default, Clone)]
pub struct StubDispenser {
    jammed: Arc<AtomicBool>,
    dispensed: Arc<Mutex<Vec<Money>>>,
}

impl StubDispenser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_jammed(&self, jammed: bool) {
        self.jammed.store(jammed, Ordering::SeqCst);
    }

    pub fn dispensed(&self) -> Vec<Money> {
        self.dispensed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CashDispenser for StubDispenser {
    async fn dispense(&self, amount: Amount) -> Result<()> {
        if self.jammed.load(Ordering::SeqCst) {
            return Err(AtmError::HardwareFault("bill path jammed".to_string()));
        }
        self.dispensed.lock().unwrap().push(amount.value());
        Ok(())
    }
}

/// Notifier double that records every message for inspection.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
