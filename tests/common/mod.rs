use atm_controller::application::session::{SessionConfig, SessionController};
use atm_controller::domain::account::{AccountId, AccountView};
use atm_controller::domain::cash_bin::CashBin;
use atm_controller::domain::money::Money;
use atm_controller::domain::ports::{CardId, Pin};
use atm_controller::infrastructure::in_memory::{
    InMemoryBank, RecordingNotifier, ScriptedCardReader, StubDispenser,
};
use std::time::Duration;

pub const CARD: &str = "1234321235321";
pub const PIN: &str = "4711";
pub const CHECKING: &str = "checking";

pub struct Harness {
    pub controller: SessionController,
    pub bank: InMemoryBank,
    pub dispenser: StubDispenser,
    pub notifier: RecordingNotifier,
}

/// A machine holding `bin` units of cash, serving one card with one checking
/// account at the given balance and overdraft.
pub async fn machine(balance: i64, overdraft: i64, bin: i64) -> Harness {
    let bank = InMemoryBank::new();
    let card = CardId::new(CARD);
    bank.enroll_card(card.clone(), PIN).await;
    bank.add_account(
        &card,
        AccountView {
            id: AccountId::new(CHECKING),
            balance: Money::new(balance),
            overdraft_limit: Money::new(overdraft),
        },
    )
    .await;

    let dispenser = StubDispenser::new();
    let notifier = RecordingNotifier::new();
    let controller = SessionController::new(
        Box::new(ScriptedCardReader::with_card(card)),
        Box::new(bank.clone()),
        Box::new(bank.clone()),
        Box::new(dispenser.clone()),
        Box::new(notifier.clone()),
        CashBin::new(Money::new(bin)),
        SessionConfig::default(),
    );
    Harness {
        controller,
        bank,
        dispenser,
        notifier,
    }
}

/// Like [`machine`], but driven through card, PIN and account selection so
/// the session is already active.
pub async fn active_machine(balance: i64, overdraft: i64, bin: i64) -> Harness {
    let mut harness = machine(balance, overdraft, bin).await;
    harness
        .controller
        .begin_session(Duration::from_secs(10))
        .await
        .unwrap();
    harness.controller.submit_pin(Pin::new(PIN)).await.unwrap();
    harness
        .controller
        .select_account(&AccountId::new(CHECKING))
        .await
        .unwrap();
    harness
}
