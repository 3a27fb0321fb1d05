mod common;

use atm_controller::application::session::{EndReason, SessionState};
use atm_controller::domain::account::{AccountId, AccountView};
use atm_controller::domain::money::Money;
use atm_controller::domain::ports::Pin;
use atm_controller::error::AtmError;
use common::{CARD, CHECKING, PIN, active_machine, machine};
use std::time::Duration;

#[tokio::test]
async fn full_session_happy_path() {
    let mut harness = machine(2020, 300, 100_000).await;
    let controller = &mut harness.controller;

    let card_id = controller.begin_session(Duration::from_secs(10)).await.unwrap();
    assert_eq!(card_id.as_str(), CARD);

    controller.submit_pin(Pin::new(PIN)).await.unwrap();
    let balance = controller
        .select_account(&AccountId::new(CHECKING))
        .await
        .unwrap();
    assert_eq!(balance, Money::new(2020));

    assert_eq!(controller.balance().unwrap(), Money::new(2020));
    controller.deposit(Money::new(80)).unwrap();
    controller.withdraw(Money::new(100)).await.unwrap();
    assert_eq!(controller.balance().unwrap(), Money::new(2000));

    controller.end_session();
    assert!(matches!(
        controller.state(),
        SessionState::Ended {
            reason: EndReason::Completed
        }
    ));
}

#[tokio::test]
async fn selecting_an_unknown_account_keeps_the_session_authorized() {
    let mut harness = machine(100, 0, 1000).await;
    let controller = &mut harness.controller;
    controller.begin_session(Duration::from_secs(10)).await.unwrap();
    controller.submit_pin(Pin::new(PIN)).await.unwrap();

    let missing = AccountId::new("savings");
    let result = controller.select_account(&missing).await;
    assert_eq!(result, Err(AtmError::UnknownAccount(missing.clone())));
    assert!(matches!(controller.state(), SessionState::Authorized { .. }));

    // The session is still usable.
    controller
        .select_account(&AccountId::new(CHECKING))
        .await
        .unwrap();
    assert_eq!(controller.balance().unwrap(), Money::new(100));
}

#[tokio::test]
async fn switching_accounts_mid_session() {
    let mut harness = active_machine(100, 0, 1000).await;
    let card = atm_controller::domain::ports::CardId::new(CARD);
    harness
        .bank
        .add_account(
            &card,
            AccountView {
                id: AccountId::new("savings"),
                balance: Money::new(9000),
                overdraft_limit: Money::ZERO,
            },
        )
        .await;

    let balance = harness
        .controller
        .select_account(&AccountId::new("savings"))
        .await
        .unwrap();
    assert_eq!(balance, Money::new(9000));
    assert_eq!(harness.controller.balance().unwrap(), Money::new(9000));

    // Switching back re-reads the directory view.
    let balance = harness
        .controller
        .select_account(&AccountId::new(CHECKING))
        .await
        .unwrap();
    assert_eq!(balance, Money::new(100));
}

#[tokio::test]
async fn operations_after_end_are_state_violations() {
    let mut harness = active_machine(100, 0, 1000).await;
    harness.controller.end_session();

    assert_eq!(
        harness.controller.balance(),
        Err(AtmError::StateViolation {
            operation: "balance",
            state: "ended"
        })
    );
    assert_eq!(
        harness.controller.deposit(Money::new(5)),
        Err(AtmError::StateViolation {
            operation: "deposit",
            state: "ended"
        })
    );
    assert_eq!(
        harness.controller.withdraw(Money::new(5)).await,
        Err(AtmError::StateViolation {
            operation: "withdraw",
            state: "ended"
        })
    );
    assert_eq!(
        harness.controller.submit_pin(Pin::new(PIN)).await,
        Err(AtmError::StateViolation {
            operation: "submit_pin",
            state: "ended"
        })
    );
}

#[tokio::test]
async fn farewell_is_notified_once_for_repeated_end_session() {
    let mut harness = active_machine(100, 0, 1000).await;
    harness.controller.end_session();
    harness.controller.end_session();
    let farewells = harness
        .notifier
        .messages()
        .iter()
        .filter(|m| m.contains("Thank you"))
        .count();
    assert_eq!(farewells, 1);
}
