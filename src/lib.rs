//! Transaction controller for a single automated teller machine.
//!
//! The crate sequences one customer session at a time (card, PIN, account
//! selection, money movement) and enforces the monetary invariants. Hardware,
//! the bank service and every UI concern sit behind the collaborator ports in
//! [`domain::ports`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
