//! Domain layer: value types, accounting rules and collaborator ports.

pub mod account;
pub mod cash_bin;
pub mod money;
pub mod ports;
