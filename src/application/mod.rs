//! Application layer: the session state machine that orchestrates the
//! collaborator ports and the in-memory accounting.

pub mod session;
