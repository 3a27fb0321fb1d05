//! Collaborator implementations that need no hardware: an in-memory bank and
//! scripted doubles for the reader, dispenser and display.

pub mod in_memory;
