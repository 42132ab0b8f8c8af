//! Enemy behavior for typestrike.
//!
//! Implements the per-variant policy table, the typing-match state machine
//! and the variant hooks. Everything here operates on plain component data.

pub mod fsm;
pub mod hooks;
pub mod profiles;

pub use typestrike_core as core;

#[cfg(test)]
mod tests;
