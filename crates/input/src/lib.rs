//! Input snapshot and action bindings.
//!
//! # Invariants
//! - Platform callbacks write key state; scene objects only read it.
//! - Objects ask about actions, not raw keys, so bindings stay rebindable.

pub mod action;
mod state;

pub use action::{Action, KeyBindings};
pub use state::{InputState, Key};
