//! App layer - console state machine
//!
//! The controller turns send requests into network calls and publishes
//! every state transition to its subscribers.

pub mod controller;
pub mod state;

pub use controller::{ConsoleController, ConsoleOptions, SendInput};
pub use state::{ConsoleState, SendOutcome};
