//! Console state - pure data structure with no I/O logic

use crate::error::ConsoleError;
use crate::models::ResponseRecord;

/// Result of one completed send
#[derive(Clone, Debug, PartialEq)]
pub enum SendOutcome {
    Success(ResponseRecord),
    Failure(ConsoleError),
}

impl SendOutcome {
    pub fn record(&self) -> Option<&ResponseRecord> {
        match self {
            SendOutcome::Success(record) => Some(record),
            SendOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ConsoleError> {
        match self {
            SendOutcome::Success(_) => None,
            SendOutcome::Failure(e) => Some(e),
        }
    }
}

/// What the presentation layer renders. Replaced wholesale on every
/// transition; `seq` identifies the send the state belongs to.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ConsoleState {
    #[default]
    Idle,
    Sending {
        seq: u64,
    },
    Settled {
        seq: u64,
        outcome: SendOutcome,
    },
}

impl ConsoleState {
    /// Busy indicator; the send trigger should be disabled while true
    pub fn is_busy(&self) -> bool {
        matches!(self, ConsoleState::Sending { .. })
    }

    pub fn seq(&self) -> Option<u64> {
        match self {
            ConsoleState::Idle => None,
            ConsoleState::Sending { seq } | ConsoleState::Settled { seq, .. } => Some(*seq),
        }
    }

    pub fn outcome(&self) -> Option<&SendOutcome> {
        match self {
            ConsoleState::Settled { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}
