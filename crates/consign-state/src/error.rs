//! Structured errors for lifecycle transition violations.

use thiserror::Error;

/// Errors raised by the lifecycle state machines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The attempted transition is not legal from the current state.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Current state name.
        from: &'static str,
        /// Attempted target state name.
        to: &'static str,
    },

    /// The state is terminal; nothing may leave it.
    #[error("state {state} is terminal")]
    Terminal {
        /// The terminal state name.
        state: &'static str,
    },
}
