#![deny(missing_docs)]

//! # consign-state — Lifecycle State Machines
//!
//! Runtime-checked state machines for the three lifecycles that make up a
//! contract: the contract itself, individual signature requests, and the
//! signing workflow that coordinates them.
//!
//! Each status enum exposes `valid_transitions()` and `can_transition_to()`,
//! and every transition attempt goes through a guard that returns a
//! structured [`StateError`] on violation. Status strings on the wire are
//! SCREAMING_SNAKE_CASE and never diverge from the enum definitions.

pub mod contract;
pub mod error;
pub mod signature;
pub mod workflow;

pub use contract::ContractStatus;
pub use error::StateError;
pub use signature::{SignatureStatus, SignatureType};
pub use workflow::{WorkflowStatus, WorkflowStep};
