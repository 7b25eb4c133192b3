//! Structured errors raised by engine operations.
//!
//! The taxonomy maps one-to-one onto HTTP outcomes at the API layer:
//! validation failures to 422, missing records to 404, and every
//! state-rule violation (wrong lifecycle state, terminal signature,
//! duplicate request, out-of-order signing, expiration) to 409.

use chrono::{DateTime, Utc};
use thiserror::Error;

use consign_core::{ContractId, SignatureId, ValidationError};
use consign_state::{ContractStatus, SignatureStatus, StateError};

/// Errors raised by the contract lifecycle and signing engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Business-rule validation failure; nothing was persisted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Record kind ("contract", "signature", "workflow", "template").
        kind: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// A lifecycle transition was rejected by the state machine.
    #[error(transparent)]
    State(#[from] StateError),

    /// The operation is not legal in the contract's current state.
    #[error("cannot {action} contract in state {status}")]
    InvalidContractState {
        /// The attempted operation.
        action: &'static str,
        /// The contract's current status.
        status: ContractStatus,
    },

    /// The signature request is no longer pending.
    #[error("signature {id} is {status}, not PENDING")]
    SignatureNotPending {
        /// The signature request identifier.
        id: SignatureId,
        /// Its current (terminal) status.
        status: SignatureStatus,
    },

    /// A signature request already exists for this signer on this contract.
    #[error("a signature request for {email} already exists on contract {contract_id}")]
    DuplicateSignatureRequest {
        /// The contract.
        contract_id: ContractId,
        /// The signer email.
        email: String,
    },

    /// The signing window elapsed before the signer acted. The lazy
    /// transition to EXPIRED has already been persisted when this is raised.
    #[error("signature {id} expired at {expired_at}")]
    SignatureExpired {
        /// The signature request identifier.
        id: SignatureId,
        /// When the signing window closed.
        expired_at: DateTime<Utc>,
    },

    /// A sequential contract was signed out of order.
    #[error("earlier signing steps must complete before {email} can sign")]
    SequentialOrderViolation {
        /// The signer that attempted to jump the queue.
        email: String,
    },
}

impl EngineError {
    /// Convenience constructor for missing records.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
