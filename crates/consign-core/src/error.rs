//! # Validation Error Hierarchy
//!
//! Structured validation errors, built with `thiserror`. Each variant
//! carries the offending input so operators can diagnose rejected requests
//! without guesswork. These are business-rule violations detected before
//! anything is persisted.

use thiserror::Error;

/// Business-rule validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Contracts are multi-party agreements; one party cannot contract
    /// with itself.
    #[error("contract must have at least 2 parties (got {count})")]
    TooFewParties {
        /// The number of parties supplied.
        count: usize,
    },

    /// Sequential signing requires a total order over the signing parties.
    #[error("sequential signing requires a signature order for every signing party; \"{party}\" has none")]
    MissingSignatureOrder {
        /// Name of the signing party without an order.
        party: String,
    },

    /// A required field was empty or missing.
    #[error("field \"{field}\" must be non-empty")]
    EmptyField {
        /// The field name as it appears on the wire.
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_parties_display() {
        let err = ValidationError::TooFewParties { count: 1 };
        let msg = format!("{err}");
        assert!(msg.contains("at least 2"));
        assert!(msg.contains('1'));
    }

    #[test]
    fn missing_signature_order_names_party() {
        let err = ValidationError::MissingSignatureOrder {
            party: "Nordfracht GmbH".to_string(),
        };
        assert!(format!("{err}").contains("Nordfracht GmbH"));
    }

    #[test]
    fn empty_field_names_field() {
        let err = ValidationError::EmptyField { field: "title" };
        assert!(format!("{err}").contains("title"));
    }
}
