#![deny(missing_docs)]

//! # consign-core — Foundational Types for the Consign Contract Platform
//!
//! This crate defines the foundational types that every other crate in the
//! workspace depends on. It has no internal crate dependencies — only `serde`,
//! `serde_json`, `thiserror`, `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** Every identifier is a distinct
//!    type. You cannot pass a [`SignatureId`] where a [`ContractId`] is
//!    expected.
//!
//! 2. **Explicit actor identity.** Every mutation is attributed to an
//!    [`Actor`] — a named user or the system itself. There is no implicit
//!    default identity anywhere below the HTTP edge.
//!
//! 3. **[`ValidationError`] hierarchy.** Structured errors with `thiserror` —
//!    no `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod actor;
pub mod document;
pub mod error;
pub mod identity;
pub mod party;

// Re-export primary types at crate root for ergonomic imports.
pub use actor::{Actor, ActorType};
pub use document::{ContractFile, ContractType, Geolocation, TemplateVariable, VariableType};
pub use error::ValidationError;
pub use identity::{ContractId, PartyId, SignatureId, TemplateId, WorkflowId};
pub use party::{CompanyDetails, Party, PartyRole, PartyType};
