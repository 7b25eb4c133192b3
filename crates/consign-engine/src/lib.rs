//! # consign-engine — Contract Lifecycle & Signing Workflow Engine
//!
//! The engine owns all contract-domain state and sequencing rules:
//!
//! - [`store::Store`] — thread-safe in-memory document stores, one per
//!   collection (contracts, templates, workflows, signatures).
//! - [`audit::AuditLog`] — append-only, hash-chained audit trail.
//! - [`workflow::SigningWorkflowEngine`] — workflow creation and step
//!   progression.
//! - [`signature::SignatureTracker`] — per-signer signature request
//!   lifecycle, including lazy expiration.
//! - [`lifecycle::ContractLifecycleManager`] — the top-level orchestrator:
//!   contract creation, dispatch, signing, decline, cancellation, and
//!   status reconciliation.
//! - [`template::TemplateCatalog`] — reusable contract templates with
//!   soft delete.
//!
//! Every operation is synchronous; callers coordinate through the stores'
//! per-record atomic `try_update`, never through cross-record transactions.
//! Status reconciliation (`check_contract_completion`) is idempotent and
//! re-runnable, so a crash between related writes self-heals on the next
//! signature event.

pub mod audit;
pub mod contract;
pub mod error;
pub mod lifecycle;
pub mod sequence;
pub mod signature;
pub mod store;
pub mod template;
pub mod workflow;

pub use audit::{AuditLog, AuditLogEntry, ClientMeta};
pub use contract::{ContractPatch, ContractRecord, NewContract, PartyInput};
pub use error::EngineError;
pub use lifecycle::{ContractLifecycleManager, SignRequest};
pub use sequence::ContractNumberAllocator;
pub use signature::{SignatureRecord, SignatureTracker};
pub use store::Store;
pub use template::{NewTemplate, TemplateCatalog, TemplatePatch, TemplateRecord};
pub use workflow::{SigningWorkflowEngine, WorkflowRecord};
