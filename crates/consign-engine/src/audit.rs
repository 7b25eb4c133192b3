//! # Append-Only Audit Log
//!
//! Every contract mutation appends an entry with a SHA-256 hash chaining
//! to the previous entry, forming a tamper-evident log. Entries are never
//! updated or deleted; the log exposes only append and query operations.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use consign_core::{Actor, ActorType, ContractId};

const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// An immutable audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// The contract this entry belongs to.
    pub contract_id: ContractId,
    /// Free-form event name (`CONTRACT_CREATED`, `DOCUMENT_SIGNED`, ...).
    pub action: String,
    /// Audit string of the responsible actor.
    pub actor: String,
    /// Whether a user or the system performed the action.
    pub actor_type: ActorType,
    /// Event-specific detail payload.
    pub details: serde_json::Value,
    /// Client IP, when the action came through a signing endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Client user agent, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Server-stamped time of the event.
    pub timestamp: DateTime<Utc>,
    /// Hash of the previous entry in the chain.
    pub previous_hash: String,
    /// SHA-256 over this entry's fields and the previous hash.
    pub entry_hash: String,
}

/// Client metadata captured at the HTTP edge for signing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    /// Client IP address, if forwarded.
    pub ip_address: Option<String>,
    /// Client user agent, if sent.
    pub user_agent: Option<String>,
}

/// Append-only, hash-chained audit log.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
}

impl Clone for AuditLog {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl AuditLog {
    /// Create an empty audit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. The timestamp is server-stamped and the hash chain
    /// extended under the same write lock, so entries are totally ordered.
    pub fn append(
        &self,
        contract_id: ContractId,
        action: impl Into<String>,
        actor: &Actor,
        details: serde_json::Value,
        meta: &ClientMeta,
    ) -> AuditLogEntry {
        let mut entries = self.entries.write();
        let previous_hash = entries
            .last()
            .map(|e| e.entry_hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());

        let action = action.into();
        // Postgres keeps microseconds; truncate so recomputed hashes
        // survive a persistence round-trip.
        let timestamp = Utc::now().trunc_subsecs(6);
        let actor_str = actor.as_audit_str().to_string();
        let entry_hash = chain_hash(
            &previous_hash,
            contract_id,
            &action,
            &actor_str,
            &timestamp,
            &details,
        );
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            contract_id,
            action,
            actor: actor_str,
            actor_type: actor.actor_type(),
            details,
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
            timestamp,
            previous_hash,
            entry_hash,
        };
        entries.push(entry.clone());
        entry
    }

    /// All entries for a contract, chronological.
    pub fn for_contract(&self, contract_id: ContractId) -> Vec<AuditLogEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.contract_id == contract_id)
            .cloned()
            .collect()
    }

    /// Entries recorded for an actor string, reverse-chronological,
    /// paginated.
    pub fn by_actor(&self, actor: &str, limit: usize, offset: usize) -> Vec<AuditLogEntry> {
        self.entries
            .read()
            .iter()
            .rev()
            .filter(|e| e.actor == actor)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Every entry in insertion order. Used for persistence write-through.
    pub fn all(&self) -> Vec<AuditLogEntry> {
        self.entries.read().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verify the whole chain: every entry's `previous_hash` must match
    /// the prior entry's `entry_hash`, and every `entry_hash` must
    /// recompute from the entry's own fields, so edits to an entry's
    /// payload are detected even when its stored hashes are untouched.
    pub fn verify_chain(&self) -> bool {
        let entries = self.entries.read();
        let mut last_hash: Option<&str> = None;
        for entry in entries.iter() {
            if let Some(expected_prev) = last_hash {
                if entry.previous_hash != expected_prev {
                    return false;
                }
            }
            let recomputed = chain_hash(
                &entry.previous_hash,
                entry.contract_id,
                &entry.action,
                &entry.actor,
                &entry.timestamp,
                &entry.details,
            );
            if entry.entry_hash != recomputed {
                return false;
            }
            last_hash = Some(&entry.entry_hash);
        }
        true
    }

    /// Replace the log contents with persisted entries at hydration.
    /// Entries must already be in chain order.
    pub fn restore(&self, restored: Vec<AuditLogEntry>) {
        *self.entries.write() = restored;
    }
}

/// The hash input is a pipe-joined field string; `details` uses its
/// serde_json display form, which orders map keys deterministically.
fn chain_hash(
    previous_hash: &str,
    contract_id: ContractId,
    action: &str,
    actor: &str,
    timestamp: &DateTime<Utc>,
    details: &serde_json::Value,
) -> String {
    let input = format!(
        "{previous_hash}|{contract_id}|{action}|{actor}|{}|{details}",
        timestamp.to_rfc3339(),
    );
    sha256_hex(&input)
}

/// Compute SHA-256 hex digest of input string.
fn sha256_hex(input: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    result.iter().map(|b| format!("{b:02x}")).collect()
}
