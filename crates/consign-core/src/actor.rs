//! # Actor Identity
//!
//! Every mutation in the platform is attributed to an [`Actor`]: either a
//! named user or the system itself. The distinction is a real enum, not a
//! magic `"system"` string — request-header extraction happens once at the
//! HTTP edge, and everything below it receives an explicit value.

use serde::{Deserialize, Serialize};

/// The principal responsible for an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    /// A user identified by the caller (opaque user id).
    User(String),
    /// The platform itself, for automated transitions such as signature
    /// materialization or lazy expiration.
    System,
}

impl Actor {
    /// Create a user actor.
    pub fn user(id: impl Into<String>) -> Self {
        Self::User(id.into())
    }

    /// Whether this actor is the system.
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }

    /// The string recorded in the audit log `actor` field.
    pub fn as_audit_str(&self) -> &str {
        match self {
            Self::User(id) => id,
            Self::System => "system",
        }
    }

    /// The actor classification recorded alongside the actor string.
    pub fn actor_type(&self) -> ActorType {
        match self {
            Self::User(_) => ActorType::User,
            Self::System => ActorType::System,
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_audit_str())
    }
}

/// Audit classification of an [`Actor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorType {
    /// A human or service acting under a user identity.
    User,
    /// The platform itself.
    System,
}

impl ActorType {
    /// Canonical string form, as stored in audit records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::System => "SYSTEM",
        }
    }
}

impl std::fmt::Display for ActorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_actor_carries_id() {
        let actor = Actor::user("user-42");
        assert!(!actor.is_system());
        assert_eq!(actor.as_audit_str(), "user-42");
        assert_eq!(actor.actor_type(), ActorType::User);
    }

    #[test]
    fn system_actor_audit_form() {
        let actor = Actor::System;
        assert!(actor.is_system());
        assert_eq!(actor.as_audit_str(), "system");
        assert_eq!(actor.actor_type(), ActorType::System);
    }

    #[test]
    fn actor_type_serializes_screaming() {
        assert_eq!(
            serde_json::to_string(&ActorType::System).unwrap(),
            "\"SYSTEM\""
        );
        assert_eq!(serde_json::to_string(&ActorType::User).unwrap(), "\"USER\"");
    }
}
