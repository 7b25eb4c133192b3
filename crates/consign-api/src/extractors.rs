//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs, a helper to
//! extract + validate JSON bodies in handlers, and header readers for
//! the acting user and signing-client metadata.

use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::Json;

use consign_core::Actor;
use consign_engine::{ClientMeta, NewContract, NewTemplate, SignRequest};

use crate::error::AppError;

/// Trait for request types that can validate their business rules
/// beyond what serde deserialization checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// This is the primary extraction helper. Handlers should use:
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
///     // use req...
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
///
/// Combines deserialization error mapping with business rule validation.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Resolve the acting user from the `X-User-Id` header.
///
/// Requests without the header act as the system; internal callers
/// (schedulers, reconciliation jobs) deliberately send no user id.
pub fn actor_from_headers(headers: &HeaderMap) -> Actor {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(Actor::user)
        .unwrap_or(Actor::System)
}

/// Capture client IP and user agent for signature evidence.
///
/// The IP is the first entry of `X-Forwarded-For`, set by the edge
/// proxy. Both fields are optional.
pub fn client_meta_from_headers(headers: &HeaderMap) -> ClientMeta {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    ClientMeta {
        ip_address,
        user_agent,
    }
}

impl Validate for NewContract {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("content must not be empty".to_string());
        }
        for party in &self.parties {
            if party.name.trim().is_empty() {
                return Err("party name must not be empty".to_string());
            }
            if party.email.trim().is_empty() {
                return Err("party email must not be empty".to_string());
            }
        }
        Ok(())
    }
}

impl Validate for NewTemplate {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("content must not be empty".to_string());
        }
        Ok(())
    }
}

impl Validate for SignRequest {
    fn validate(&self) -> Result<(), String> {
        if self.signature_data.trim().is_empty() {
            return Err("signatureData must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use consign_core::ContractType;

    #[test]
    fn actor_defaults_to_system_without_header() {
        let headers = HeaderMap::new();
        assert!(actor_from_headers(&headers).is_system());
    }

    #[test]
    fn actor_reads_user_id_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("user-42"));
        let actor = actor_from_headers(&headers);
        assert_eq!(actor.as_audit_str(), "user-42");
    }

    #[test]
    fn client_meta_takes_first_forwarded_ip() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("user-agent", HeaderValue::from_static("test-agent"));
        let meta = client_meta_from_headers(&headers);
        assert_eq!(meta.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(meta.user_agent.as_deref(), Some("test-agent"));
    }

    #[test]
    fn new_contract_rejects_blank_title() {
        let input = NewContract {
            title: "  ".to_string(),
            contract_type: ContractType::Transport,
            template_id: None,
            parties: Vec::new(),
            content: "terms".to_string(),
            variables: None,
            effective_date: Utc::now(),
            expiration_date: None,
            is_sequential_signing: false,
            files: Vec::new(),
            metadata: None,
            reminder_interval_days: None,
            expiration_days: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn sign_request_requires_blob() {
        let req = SignRequest {
            signature_data: String::new(),
            geolocation: None,
        };
        assert!(req.validate().is_err());
    }
}
