//! # HTTP Middleware
//!
//! Request metrics and per-client rate limiting. Both read their shared
//! state from request extensions, installed as `Extension` layers in
//! [`crate::app`].

pub mod metrics;
pub mod rate_limit;
