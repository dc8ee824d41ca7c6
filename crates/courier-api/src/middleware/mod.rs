//! HTTP middleware for credential checks and request processing.
//!
//! Provides the Authorization-presence middleware guarding the admission
//! endpoint.
pub mod auth;
