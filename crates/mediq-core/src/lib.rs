//! Mediq Core — Transport-agnostic diagnostic pipeline engine.
//!
//! This crate contains the domain logic for staged medical symptom analysis:
//! the role/task catalog, capability registry, sequential pipeline engine,
//! rate limiter, and the service facade. It has **no HTTP framework
//! dependency** by default, making it suitable for use in:
//!
//! - HTTP servers (via `mediq-server`)
//! - CLI tools (via `mediq-cli`)
//! - Direct library embedding
//!
//! # Feature Flags
//!
//! - `axum` — Enables `IntoResponse` impl on `CoreError` for use in axum handlers.

pub mod agent;
pub mod backend;
pub mod capability;
pub mod catalog;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod rate_limit;
pub mod service;

// Convenience re-exports
pub use backend::{HttpBackend, InferenceBackend, InvocationRequest};
pub use config::ServiceConfig;
pub use error::{CoreError, Result};
pub use service::{DiagnosticService, HealthStatus, ResultEnvelope};
