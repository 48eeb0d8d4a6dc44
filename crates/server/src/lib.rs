//! HTTP API server for Leadline contact leads.
//!
//! This crate provides:
//! - The `contacts` REST resource (list, create, show, update, delete)
//! - Multipart lead forms with an optional attachment
//! - Public attachment serving and a health probe
//! - Prometheus metrics

pub mod envelope;
pub mod error;
pub mod form;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod service;
pub mod state;

pub use envelope::{Envelope, LeadResource};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use service::{LeadError, LeadService};
pub use state::AppState;
