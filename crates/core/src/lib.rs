//! Core domain types and shared logic for Leadline.
//!
//! This crate defines the data model used across all other crates:
//! - Lead submissions, partial updates and their field validation
//! - Offset pagination over the lead listing
//! - Configuration types for the server, storage and metadata store

pub mod config;
pub mod lead;
pub mod pagination;

pub use lead::{LeadChanges, LeadFields, NewLead, ValidationErrors};
pub use pagination::{LEADS_PER_PAGE, PageMeta, PageRequest};

/// Default maximum attachment size: 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
