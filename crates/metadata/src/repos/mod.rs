//! Repository traits for metadata operations.

pub mod leads;

pub use leads::LeadRepo;
