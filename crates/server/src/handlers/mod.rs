//! HTTP request handlers.

pub mod contacts;
pub mod health;

pub use contacts::*;
pub use health::*;
