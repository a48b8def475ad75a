//! # xpert-core
//!
//! Core types, traits, and abstractions for xpert.
//!
//! This crate provides the data model (experts, meta-experts, jobs, tags),
//! the shared error type, and the collaborator traits that the inference,
//! storage and resolution crates depend on.

pub mod defaults;
pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
