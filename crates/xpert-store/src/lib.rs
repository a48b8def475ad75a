//! # xpert-store
//!
//! Backend persistence for xpert.
//!
//! - [`HttpStore`]: client for the backend REST API (meta-experts, tags,
//!   expert audit rows, spend records)
//! - [`MemoryStore`]: in-process implementation of the same traits, used
//!   for dry runs and tests

pub mod config;
pub mod http;
pub mod memory;

pub use config::StoreConfig;
pub use http::HttpStore;
pub use memory::MemoryStore;
