//! External-facing API of the catalog.
//!
//! - **Food API**: the record operations offered to transports, served by
//!   [`foods::FoodApiService`]
//! - **Store API**: the primitives required from a storage backend

pub mod foods;
pub mod types;

// Re-export all types for convenience
pub use types::*;
