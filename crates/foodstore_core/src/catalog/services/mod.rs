//! Backing services of the catalog.
//!
//! - **Store**: record persistence, answering the store API

pub mod store;
