//! Food catalog module.
//!
//! The catalog is the record contract of the food store: what a valid entry looks
//! like, how entries are identified, and what each operation accepts and returns.
//!
//! ## Components
//!
//! - **Record**: the [`record::FoodRecord`] shape and its merge patch
//! - **Validation**: turns untyped request payloads into typed records or patches,
//!   naming every offending field on failure
//! - **Naming**: store-generated ids and the id-or-name key resolution
//! - **Store service**: the storage backend, an in-memory map optionally mirrored
//!   to a JSON snapshot
//! - **Food API service**: the dispatcher composing the eight record operations
//!   out of store primitives
//!
//! ## Request flow
//!
//! An inbound payload is validated by [`validation::FoodValidator`] before any
//! store access, then dispatched as a [`api::FoodRequest`] to the
//! [`api::foods::FoodApiService`], which maps the outcome to a
//! [`api::FoodResponse`] or a [`error::CatalogError`].

use std::{path::PathBuf, time::Duration};

pub mod api;
pub mod error;
pub mod naming;
pub mod record;
pub mod services;
pub mod validation;

/// Standard food API stack backed by the bundled store service.
pub type FoodApiDefaultStack = api::foods::FoodApiService<services::store::StoreService>;

/// Initialize the catalog with a memory-only store.
///
/// # Arguments
/// * `storage_timeout` - Upper bound on each store call (None for unbounded)
///
/// # Returns
/// The food API service, and the store handle it dispatches to
pub fn init_catalog(
    storage_timeout: Option<Duration>,
) -> (FoodApiDefaultStack, services::store::StoreService) {
    let store = services::store::StoreService::new();
    let foods = api::foods::FoodApiService::new(store.clone()).with_storage_timeout(storage_timeout);
    (foods, store)
}

/// Initialize the catalog with a store persisted to a JSON snapshot.
///
/// The snapshot is loaded before the service is returned, so a corrupted or
/// unreadable snapshot is reported at startup.
///
/// # Arguments
/// * `snapshot` - Path of the JSON snapshot file
/// * `storage_timeout` - Upper bound on each store call (None for unbounded)
///
/// # Returns
/// The food API service, and the store handle to flush at shutdown
pub async fn init_catalog_with_snapshot(
    snapshot: impl Into<PathBuf>,
    storage_timeout: Option<Duration>,
) -> Result<(FoodApiDefaultStack, services::store::StoreService), error::CatalogError> {
    let store = services::store::StoreService::open(snapshot).await?;
    let foods = api::foods::FoodApiService::new(store.clone()).with_storage_timeout(storage_timeout);
    Ok((foods, store))
}
