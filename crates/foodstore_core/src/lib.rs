//! A record store for food nutrition entries.
//!
//! This crate holds the record contract of the food store: the shape of a valid
//! entry, the identifier scheme, and the semantics of the create, list, get,
//! update and delete operations. Records are addressed either by a generated
//! [`catalog::naming::FoodId`] or by their human-readable `food_item_name`.
//!
//! Operations are modelled as [`tower`] services so that the storage backend and
//! the transport are swappable: the [`catalog::api::FoodApiService`] dispatcher
//! is generic over any store answering [`catalog::api::StoreRequest`]s, and the
//! [`transport::http`] module exposes the dispatcher over HTTP with [`axum`].
//!
//! [`tower`]: https://docs.rs/tower
//! [`axum`]: https://docs.rs/axum

#[cfg(test)]
mod tests;

pub mod catalog;
pub mod transport;

#[cfg(feature = "foodstore_tracing")]
pub mod foodstore_tracing {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize tracing for tests
    /// This sets up a tracing subscriber that will display logs during test execution.
    /// Call this at the beginning of tests that need to see tracing output.
    pub fn init() {
        INIT.call_once(|| {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));

            fmt()
                .with_target(false)
                .with_test_writer()
                .with_env_filter(filter)
                .init();
        });
    }
}
