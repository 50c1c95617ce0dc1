//! Food API service implementation.
//!
//! `FoodApiService` is the single dispatcher of the catalog. It receives
//! already-validated [`FoodRequest`]s and composes each operation out of the
//! store primitives of [`StoreRequest`]:
//!
//! - **Create**: `Insert`, the store assigns the id
//! - **ListAll**: `List`
//! - **GetById / GetByName**: `Get` / `FindByName`
//! - **UpdateById**: `Update`
//! - **UpdateByName**: `FindByName`, then `Update` on the matched id
//! - **DeleteById / DeleteByName**: `Remove`, after `FindByName` for the latter
//!
//! A lookup that matches nothing becomes [`CatalogError::NotFound`]. When a storage
//! timeout is configured, every store call exceeding it fails with
//! [`CatalogError::StorageUnavailable`] instead of blocking the request.

use std::{future::Future, pin::Pin, task::Poll, time::Duration};

use tower::{Service, ServiceExt};
#[cfg(feature = "foodstore_tracing")]
use tracing::{info, warn};

use crate::catalog::{
    api::types::{FoodRequest, FoodResponse, StoreRequest, StoreResponse},
    error::CatalogError,
    record::FoodRecord,
};

/// Food API Service
///
/// Dispatches food operations to a storage backend `S`. The backend is shared by
/// every clone of the service, so the service can be handed to concurrently
/// running request handlers.
#[derive(Debug, Clone)]
pub struct FoodApiService<S> {
    /// Storage backend answering store primitives
    store: S,
    /// Upper bound on each store call, unbounded when `None`
    storage_timeout: Option<Duration>,
}

impl<S> FoodApiService<S> {
    /// Creates a new food API service on top of the provided store
    pub fn new(store: S) -> Self {
        Self { store, storage_timeout: None }
    }

    /// Bounds every store call by `timeout`
    pub fn with_storage_timeout(self, timeout: Option<Duration>) -> Self {
        Self { storage_timeout: timeout, ..self }
    }

    /// Storage backend of this service
    pub fn store(&self) -> &S {
        &self.store
    }
}

async fn dispatch<S>(
    store: S,
    timeout: Option<Duration>,
    request: StoreRequest,
) -> Result<StoreResponse, CatalogError>
where
    S: Service<StoreRequest, Response = StoreResponse, Error = CatalogError>,
{
    let call = store.oneshot(request);
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, call).await.map_err(|_| {
            #[cfg(feature = "foodstore_tracing")]
            warn!("[foods] store call timed out after {:?}", timeout);
            CatalogError::StorageUnavailable(format!(
                "no response within {} ms",
                timeout.as_millis()
            ))
        })?,
        None => call.await,
    }
}

fn record(response: StoreResponse) -> Result<FoodRecord, CatalogError> {
    match response {
        StoreResponse::Record(record) | StoreResponse::MaybeRecord(Some(record)) => Ok(record),
        StoreResponse::MaybeRecord(None) => Err(CatalogError::NotFound),
        StoreResponse::Records(_) => Err(CatalogError::InternalCatalogError),
    }
}

impl<S> Service<FoodRequest> for FoodApiService<S>
where
    S: Service<StoreRequest, Response = StoreResponse, Error = CatalogError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = FoodResponse;
    type Error = CatalogError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: FoodRequest) -> Self::Future {
        let store = self.store.clone();
        let timeout = self.storage_timeout;
        Box::pin(async move {
            let call = move |request| dispatch(store.clone(), timeout, request);
            match request {
                FoodRequest::Create(food) => {
                    #[cfg(feature = "foodstore_tracing")]
                    info!("[foods] Create: food_item_name: {}", food.food_item_name);
                    record(call(StoreRequest::Insert(food)).await?).map(FoodResponse::Record)
                }
                FoodRequest::ListAll => {
                    #[cfg(feature = "foodstore_tracing")]
                    info!("[foods] ListAll");
                    match call(StoreRequest::List).await? {
                        StoreResponse::Records(records) => Ok(FoodResponse::Records(records)),
                        _ => Err(CatalogError::InternalCatalogError),
                    }
                }
                FoodRequest::GetById(id) => {
                    #[cfg(feature = "foodstore_tracing")]
                    info!("[foods] GetById: id: {}", id);
                    record(call(StoreRequest::Get(id)).await?).map(FoodResponse::Record)
                }
                FoodRequest::GetByName(name) => {
                    #[cfg(feature = "foodstore_tracing")]
                    info!("[foods] GetByName: name: {:?}", name);
                    record(call(StoreRequest::FindByName(name)).await?).map(FoodResponse::Record)
                }
                FoodRequest::UpdateById { id, patch } => {
                    #[cfg(feature = "foodstore_tracing")]
                    info!("[foods] UpdateById: id: {}, patch: {:?}", id, patch);
                    record(call(StoreRequest::Update { id, patch }).await?)
                        .map(FoodResponse::Record)
                }
                FoodRequest::UpdateByName { name, patch } => {
                    #[cfg(feature = "foodstore_tracing")]
                    info!("[foods] UpdateByName: name: {:?}, patch: {:?}", name, patch);
                    let target = record(call(StoreRequest::FindByName(name)).await?)?;
                    // Removed concurrently since the lookup: reported as not found
                    record(call(StoreRequest::Update { id: target.id, patch }).await?)
                        .map(FoodResponse::Record)
                }
                FoodRequest::DeleteById(id) => {
                    #[cfg(feature = "foodstore_tracing")]
                    info!("[foods] DeleteById: id: {}", id);
                    record(call(StoreRequest::Remove(id)).await?)
                        .map(|removed| FoodResponse::Deleted(removed.id))
                }
                FoodRequest::DeleteByName(name) => {
                    #[cfg(feature = "foodstore_tracing")]
                    info!("[foods] DeleteByName: name: {:?}", name);
                    let target = record(call(StoreRequest::FindByName(name)).await?)?;
                    record(call(StoreRequest::Remove(target.id)).await?)
                        .map(|removed| FoodResponse::Deleted(removed.id))
                }
            }
        })
    }
}
