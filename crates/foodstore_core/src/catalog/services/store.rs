//! Storage service for food records.
//!
//! Records live in a [`DashMap`] keyed by [`FoodId`]. Reads go straight to the
//! map. Mutations are serialized by a store-wide write lock, so an update always
//! applies its patch to the latest version of the record.
//!
//! Each record is tagged with a creation sequence number. That number defines the
//! store order: listings are returned in creation order, and a name lookup
//! resolves to the earliest created record carrying that name.
//!
//! ## Persistence
//!
//! A store opened with [`StoreService::open`] mirrors its content to a JSON
//! snapshot file. The snapshot is loaded once when the store is opened. Every
//! mutation is staged first: the snapshot of the state it would produce is
//! written to a sibling temporary file and renamed over the snapshot, and only
//! then is the change applied to the map. A mutation whose snapshot write fails,
//! or whose call is dropped while writing, leaves the records untouched. Any I/O
//! failure is reported as [`CatalogError::StorageUnavailable`].

use std::{
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    task::Poll,
};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tower::Service;
#[cfg(feature = "foodstore_tracing")]
use tracing::{debug, info};

use crate::catalog::{
    api::{StoreRequest, StoreResponse},
    error::CatalogError,
    naming::FoodId,
    record::{Food, FoodPatch, FoodRecord},
};

#[derive(Debug)]
struct StoredFood {
    /// Creation sequence number
    sequence: u64,
    record: FoodRecord,
}

/// A change to the record map, not applied yet.
enum Change {
    Insert(FoodRecord),
    Replace(FoodRecord),
    Remove(FoodId),
}

/// Food record store.
///
/// Clones share the same records, so a single store handle can be acquired at
/// startup and passed to every request.
#[derive(Debug, Clone, Default)]
pub struct StoreService {
    records: Arc<DashMap<FoodId, StoredFood>>,
    sequence: Arc<AtomicU64>,
    /// Serializes mutations and snapshot writes
    write_lock: Arc<Mutex<()>>,
    snapshot: Option<Arc<PathBuf>>,
}

fn unavailable(path: &Path, e: impl std::fmt::Display) -> CatalogError {
    CatalogError::StorageUnavailable(format!("{}: {e}", path.display()))
}

async fn write_snapshot(path: &Path, records: &[FoodRecord]) -> Result<(), CatalogError> {
    let bytes = serde_json::to_vec_pretty(records).map_err(|e| unavailable(path, e))?;
    let mut temporary = path.to_path_buf().into_os_string();
    temporary.push(".tmp");
    tokio::fs::write(&temporary, bytes).await.map_err(|e| unavailable(path, e))?;
    tokio::fs::rename(&temporary, path).await.map_err(|e| unavailable(path, e))?;
    #[cfg(feature = "foodstore_tracing")]
    debug!("[store] snapshot written to {}", path.display());
    Ok(())
}

impl StoreService {
    /// Creates an empty, memory-only store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store persisted to the JSON snapshot at `path`.
    ///
    /// A missing snapshot file yields an empty store; the file is created on the
    /// first mutation.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let records: Vec<FoodRecord> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| unavailable(&path, e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(unavailable(&path, e)),
        };
        #[cfg(feature = "foodstore_tracing")]
        info!("[store] loaded {} records from {}", records.len(), path.display());

        let store = Self { snapshot: Some(Arc::new(path)), ..Self::default() };
        for record in records {
            store.insert_record(record);
        }
        Ok(store)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes the current content to the snapshot file, if any.
    pub async fn flush(&self) -> Result<(), CatalogError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let _guard = self.write_lock.lock().await;
        write_snapshot(path, &self.list()).await
    }

    fn insert_record(&self, record: FoodRecord) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.records.insert(record.id, StoredFood { sequence, record });
    }

    fn list(&self) -> Vec<FoodRecord> {
        let mut stored: Vec<(u64, FoodRecord)> = self
            .records
            .iter()
            .map(|entry| (entry.sequence, entry.record.clone()))
            .collect();
        stored.sort_unstable_by_key(|(sequence, _)| *sequence);
        stored.into_iter().map(|(_, record)| record).collect()
    }

    fn get(&self, id: &FoodId) -> Option<FoodRecord> {
        self.records.get(id).map(|entry| entry.record.clone())
    }

    fn find_by_name(&self, name: &str) -> Option<FoodRecord> {
        self.records
            .iter()
            .filter(|entry| entry.record.name() == name)
            .min_by_key(|entry| entry.sequence)
            .map(|entry| entry.record.clone())
    }

    /// Listing the store would return once `change` is applied.
    fn staged(&self, change: &Change) -> Vec<FoodRecord> {
        let mut records = self.list();
        match change {
            Change::Insert(record) => records.push(record.clone()),
            Change::Replace(updated) => {
                if let Some(slot) = records.iter_mut().find(|record| record.id == updated.id) {
                    *slot = updated.clone();
                }
            }
            Change::Remove(id) => records.retain(|record| record.id != *id),
        }
        records
    }

    /// Persists `change`, then applies it. Callers hold the write lock.
    async fn commit(&self, change: Change) -> Result<(), CatalogError> {
        if let Some(path) = &self.snapshot {
            write_snapshot(path, &self.staged(&change)).await?;
        }
        match change {
            Change::Insert(record) => self.insert_record(record),
            Change::Replace(record) => {
                if let Some(mut entry) = self.records.get_mut(&record.id) {
                    entry.record = record;
                }
            }
            Change::Remove(id) => {
                self.records.remove(&id);
            }
        }
        Ok(())
    }

    async fn insert(&self, food: Food) -> Result<FoodRecord, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let record = FoodRecord::new(FoodId::generate(), food);
        self.commit(Change::Insert(record.clone())).await?;
        #[cfg(feature = "foodstore_tracing")]
        info!("[store] Insert: id: {}", record.id);
        Ok(record)
    }

    async fn update(
        &self,
        id: &FoodId,
        patch: FoodPatch,
    ) -> Result<Option<FoodRecord>, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let Some(mut record) = self.get(id) else {
            return Ok(None);
        };
        record.food.apply(patch);
        self.commit(Change::Replace(record.clone())).await?;
        #[cfg(feature = "foodstore_tracing")]
        info!("[store] Update: id: {}", id);
        Ok(Some(record))
    }

    async fn remove(&self, id: &FoodId) -> Result<Option<FoodRecord>, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let Some(record) = self.get(id) else {
            return Ok(None);
        };
        self.commit(Change::Remove(record.id)).await?;
        #[cfg(feature = "foodstore_tracing")]
        info!("[store] Remove: id: {}", id);
        Ok(Some(record))
    }
}

impl Service<StoreRequest> for StoreService {
    type Response = StoreResponse;
    type Error = CatalogError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: StoreRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            match request {
                StoreRequest::Insert(food) => Ok(StoreResponse::Record(this.insert(food).await?)),
                StoreRequest::List => Ok(StoreResponse::Records(this.list())),
                StoreRequest::Get(id) => Ok(StoreResponse::MaybeRecord(this.get(&id))),
                StoreRequest::FindByName(name) => {
                    Ok(StoreResponse::MaybeRecord(this.find_by_name(&name)))
                }
                StoreRequest::Update { id, patch } => {
                    Ok(StoreResponse::MaybeRecord(this.update(&id, patch).await?))
                }
                StoreRequest::Remove(id) => {
                    Ok(StoreResponse::MaybeRecord(this.remove(&id).await?))
                }
            }
        })
    }
}
