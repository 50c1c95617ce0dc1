//! Catalog API type definitions.
//!
//! Two request/response pairs are defined here:
//!
//! ## Food API
//! The operation contract of the catalog as seen by a transport: create, list,
//! get, update and delete, the last three addressable by id or by name.
//!
//! ## Store API
//! The primitives a storage backend has to offer for the food API to be built on
//! top of it: insertion with id assignment, ordered listing, lookup by id, first
//! match by name, and per-record update and removal.

use crate::catalog::{
    naming::{FoodId, FoodKey},
    record::{Food, FoodPatch, FoodRecord},
};

/// Food API request types.
#[derive(Debug, Clone, PartialEq)]
pub enum FoodRequest {
    /// Store a new record. The store assigns its id.
    Create(Food),

    /// Retrieve every stored record, in store order.
    ListAll,

    /// Retrieve the record with the given id.
    GetById(FoodId),

    /// Retrieve the first record whose `food_item_name` equals the given name.
    GetByName(String),

    /// Merge a patch into the record with the given id.
    UpdateById {
        /// Target record
        id: FoodId,
        /// Fields to overwrite
        patch: FoodPatch,
    },

    /// Merge a patch into the first record with the given name.
    UpdateByName {
        /// `food_item_name` of the target record
        name: String,
        /// Fields to overwrite
        patch: FoodPatch,
    },

    /// Remove the record with the given id.
    DeleteById(FoodId),

    /// Remove the first record with the given name.
    DeleteByName(String),
}

impl FoodRequest {
    /// Lookup addressed by a resolved key.
    pub fn get(key: FoodKey) -> Self {
        match key {
            FoodKey::Id(id) => Self::GetById(id),
            FoodKey::Name(name) => Self::GetByName(name),
        }
    }

    /// Update addressed by a resolved key.
    pub fn update(key: FoodKey, patch: FoodPatch) -> Self {
        match key {
            FoodKey::Id(id) => Self::UpdateById { id, patch },
            FoodKey::Name(name) => Self::UpdateByName { name, patch },
        }
    }

    /// Deletion addressed by a resolved key.
    pub fn delete(key: FoodKey) -> Self {
        match key {
            FoodKey::Id(id) => Self::DeleteById(id),
            FoodKey::Name(name) => Self::DeleteByName(name),
        }
    }
}

/// Food API response types.
#[derive(Debug, Clone, PartialEq)]
pub enum FoodResponse {
    /// A single record, as stored after the operation.
    Record(FoodRecord),

    /// Every stored record.
    Records(Vec<FoodRecord>),

    /// Confirmation that the record with this id was removed.
    Deleted(FoodId),
}

/// Store API request types.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRequest {
    /// Persist a new record under a freshly generated id.
    Insert(Food),

    /// Every record, in creation order.
    List,

    /// The record with the given id.
    Get(FoodId),

    /// The earliest created record with the given `food_item_name`.
    FindByName(String),

    /// Merge a patch into a record, atomically with respect to that record.
    Update {
        /// Target record
        id: FoodId,
        /// Fields to overwrite
        patch: FoodPatch,
    },

    /// Remove a record.
    Remove(FoodId),
}

/// Store API response types.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreResponse {
    /// A record, present after the operation.
    Record(FoodRecord),

    /// A record lookup or mutation result. `None` when no record matched.
    MaybeRecord(Option<FoodRecord>),

    /// Every stored record.
    Records(Vec<FoodRecord>),
}
