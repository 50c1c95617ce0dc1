//! Record identification.
//!
//! Every record carries a [`FoodId`] assigned by the store when the record is
//! created. Ids are random v4 UUIDs, so the id of a deleted record is never handed
//! out again and keeps resolving to "not found".
//!
//! Requests may address a record either by id or by its `food_item_name`. Both
//! forms share a single path segment, so [`FoodKey::resolve`] decides which one a
//! raw key denotes: anything that parses as a [`FoodId`] is an id, everything else
//! is a name.

use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::error::CatalogError;

const HYPHENATED_LEN: usize = 36;

/// Store-generated unique identifier of a food record.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodId(Uuid);

impl FoodId {
    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for FoodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl Debug for FoodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FoodId({self})")
    }
}

impl FromStr for FoodId {
    type Err = CatalogError;

    /// Only the hyphenated form ids are displayed in is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HYPHENATED_LEN {
            return Err(CatalogError::MalformedId(s.to_string()));
        }
        Uuid::try_parse(s).map(Self).map_err(|_| CatalogError::MalformedId(s.to_string()))
    }
}

/// Lookup key of a record as received from a caller.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FoodKey {
    /// The key parsed as a record id
    Id(FoodId),
    /// Any other key, matched against `food_item_name`
    Name(String),
}

impl FoodKey {
    /// Resolves a raw key, preferring the id interpretation.
    pub fn resolve(raw: &str) -> Self {
        match raw.parse() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(raw.to_string()),
        }
    }
}

impl Display for FoodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FoodKey::Id(id) => write!(f, "id {id}"),
            FoodKey::Name(name) => write!(f, "name {name:?}"),
        }
    }
}
