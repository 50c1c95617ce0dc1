use thiserror::Error;

use crate::catalog::validation::ValidationError;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Malformed food id: {0}")]
    MalformedId(String),

    #[error("Food item not found")]
    NotFound,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal catalog error")]
    InternalCatalogError,
}
