//! # HTTP Transport Implementation
//!
//! JSON over HTTP front end of the catalog, built on [`axum`].
//!
//! ## Routes
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | POST | `/foods` | Create, `201` with the stored record |
//! | GET | `/foods` | ListAll |
//! | GET | `/foods/{key}` | GetById or GetByName |
//! | PUT | `/foods/{key}` | UpdateById or UpdateByName |
//! | DELETE | `/foods/{key}` | DeleteById or DeleteByName |
//!
//! `{key}` is resolved with [`FoodKey::resolve`]: it addresses a record by id when
//! it parses as one, and by `food_item_name` otherwise.
//!
//! ## Errors
//!
//! Every failure is answered with a `{ "message": ... }` body. Validation and
//! payload errors map to `400`, unknown records and routes to `404`, a known
//! route called with another method to `405`, and storage failures to `500`.
//! Requests the extractors reject (undecodable path segment, unreadable body)
//! count as malformed payloads.
//!
//! [`axum`]: https://docs.rs/axum

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Path, State,
        rejection::{BytesRejection, PathRejection},
    },
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower::{Service, ServiceExt, util::BoxCloneSyncService};
use tower_http::cors::CorsLayer;

use crate::catalog::{
    api::{FoodRequest, FoodResponse},
    error::CatalogError,
    naming::FoodKey,
    record::FoodRecord,
    validation::{FoodValidator, parse_payload},
};

/// Default port of the HTTP transport.
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Confirmation message of a successful deletion.
pub const DELETED_MESSAGE: &str = "Food item deleted successfully";

/// Food API service shared by the HTTP handlers.
pub type FoodHandle = BoxCloneSyncService<FoodRequest, FoodResponse, CatalogError>;

/// Body of error responses and confirmations.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self { message: message.into() })
    }
}

impl CatalogError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            CatalogError::Validation(_)
            | CatalogError::MalformedPayload(_)
            | CatalogError::MalformedId(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound => StatusCode::NOT_FOUND,
            CatalogError::StorageUnavailable(_) | CatalogError::InternalCatalogError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<PathRejection> for CatalogError {
    fn from(rejection: PathRejection) -> Self {
        CatalogError::MalformedPayload(rejection.body_text())
    }
}

impl From<BytesRejection> for CatalogError {
    fn from(rejection: BytesRejection) -> Self {
        CatalogError::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        (self.status(), Message::new(self.to_string())).into_response()
    }
}

/// Builds the HTTP router serving the food API.
///
/// The service is boxed and injected as router state, so every handler works on
/// its own clone of the same catalog.
pub fn router<S>(foods: S) -> Router
where
    S: Service<FoodRequest, Response = FoodResponse, Error = CatalogError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    Router::new()
        .route("/foods", post(create_food).get(list_foods))
        .route("/foods/{key}", get(get_food).put(update_food).delete(delete_food))
        .fallback(unknown_route)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CorsLayer::permissive())
        .with_state(BoxCloneSyncService::new(foods))
}

fn into_record(response: FoodResponse) -> Result<FoodRecord, CatalogError> {
    match response {
        FoodResponse::Record(record) => Ok(record),
        _ => Err(CatalogError::InternalCatalogError),
    }
}

async fn create_food(
    State(foods): State<FoodHandle>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<FoodRecord>), CatalogError> {
    let body = body?;
    let food = FoodValidator.validate_new(&parse_payload(&body)?)?;
    let record = into_record(foods.oneshot(FoodRequest::Create(food)).await?)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_foods(State(foods): State<FoodHandle>) -> Result<Json<Vec<FoodRecord>>, CatalogError> {
    match foods.oneshot(FoodRequest::ListAll).await? {
        FoodResponse::Records(records) => Ok(Json(records)),
        _ => Err(CatalogError::InternalCatalogError),
    }
}

async fn get_food(
    State(foods): State<FoodHandle>,
    key: Result<Path<String>, PathRejection>,
) -> Result<Json<FoodRecord>, CatalogError> {
    let Path(key) = key?;
    let request = FoodRequest::get(FoodKey::resolve(&key));
    into_record(foods.oneshot(request).await?).map(Json)
}

async fn update_food(
    State(foods): State<FoodHandle>,
    key: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<FoodRecord>, CatalogError> {
    let (Path(key), body) = (key?, body?);
    let patch = FoodValidator.validate_patch(&parse_payload(&body)?)?;
    let request = FoodRequest::update(FoodKey::resolve(&key), patch);
    into_record(foods.oneshot(request).await?).map(Json)
}

async fn delete_food(
    State(foods): State<FoodHandle>,
    key: Result<Path<String>, PathRejection>,
) -> Result<Json<Message>, CatalogError> {
    let Path(key) = key?;
    match foods.oneshot(FoodRequest::delete(FoodKey::resolve(&key))).await? {
        FoodResponse::Deleted(_) => Ok(Message::new(DELETED_MESSAGE)),
        _ => Err(CatalogError::InternalCatalogError),
    }
}

async fn unknown_route(method: Method, uri: Uri) -> (StatusCode, Json<Message>) {
    (StatusCode::NOT_FOUND, Message::new(format!("Cannot {method} {}", uri.path())))
}

async fn method_not_allowed(method: Method, uri: Uri) -> (StatusCode, Json<Message>) {
    (StatusCode::METHOD_NOT_ALLOWED, Message::new(format!("Cannot {method} {}", uri.path())))
}
