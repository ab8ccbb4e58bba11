//! Key-value CRUD endpoints
//!
//! Store failures never surface as HTTP errors: reads report per-store status
//! strings and writes always answer 200. The only non-200 outcomes are 400 for
//! malformed input and 404 for modifying a key the cache store does not hold.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Router,
};

use crate::api::state::AppState;
use crate::api::types::{ApiError, CreateParams, ModifyParams, Params, ReadResponse};
use crate::domain::{validate_key, DomainError};
use crate::infrastructure::services::ModifyOutcome;

pub const CREATED: &str = "Created";
pub const MODIFIED: &str = "Modified";
pub const MODIFIED_CACHE_UNAVAILABLE: &str = "Modified (cache unavailable)";
pub const DELETED: &str = "Deleted";

/// Create the key-value router, nested under `/api`
pub fn create_key_value_router() -> Router<AppState> {
    Router::new()
        .route("/read/{key}", get(read))
        .route("/create", post(create))
        .route("/modify/{key}", put(modify))
        .route("/delete/{key}", delete(remove))
}

/// GET /api/read/{key} - Read a key from both stores
pub async fn read(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> axum::Json<ReadResponse> {
    let outcome = state.facade.read(&key).await;

    axum::Json(ReadResponse::from(outcome))
}

/// POST /api/create - Write a key-value pair to both stores
pub async fn create(
    State(state): State<AppState>,
    Params(params): Params<CreateParams>,
) -> Result<&'static str, ApiError> {
    validate_key(&params.key).map_err(|e| ApiError::from(e).with_param("key"))?;

    state.facade.create(&params.key, &params.value).await;

    Ok(CREATED)
}

/// PUT /api/modify/{key} - Overwrite a key the cache store already holds
pub async fn modify(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Params(params): Params<ModifyParams>,
) -> Result<&'static str, ApiError> {
    match state.facade.modify(&key, &params.value).await {
        ModifyOutcome::Modified(_) => Ok(MODIFIED),
        ModifyOutcome::CacheUnavailable => Ok(MODIFIED_CACHE_UNAVAILABLE),
        ModifyOutcome::NotFound => {
            Err(DomainError::not_found(format!("Key '{}' not found", key)).into())
        }
    }
}

/// DELETE /api/delete/{key} - Remove a key from both stores
pub async fn remove(State(state): State<AppState>, Path(key): Path<String>) -> &'static str {
    state.facade.delete(&key).await;

    DELETED
}
