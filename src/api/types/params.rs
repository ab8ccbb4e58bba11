//! Request parameter extractor reading the query string and urlencoded forms

use std::collections::HashMap;

use axum::{
    extract::{FromRequest, Query, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// Extracts `T` from query parameters merged with an urlencoded form body
///
/// A parameter may come from either source; the query string wins when both
/// carry the same name. Failures are returned as JSON API errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Params<T>(pub T);

impl<S, T> FromRequest<S> for Params<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(mut params) = Query::<HashMap<String, String>>::try_from_uri(req.uri())
            .map_err(|e| {
                ApiError::bad_request(format!("Invalid query string: {}", e.body_text()))
            })?;

        if is_form_request(&req) {
            let Form(form) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| {
                    ApiError::bad_request(format!("Invalid form body: {}", e.body_text()))
                })?;

            for (name, value) in form {
                params.entry(name).or_insert(value);
            }
        }

        let value = serde_json::to_value(params)
            .map_err(|e| ApiError::internal(format!("Failed to collect parameters: {}", e)))?;

        serde_json::from_value(value)
            .map(Params)
            .map_err(|e| ApiError::bad_request(format!("Invalid request parameters: {}", e)))
    }
}

fn is_form_request(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}
