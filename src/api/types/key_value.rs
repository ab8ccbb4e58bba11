//! Key-value endpoint request and response types

use serde::{Deserialize, Serialize};

use crate::infrastructure::services::ReadOutcome;

/// Body of `GET /api/read/{key}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResponse {
    pub cache: String,
    pub persistent: String,
}

impl From<ReadOutcome> for ReadResponse {
    fn from(outcome: ReadOutcome) -> Self {
        Self {
            cache: outcome.cache.into_status(),
            persistent: outcome.persistent.into_status(),
        }
    }
}

/// Parameters of `POST /api/create`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateParams {
    pub key: String,
    pub value: String,
}

/// Parameters of `PUT /api/modify/{key}`
#[derive(Debug, Clone, Deserialize)]
pub struct ModifyParams {
    pub value: String,
}
