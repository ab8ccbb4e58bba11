//! Key-value record entity

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A single key-value pair as held by either store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueRecord {
    key: String,
    value: String,
}

impl KeyValueRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_value(self) -> String {
        self.value
    }
}

/// Rejects keys the transport layer must never hand to a store
pub fn validate_key(key: &str) -> Result<(), DomainError> {
    if key.is_empty() {
        return Err(DomainError::validation("key must not be empty"));
    }

    Ok(())
}
