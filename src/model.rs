//! Contact documents as stored and served, plus the JSON request bodies.

use serde::{Deserialize, Serialize};

/// Backend-internal document identity, assigned by the store on first insert.
pub type DocumentId = String;

/// A single contact as stored in the backend and mirrored in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub name: String,
    pub number: String,
    #[serde(rename = "resourceId")]
    pub resource_id: i64,
}

impl ContactRecord {
    /// Builds a record that has not been persisted yet.
    pub fn new(name: impl Into<String>, number: impl Into<String>, resource_id: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            number: number.into(),
            resource_id,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Body of `POST /api/contacts`.
///
/// Fields are optional on the wire so that missing values reach the gateway
/// and fail validation there, like any other malformed record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
}

/// Body of `PUT /api/contacts/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContactRequest {
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub contacts: usize,
}
