//! Person entity and the typed inputs parsed from raw query parameters.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// A stored person record as exposed on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,
    pub first_name: String,
    pub name: String,
}

/// Input for creating a person. Both fields must be present and non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPerson {
    pub first_name: String,
    pub name: String,
}

impl NewPerson {
    /// Parse from raw query parameters. Missing or empty required
    /// parameters are rejected before the gateway is involved.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, ApiError> {
        Ok(NewPerson {
            first_name: required(params, "firstname")?,
            name: required(params, "name")?,
        })
    }
}

/// Field overwrites for an update. An absent or empty parameter leaves
/// the stored value unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonChanges {
    pub first_name: Option<String>,
    pub name: Option<String>,
}

impl PersonChanges {
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        PersonChanges {
            first_name: supplied(params, "firstname"),
            name: supplied(params, "name"),
        }
    }
}

/// List filters. Each supplied term is matched case-insensitively as a
/// substring; both terms are ANDed when present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonFilter {
    pub first_name: Option<String>,
    pub name: Option<String>,
}

impl PersonFilter {
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        PersonFilter {
            first_name: supplied(params, "firstname"),
            name: supplied(params, "name"),
        }
    }
}

/// Parse the `id` query parameter into a UUID.
pub fn parse_person_id(params: &HashMap<String, String>) -> Result<Uuid, ApiError> {
    let raw = params
        .get("id")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("id is required".into()))?;
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("invalid uuid".into()))
}

fn required(params: &HashMap<String, String>, key: &str) -> Result<String, ApiError> {
    supplied(params, key).ok_or_else(|| ApiError::BadRequest(format!("{} is required", key)))
}

/// Empty strings count as absent, mirroring how the filters and update
/// fields treat `?name=`.
fn supplied(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).filter(|s| !s.is_empty()).cloned()
}
