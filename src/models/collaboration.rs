use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

use super::double_option;

/// Collaboration
///
/// A partner institution or company shown on the collaborations page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Collaboration {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub organization: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub country: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_COLLABORATION_TYPE: &str = "other";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default, PartialEq)]
pub struct CreateCollaborationRequest {
    pub slug: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub organization: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub country: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default, PartialEq)]
pub struct UpdateCollaborationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub organization: Option<Option<String>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub logo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub link: Option<Option<String>>,
}

impl UpdateCollaborationRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.organization.is_none()
            && self.kind.is_none()
            && self.country.is_none()
            && self.logo_url.is_none()
            && self.description.is_none()
            && self.link.is_none()
    }
}
