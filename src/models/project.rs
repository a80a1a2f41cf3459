use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

use super::double_option;
use crate::codec::{self, DecodeError};

/// Project
///
/// A research or student project. `metadata` is a free-form object and `gallery`,
/// `features`, `content_blocks` are free-form arrays owned by the frontend editor.
/// `team_members` is only populated on detail reads.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Project {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub category: Option<String>,
    pub status: String,
    pub thumbnail_url: Option<String>,
    pub banner_url: Option<String>,
    pub qr_code_url: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub demo_url: Option<String>,
    pub repo_url: Option<String>,
    pub paper_url: Option<String>,
    pub video_url: Option<String>,
    #[ts(type = "Record<string, unknown>")]
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub gallery: Vec<Value>,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub features: Vec<Value>,
    pub tags: Vec<String>,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub content_blocks: Vec<Value>,
    #[ts(type = "string | null")]
    pub project_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub is_featured: bool,
    pub is_published: bool,
    pub display_order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub team_members: Option<Vec<ProjectMember>>,
}

/// Raw `projects` row; the JSON-valued columns are still TEXT.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub category: Option<String>,
    pub status: String,
    pub thumbnail_url: Option<String>,
    pub banner_url: Option<String>,
    pub qr_code_url: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub demo_url: Option<String>,
    pub repo_url: Option<String>,
    pub paper_url: Option<String>,
    pub video_url: Option<String>,
    pub metadata: String,
    pub gallery: String,
    pub features: String,
    pub tags: String,
    pub content_blocks: String,
    pub project_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub is_featured: bool,
    pub is_published: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRow {
    pub fn decode(self) -> Result<Project, DecodeError> {
        Ok(Project {
            metadata: codec::decode("projects", "metadata", &self.metadata)?,
            gallery: codec::decode("projects", "gallery", &self.gallery)?,
            features: codec::decode("projects", "features", &self.features)?,
            tags: codec::decode("projects", "tags", &self.tags)?,
            content_blocks: codec::decode("projects", "content_blocks", &self.content_blocks)?,
            id: self.id,
            slug: self.slug,
            title: self.title,
            category: self.category,
            status: self.status,
            thumbnail_url: self.thumbnail_url,
            banner_url: self.banner_url,
            qr_code_url: self.qr_code_url,
            short_description: self.short_description,
            full_description: self.full_description,
            demo_url: self.demo_url,
            repo_url: self.repo_url,
            paper_url: self.paper_url,
            video_url: self.video_url,
            project_date: self.project_date,
            year: self.year,
            is_featured: self.is_featured,
            is_published: self.is_published,
            display_order: self.display_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
            team_members: None,
        })
    }
}

/// ProjectMember
///
/// One entry of a project's team, referencing a member by slug.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Validate, Default, PartialEq)]
#[ts(export)]
pub struct ProjectMember {
    #[validate(length(min = 1, message = "team member slug is required"))]
    pub member_slug: String,
    pub role: Option<String>,
}

/// ProjectCategory
///
/// Lookup entry used to group projects in the frontend.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct ProjectCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub display_order: i32,
}

/// ProjectMutationResponse
///
/// Body of admin create/update: the confirmation plus the stored project.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProjectMutationResponse {
    pub message: String,
    pub id: i64,
    pub slug: String,
    pub project: Project,
}

pub const DEFAULT_PROJECT_STATUS: &str = "ongoing";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default, PartialEq)]
pub struct CreateProjectRequest {
    pub slug: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub category: Option<String>,
    pub status: Option<String>,
    pub thumbnail_url: Option<String>,
    pub banner_url: Option<String>,
    pub qr_code_url: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub demo_url: Option<String>,
    pub repo_url: Option<String>,
    pub paper_url: Option<String>,
    pub video_url: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Map<String, Value>>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub gallery: Option<Vec<Value>>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub features: Option<Vec<Value>>,
    pub tags: Option<Vec<String>>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub content_blocks: Option<Vec<Value>>,
    pub project_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub is_featured: Option<bool>,
    pub is_published: Option<bool>,
    pub display_order: Option<i32>,
    #[serde(default)]
    #[validate(nested)]
    pub team_members: Vec<ProjectMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default, PartialEq)]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub thumbnail_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub banner_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub qr_code_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub short_description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub full_description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub demo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub repo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub paper_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub video_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub gallery: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub features: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub content_blocks: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<NaiveDate>)]
    pub project_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    pub year: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub team_members: Option<Vec<ProjectMember>>,
}

impl UpdateProjectRequest {
    /// True when the patch touches a column of the `projects` row itself.
    pub fn has_scalar_changes(&self) -> bool {
        self.title.is_some()
            || self.category.is_some()
            || self.status.is_some()
            || self.thumbnail_url.is_some()
            || self.banner_url.is_some()
            || self.qr_code_url.is_some()
            || self.short_description.is_some()
            || self.full_description.is_some()
            || self.demo_url.is_some()
            || self.repo_url.is_some()
            || self.paper_url.is_some()
            || self.video_url.is_some()
            || self.metadata.is_some()
            || self.gallery.is_some()
            || self.features.is_some()
            || self.tags.is_some()
            || self.content_blocks.is_some()
            || self.project_date.is_some()
            || self.year.is_some()
            || self.is_featured.is_some()
            || self.is_published.is_some()
            || self.display_order.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_scalar_changes() && self.team_members.is_none()
    }
}
