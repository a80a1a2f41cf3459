use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

use super::double_option;

/// NewsSummary
///
/// A news item as listed on the public and admin indexes (body omitted).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct NewsSummary {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub category: String,
    #[ts(type = "string")]
    pub published_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// News
///
/// Full news article including its body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct News {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub category: String,
    #[ts(type = "string")]
    pub published_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<&News> for NewsSummary {
    fn from(news: &News) -> Self {
        Self {
            id: news.id,
            slug: news.slug.clone(),
            title: news.title.clone(),
            excerpt: news.excerpt.clone(),
            image_url: news.image_url.clone(),
            category: news.category.clone(),
            published_at: news.published_at,
            created_at: news.created_at,
        }
    }
}

pub const DEFAULT_NEWS_CATEGORY: &str = "Berita";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default, PartialEq)]
pub struct CreateNewsRequest {
    pub slug: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub excerpt: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default, PartialEq)]
pub struct UpdateNewsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub excerpt: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl UpdateNewsRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.excerpt.is_none()
            && self.content.is_none()
            && self.image_url.is_none()
            && self.category.is_none()
            && self.published_at.is_none()
    }
}
