use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

use super::double_option;
use crate::codec::{self, DecodeError};

/// JournalSummary
///
/// Publication entry as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct JournalSummary {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub authors_text: String,
    pub venue: Option<String>,
    pub year: Option<i32>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub doi: Option<String>,
    pub pdf_url: Option<String>,
    pub thumb_url: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Journal
///
/// Publication detail with abstract and the decoded author/keyword arrays.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Journal {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub authors_text: String,
    pub authors_json: Option<Vec<String>>,
    pub venue: Option<String>,
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub kind: String,
    pub doi: Option<String>,
    pub pdf_url: Option<String>,
    pub thumb_url: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub keywords_json: Option<Vec<String>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Raw `journals` row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct JournalRow {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub authors_text: String,
    pub authors_json: Option<String>,
    pub venue: Option<String>,
    pub year: Option<i32>,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub doi: Option<String>,
    pub pdf_url: Option<String>,
    pub thumb_url: Option<String>,
    #[sqlx(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub keywords_json: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl JournalRow {
    pub fn decode(self) -> Result<Journal, DecodeError> {
        Ok(Journal {
            authors_json: codec::decode_opt("journals", "authors_json", self.authors_json.as_deref())?,
            keywords_json: codec::decode_opt(
                "journals",
                "keywords_json",
                self.keywords_json.as_deref(),
            )?,
            id: self.id,
            slug: self.slug,
            title: self.title,
            authors_text: self.authors_text,
            venue: self.venue,
            year: self.year,
            kind: self.kind,
            doi: self.doi,
            pdf_url: self.pdf_url,
            thumb_url: self.thumb_url,
            abstract_text: self.abstract_text,
            created_at: self.created_at,
        })
    }
}

impl From<&Journal> for JournalSummary {
    fn from(journal: &Journal) -> Self {
        Self {
            id: journal.id,
            slug: journal.slug.clone(),
            title: journal.title.clone(),
            authors_text: journal.authors_text.clone(),
            venue: journal.venue.clone(),
            year: journal.year,
            kind: journal.kind.clone(),
            doi: journal.doi.clone(),
            pdf_url: journal.pdf_url.clone(),
            thumb_url: journal.thumb_url.clone(),
            created_at: journal.created_at,
        }
    }
}

pub const DEFAULT_JOURNAL_TYPE: &str = "Journal";

/// Display form of an author list, as stored in `authors_text`.
pub fn join_authors(authors: &[String]) -> String {
    authors
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default, PartialEq)]
pub struct CreateJournalRequest {
    pub slug: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub venue: Option<String>,
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub doi: Option<String>,
    pub pdf_url: Option<String>,
    pub thumb_url: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CreateJournalRequest {
    /// Source text for a derived slug: `"{title}-{year}"`, or just the title.
    pub fn slug_source(&self) -> String {
        match self.year {
            Some(year) => format!("{}-{}", self.title, year),
            None => self.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default, PartialEq)]
pub struct UpdateJournalRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub venue: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    pub year: Option<Option<i32>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub doi: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub pdf_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub thumb_url: Option<Option<String>>,
    #[serde(
        rename = "abstract",
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub abstract_text: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

impl UpdateJournalRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.authors.is_none()
            && self.venue.is_none()
            && self.year.is_none()
            && self.kind.is_none()
            && self.doi.is_none()
            && self.pdf_url.is_none()
            && self.thumb_url.is_none()
            && self.abstract_text.is_none()
            && self.keywords.is_none()
    }
}
