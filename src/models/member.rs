use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::double_option;
use crate::{
    codec::{self, DecodeError},
    slug,
};

/// Member
///
/// A lab member's record from the `members` table. This is what list endpoints return.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Member {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub title: Option<String>,
    pub position: Option<String>,
    pub faculty: Option<String>,
    pub program: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// MemberDetail
///
/// A member with every child collection attached, as served by `GET /members/{slug}`.
/// The nested shapes match what the frontend already consumes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct MemberDetail {
    #[serde(flatten)]
    pub member: Member,
    pub member_specialists: Vec<MemberSpecialist>,
    pub skills: Vec<Skill>,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
    pub certifications: Vec<Certification>,
    pub socials: Vec<Social>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct MemberSpecialist {
    pub spec: SpecialistName,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct SpecialistName {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Skill {
    pub skill_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Experience {
    pub id: i64,
    pub role: Option<String>,
    pub org: Option<String>,
    pub period: Option<String>,
    pub bullets: Vec<String>,
}

/// Raw `experiences` row; `bullets` is a JSON array serialized as TEXT.
#[derive(Debug, Clone, FromRow)]
pub struct ExperienceRow {
    pub id: i64,
    pub role: Option<String>,
    pub org: Option<String>,
    pub period: Option<String>,
    pub bullets: Option<String>,
}

impl ExperienceRow {
    pub fn decode(self) -> Result<Experience, DecodeError> {
        let bullets = codec::decode_opt("experiences", "bullets", self.bullets.as_deref())?;
        Ok(Experience {
            id: self.id,
            role: self.role,
            org: self.org,
            period: self.period,
            bullets: bullets.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Education {
    pub id: i64,
    pub degree: Option<String>,
    pub org: Option<String>,
    pub year: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Certification {
    pub id: i64,
    pub cert_name: Option<String>,
}

/// Social
///
/// A social/profile link. The column and JSON key are both `type`, a Rust keyword,
/// hence the rename.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Social {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub url: String,
}

// --- Input Schemas ---

/// SocialKind
///
/// The profile networks a member may link to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SocialKind {
    Twitter,
    Linkedin,
    Scholar,
    Github,
    Website,
    Orcid,
    Scopus,
    Sinta,
}

impl SocialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialKind::Twitter => "twitter",
            SocialKind::Linkedin => "linkedin",
            SocialKind::Scholar => "scholar",
            SocialKind::Github => "github",
            SocialKind::Website => "website",
            SocialKind::Orcid => "orcid",
            SocialKind::Scopus => "scopus",
            SocialKind::Sinta => "sinta",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, PartialEq)]
#[ts(export)]
pub struct ExperienceInput {
    #[validate(length(min = 1, message = "experience role is required"))]
    pub role: String,
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, PartialEq)]
#[ts(export)]
pub struct EducationInput {
    #[validate(length(min = 1, message = "education degree is required"))]
    pub degree: String,
    #[validate(length(min = 1, message = "education org is required"))]
    pub org: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, PartialEq)]
#[ts(export)]
pub struct SocialInput {
    #[serde(rename = "type")]
    pub kind: SocialKind,
    #[validate(length(min = 1, message = "social url is required"))]
    pub url: String,
}

/// CreateMemberRequest
///
/// Payload of `POST /members`. Child collections default to empty.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default, PartialEq)]
#[validate(schema(function = "validate_new_member"))]
#[ts(export)]
pub struct CreateMemberRequest {
    #[serde(default)]
    #[validate(
        length(min = 3, message = "slug must be at least 3 characters"),
        custom(function = "validate_slug_chars")
    )]
    pub slug: String,
    #[serde(default)]
    #[validate(length(min = 3, message = "name must be at least 3 characters"))]
    pub name: String,
    pub title: Option<String>,
    pub position: Option<String>,
    pub faculty: Option<String>,
    pub program: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub specialists: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub experiences: Vec<ExperienceInput>,
    #[serde(default)]
    #[validate(nested)]
    pub educations: Vec<EducationInput>,
    #[serde(default)]
    #[validate(nested)]
    pub socials: Vec<SocialInput>,
}

/// UpdateMemberRequest
///
/// Payload of `PATCH /members/{slug}`. Absent keys are left untouched; an explicit
/// `null` clears a nullable column; a present collection replaces the stored one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default, PartialEq)]
#[validate(schema(function = "validate_member_patch"))]
pub struct UpdateMemberRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, message = "name must be at least 3 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub position: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub faculty: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub program: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub avatar_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialists: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub experiences: Option<Vec<ExperienceInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub educations: Option<Vec<EducationInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub socials: Option<Vec<SocialInput>>,
}

impl UpdateMemberRequest {
    /// True when the patch touches a column of the `members` row itself.
    pub fn has_scalar_changes(&self) -> bool {
        self.name.is_some()
            || self.title.is_some()
            || self.position.is_some()
            || self.faculty.is_some()
            || self.program.is_some()
            || self.email.is_some()
            || self.avatar_url.is_some()
            || self.bio.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_scalar_changes()
            && self.specialists.is_none()
            && self.skills.is_none()
            && self.certifications.is_none()
            && self.experiences.is_none()
            && self.educations.is_none()
            && self.socials.is_none()
    }
}

// --- Validation Helpers ---

fn validate_slug_chars(value: &str) -> Result<(), ValidationError> {
    if slug::is_valid_slug(value) {
        Ok(())
    } else {
        Err(ValidationError::new("slug")
            .with_message("slug may only contain lowercase letters, digits and dashes".into()))
    }
}

/// Uploaded avatars are referenced by their public path, so absolute paths are accepted
/// alongside http(s) URLs.
fn is_acceptable_link(value: &str) -> bool {
    value.starts_with('/') || value.starts_with("http://") || value.starts_with("https://")
}

fn is_plausible_email(value: &str) -> bool {
    validator::ValidateEmail::validate_email(&value)
}

fn validate_new_member(req: &CreateMemberRequest) -> Result<(), ValidationError> {
    match req.avatar_url.as_deref() {
        Some(url) if !is_acceptable_link(url) => Err(ValidationError::new("avatar_url")
            .with_message("avatar_url must be an http(s) URL or an absolute path".into())),
        _ => Ok(()),
    }
}

fn validate_member_patch(req: &UpdateMemberRequest) -> Result<(), ValidationError> {
    if let Some(Some(url)) = &req.avatar_url {
        if !is_acceptable_link(url) {
            return Err(ValidationError::new("avatar_url")
                .with_message("avatar_url must be an http(s) URL or an absolute path".into()));
        }
    }
    if let Some(Some(email)) = &req.email {
        if !is_plausible_email(email) {
            return Err(ValidationError::new("email")
                .with_message("email must be a valid address".into()));
        }
    }
    Ok(())
}
