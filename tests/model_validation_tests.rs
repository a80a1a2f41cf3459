use chrono::Utc;
use lab_portal::{
    models::{
        CreateJournalRequest, CreateMemberRequest, CreateProjectRequest, JournalRow, Page,
        SocialKind, UpdateMemberRequest, UpdateProjectRequest, join_authors,
    },
    pagination::{PageLimits, Pagination},
};
use serde_json::json;
use validator::Validate;

fn member(value: serde_json::Value) -> CreateMemberRequest {
    serde_json::from_value(value).expect("payload should deserialize")
}

// --- Member Schema ---

#[test]
fn test_minimal_member_is_valid() {
    let req = member(json!({ "slug": "jane-doe", "name": "Jane Doe" }));
    assert!(req.validate().is_ok());
    assert!(req.skills.is_empty());
    assert!(req.socials.is_empty());
}

#[test]
fn test_member_requires_slug_and_name() {
    let errors = member(json!({})).validate().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("slug"));
    assert!(fields.contains_key("name"));
}

#[test]
fn test_member_slug_charset() {
    let req = member(json!({ "slug": "Jane Doe", "name": "Jane Doe" }));
    let errors = req.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("slug"));
}

#[test]
fn test_member_email_and_avatar() {
    let bad_email = member(json!({ "slug": "jane", "name": "Jane", "email": "not-an-email" }));
    assert!(bad_email.validate().is_err());

    let upload_path = member(json!({
        "slug": "jane", "name": "Jane",
        "avatar_url": "/api/uploads/avatars/jane-1-abcd1234.png"
    }));
    assert!(upload_path.validate().is_ok());

    let relative = member(json!({ "slug": "jane", "name": "Jane", "avatar_url": "avatars/x.png" }));
    assert!(relative.validate().is_err());
}

#[test]
fn test_member_nested_children() {
    let req = member(json!({
        "slug": "jane", "name": "Jane",
        "experiences": [{ "role": "" }],
        "educations": [{ "degree": "PhD", "org": "" }]
    }));
    let errors = req.validate().unwrap_err();
    assert!(errors.errors().contains_key("experiences"));
    assert!(errors.errors().contains_key("educations"));

    let ok = member(json!({
        "slug": "jane", "name": "Jane",
        "experiences": [{ "role": "Researcher" }],
        "educations": [{ "degree": "PhD", "org": "ITB" }]
    }));
    assert!(ok.validate().is_ok());
    assert_eq!(ok.experiences[0].org, "");
    assert!(ok.experiences[0].bullets.is_empty());
    assert_eq!(ok.educations[0].year, "");
}

#[test]
fn test_social_type_allow_list() {
    let ok = member(json!({
        "slug": "jane", "name": "Jane",
        "socials": [{ "type": "github", "url": "https://github.com/jane" }]
    }));
    assert_eq!(ok.socials[0].kind, SocialKind::Github);

    let unknown = serde_json::from_value::<CreateMemberRequest>(json!({
        "slug": "jane", "name": "Jane",
        "socials": [{ "type": "myspace", "url": "https://myspace.com/jane" }]
    }));
    assert!(unknown.is_err());
}

// --- PATCH Semantics ---

#[test]
fn test_patch_distinguishes_null_from_absent() {
    let patch: UpdateMemberRequest =
        serde_json::from_value(json!({ "title": null, "bio": "Hello" })).unwrap();

    assert_eq!(patch.title, Some(None));
    assert_eq!(patch.bio, Some(Some("Hello".to_string())));
    assert_eq!(patch.position, None);
    assert!(patch.has_scalar_changes());
}

#[test]
fn test_empty_patch() {
    let patch: UpdateMemberRequest = serde_json::from_value(json!({})).unwrap();
    assert!(patch.is_empty());
    assert!(patch.validate().is_ok());

    let children_only: UpdateMemberRequest =
        serde_json::from_value(json!({ "skills": [] })).unwrap();
    assert!(!children_only.is_empty());
    assert!(!children_only.has_scalar_changes());
}

#[test]
fn test_patch_validates_present_fields_only() {
    let short_name: UpdateMemberRequest = serde_json::from_value(json!({ "name": "Al" })).unwrap();
    assert!(short_name.validate().is_err());

    let bad_email: UpdateMemberRequest =
        serde_json::from_value(json!({ "email": "nope" })).unwrap();
    assert!(bad_email.validate().is_err());

    let cleared_email: UpdateMemberRequest =
        serde_json::from_value(json!({ "email": null })).unwrap();
    assert!(cleared_email.validate().is_ok());
}

#[test]
fn test_project_patch_team_only_is_not_empty() {
    let patch: UpdateProjectRequest =
        serde_json::from_value(json!({ "team_members": [] })).unwrap();
    assert!(!patch.is_empty());
    assert!(!patch.has_scalar_changes());

    let dated: UpdateProjectRequest =
        serde_json::from_value(json!({ "project_date": null, "year": 2024 })).unwrap();
    assert_eq!(dated.project_date, Some(None));
    assert_eq!(dated.year, Some(Some(2024)));
}

#[test]
fn test_project_create_requires_title_and_team_slugs() {
    let req: CreateProjectRequest = serde_json::from_value(json!({
        "title": "Smart Farming",
        "team_members": [{ "member_slug": "" }]
    }))
    .unwrap();
    assert!(req.validate().is_err());

    let untitled: CreateProjectRequest = serde_json::from_value(json!({})).unwrap();
    assert!(untitled.validate().is_err());
}

// --- Journals ---

#[test]
fn test_journal_slug_source_and_authors() {
    let req: CreateJournalRequest = serde_json::from_value(json!({
        "title": "Deep Learning for Rice",
        "year": 2023,
        "type": "Conference",
        "abstract": "We study rice.",
        "authors": ["A. Putra", " ", "B. Sari"]
    }))
    .unwrap();

    assert_eq!(req.slug_source(), "Deep Learning for Rice-2023");
    assert_eq!(req.kind.as_deref(), Some("Conference"));
    assert_eq!(req.abstract_text.as_deref(), Some("We study rice."));
    assert_eq!(join_authors(&req.authors), "A. Putra, B. Sari");
}

#[test]
fn test_journal_row_decode_failure_is_typed() {
    let row = JournalRow {
        id: 1,
        slug: "broken".to_string(),
        title: "Broken".to_string(),
        authors_text: String::new(),
        authors_json: Some("not json".to_string()),
        venue: None,
        year: None,
        kind: "Journal".to_string(),
        doi: None,
        pdf_url: None,
        thumb_url: None,
        abstract_text: None,
        keywords_json: None,
        created_at: Utc::now(),
    };

    let err = row.decode().unwrap_err();
    assert_eq!(err.entity, "journals");
    assert_eq!(err.field, "authors_json");
}

#[test]
fn test_journal_row_decode_success() {
    let row = JournalRow {
        id: 1,
        slug: "ok".to_string(),
        title: "Ok".to_string(),
        authors_text: "A, B".to_string(),
        authors_json: Some(r#"["A","B"]"#.to_string()),
        venue: None,
        year: Some(2024),
        kind: "Journal".to_string(),
        doi: None,
        pdf_url: None,
        thumb_url: None,
        abstract_text: Some("Abstract".to_string()),
        keywords_json: None,
        created_at: Utc::now(),
    };

    let journal = row.decode().unwrap();
    assert_eq!(journal.authors_json, Some(vec!["A".to_string(), "B".to_string()]));
    assert_eq!(journal.keywords_json, None);

    let body = serde_json::to_value(&journal).unwrap();
    assert_eq!(body["abstract"], "Abstract");
    assert_eq!(body["type"], "Journal");
}

// --- Envelope ---

#[test]
fn test_page_envelope_field_names() {
    let pagination = Pagination::resolve(Some("2"), Some("5"), PageLimits::new(6, 50));
    let page = Page::new(vec![1, 2, 3], 13, pagination);
    let body = serde_json::to_value(&page).unwrap();

    assert_eq!(body["count"], 13);
    assert_eq!(body["page"], 2);
    assert_eq!(body["perPage"], 5);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}
