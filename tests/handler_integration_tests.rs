use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use lab_portal::{
    AppConfig, AppState, MemoryRepository, MockStorageService, create_router,
    models::ProjectCategory,
    repository::RepositoryState,
    storage::StorageState,
};
use serde_json::{Value, json};
use std::{path::PathBuf, sync::Arc};
use tower::util::ServiceExt;

// --- Test Harness ---

async fn app() -> Router {
    let categories = vec![
        ProjectCategory {
            id: 2,
            name: "IoT".to_string(),
            slug: "iot".to_string(),
            description: None,
            icon: None,
            color: None,
            display_order: 2,
        },
        ProjectCategory {
            id: 1,
            name: "AI".to_string(),
            slug: "ai".to_string(),
            description: Some("Artificial intelligence".to_string()),
            icon: None,
            color: Some("#123456".to_string()),
            display_order: 1,
        },
    ];
    let repo = Arc::new(MemoryRepository::new().with_categories(categories).await) as RepositoryState;
    let storage = Arc::new(MockStorageService::new()) as StorageState;
    let config = AppConfig {
        static_dir: PathBuf::from("tests/missing-build"),
        ..AppConfig::default()
    };

    create_router(AppState {
        repo,
        storage,
        config,
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn jane_doe() -> Value {
    json!({
        "slug": "jane-doe",
        "name": "Jane Doe",
        "position": "Researcher",
        "email": "jane@lab.ac.id",
        "specialists": ["Computer Vision"],
        "skills": ["AI", "NLP"],
        "experiences": [{ "role": "Research Assistant", "org": "Lab", "bullets": ["Built things"] }],
        "socials": [{ "type": "github", "url": "https://github.com/jane" }]
    })
}

// --- System ---

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn test_unknown_api_route_is_json_404() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_spa_bundle_and_client_routes() {
    let build = tempfile::tempdir().unwrap();
    std::fs::write(build.path().join("index.html"), "<html>lab</html>").unwrap();
    std::fs::write(build.path().join("app.js"), "console.log(1)").unwrap();
    let app = create_router(AppState {
        repo: Arc::new(MemoryRepository::new()) as RepositoryState,
        storage: Arc::new(MockStorageService::new()) as StorageState,
        config: AppConfig {
            static_dir: build.path().to_path_buf(),
            ..AppConfig::default()
        },
    });

    for (uri, expected) in [
        ("/app.js", "console.log(1)"),
        ("/members/jane-doe", "<html>lab</html>"),
        ("/", "<html>lab</html>"),
    ] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], expected.as_bytes(), "{uri}");
    }

    let (status, body) = send(&app, "GET", "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

// --- Members ---

#[tokio::test]
async fn test_member_scenario_skill_patch_keeps_socials() {
    let app = app().await;

    let (status, created) = send(&app, "POST", "/api/members", Some(jane_doe())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "jane-doe");
    assert!(created["id"].is_i64());

    let (status, detail) = send(&app, "GET", "/api/members/jane-doe", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["name"], "Jane Doe");
    assert_eq!(
        detail["skills"],
        json!([{ "skill_name": "AI" }, { "skill_name": "NLP" }])
    );
    assert_eq!(detail["socials"][0]["type"], "github");
    assert_eq!(
        detail["member_specialists"],
        json!([{ "spec": { "name": "Computer Vision" } }])
    );
    assert_eq!(detail["experiences"][0]["bullets"], json!(["Built things"]));
    assert_eq!(detail["experiences"][0]["period"], Value::Null);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/members/jane-doe",
        Some(json!({ "skills": ["AI"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = send(&app, "GET", "/api/members/jane-doe", None).await;
    assert_eq!(detail["skills"], json!([{ "skill_name": "AI" }]));
    assert_eq!(detail["socials"].as_array().unwrap().len(), 1);
    assert_eq!(detail["socials"][0]["url"], "https://github.com/jane");
}

#[tokio::test]
async fn test_empty_patch_changes_nothing() {
    let app = app().await;
    send(&app, "POST", "/api/members", Some(jane_doe())).await;

    let (_, before) = send(&app, "GET", "/api/members/jane-doe", None).await;
    let (status, _) = send(&app, "PATCH", "/api/members/jane-doe", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, after) = send(&app, "GET", "/api/members/jane-doe", None).await;

    assert_eq!(before, after);
}

#[tokio::test]
async fn test_patch_replaces_or_clears_collections() {
    let app = app().await;
    send(&app, "POST", "/api/members", Some(jane_doe())).await;

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/members/jane-doe",
        Some(json!({
            "socials": [],
            "educations": [{ "degree": "MSc", "org": "ITS", "year": "2020" }],
            "title": "Dr.",
            "position": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = send(&app, "GET", "/api/members/jane-doe", None).await;
    assert_eq!(detail["socials"], json!([]));
    assert_eq!(detail["educations"].as_array().unwrap().len(), 1);
    assert_eq!(detail["educations"][0]["degree"], "MSc");
    assert_eq!(detail["educations"][0]["note"], Value::Null);
    assert_eq!(detail["title"], "Dr.");
    assert_eq!(detail["position"], Value::Null);
    // Untouched collections survive.
    assert_eq!(detail["skills"].as_array().unwrap().len(), 2);
    assert_eq!(detail["experiences"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_then_detail_is_not_found() {
    let app = app().await;
    send(&app, "POST", "/api/members", Some(jane_doe())).await;

    let (status, body) = send(&app, "DELETE", "/api/members/jane-doe", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Member deleted");

    let (status, body) = send(&app, "GET", "/api/members/jane-doe", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(&app, "DELETE", "/api/members/jane-doe", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "PATCH", "/api/members/jane-doe", Some(json!({ "bio": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_slug_conflicts() {
    let app = app().await;
    let (status, _) = send(&app, "POST", "/api/members", Some(jane_doe())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/members", Some(jane_doe())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_member_validation_errors() {
    let app = app().await;

    let (status, body) = send(&app, "POST", "/api/members", Some(json!({ "slug": "jane-doe" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        "POST",
        "/api/members",
        Some(json!({ "slug": "jane-doe", "name": "Jane", "socials": [{ "type": "myspace", "url": "x" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let request = Request::builder()
        .method("POST")
        .uri("/api/members")
        .header("Content-Type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_member_list_pagination_and_filters() {
    let app = app().await;
    for (slug, name, faculty) in [
        ("ani-putri", "Ani Putri", "Engineering"),
        ("budi-santoso", "Budi Santoso", "Science"),
        ("citra-lestari", "Citra Lestari", "Engineering"),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/members",
            Some(json!({ "slug": slug, "name": name, "faculty": faculty })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, page) = send(&app, "GET", "/api/members?page=2&perPage=2", None).await;
    assert_eq!(page["count"], 3);
    assert_eq!(page["page"], 2);
    assert_eq!(page["perPage"], 2);
    assert_eq!(page["totalPages"], 2);
    // Newest first: the last page holds the first member created.
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
    assert_eq!(page["data"][0]["slug"], "ani-putri");

    let (_, page) = send(&app, "GET", "/api/members?perPage=1000&page=abc", None).await;
    assert_eq!(page["perPage"], 50);
    assert_eq!(page["page"], 1);
    assert_eq!(page["data"].as_array().unwrap().len(), 3);

    let (_, page) = send(&app, "GET", "/api/members?faculty=Engineering&q=CITRA", None).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["data"][0]["slug"], "citra-lestari");

    let (_, page) = send(&app, "GET", "/api/members?faculty=&position=", None).await;
    assert_eq!(page["count"], 3);
}

#[tokio::test]
async fn test_member_search_wildcards_are_literal() {
    let app = app().await;
    let (status, _) = send(&app, "POST", "/api/members", Some(jane_doe())).await;
    assert_eq!(status, StatusCode::CREATED);

    for q in ["_", "%25", "Jane_Doe"] {
        let (_, page) = send(&app, "GET", &format!("/api/members?q={q}"), None).await;
        assert_eq!(page["count"], 0, "{q}");
    }

    let (_, page) = send(&app, "GET", "/api/members?q=e%20D", None).await;
    assert_eq!(page["count"], 1);
}

// --- News ---

#[tokio::test]
async fn test_news_lifecycle_with_derived_slug() {
    let app = app().await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/admin/news",
        Some(json!({ "title": "Lab Opens New Wing!", "content": "<p>Body</p>", "excerpt": "Short" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "lab-opens-new-wing");

    let (_, list) = send(&app, "GET", "/api/news", None).await;
    assert_eq!(list["perPage"], 6);
    assert_eq!(list["data"][0]["category"], "Berita");
    assert!(list["data"][0].get("content").is_none());

    let (_, admin) = send(&app, "GET", "/api/admin/news", None).await;
    assert_eq!(admin["perPage"], 20);

    let (status, detail) = send(&app, "GET", "/api/news/lab-opens-new-wing", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["content"], "<p>Body</p>");

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/admin/news/lab-opens-new-wing",
        Some(json!({ "excerpt": null, "category": "Event" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, detail) = send(&app, "GET", "/api/news/lab-opens-new-wing", None).await;
    assert_eq!(detail["excerpt"], Value::Null);
    assert_eq!(detail["category"], "Event");

    let (_, filtered) = send(&app, "GET", "/api/news?category=Berita", None).await;
    assert_eq!(filtered["count"], 0);

    let (status, _) = send(&app, "DELETE", "/api/admin/news/lab-opens-new-wing", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/api/news/lab-opens-new-wing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_news_requires_title_content_and_a_slug() {
    let app = app().await;

    let (status, _) = send(&app, "POST", "/api/admin/news", Some(json!({ "title": "No body" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/news",
        Some(json!({ "title": "!!!", "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// --- Journals ---

#[tokio::test]
async fn test_journal_slug_from_title_and_year() {
    let app = app().await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/admin/journals",
        Some(json!({
            "title": "Rice Leaf Disease Detection",
            "year": 2023,
            "authors": ["A. Putra", "B. Sari"],
            "keywords": ["cnn", "agriculture"],
            "abstract": "We detect disease."
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "rice-leaf-disease-detection-2023");

    send(
        &app,
        "POST",
        "/api/admin/journals",
        Some(json!({ "title": "Undated Note", "type": "Conference" })),
    )
    .await;

    let (_, list) = send(&app, "GET", "/api/journals", None).await;
    assert_eq!(list["perPage"], 9);
    assert_eq!(list["count"], 2);
    // Dated publications come before undated ones.
    assert_eq!(list["data"][0]["slug"], "rice-leaf-disease-detection-2023");
    assert_eq!(list["data"][0]["authors_text"], "A. Putra, B. Sari");
    assert!(list["data"][0].get("abstract").is_none());

    let (_, by_year) = send(&app, "GET", "/api/journals?year=2023", None).await;
    assert_eq!(by_year["count"], 1);
    let (_, by_type) = send(&app, "GET", "/api/journals?type=Conference", None).await;
    assert_eq!(by_type["count"], 1);
    let (_, by_author) = send(&app, "GET", "/api/journals?q=sari", None).await;
    assert_eq!(by_author["count"], 1);

    let (_, detail) = send(&app, "GET", "/api/journals/rice-leaf-disease-detection-2023", None).await;
    assert_eq!(detail["abstract"], "We detect disease.");
    assert_eq!(detail["keywords_json"], json!(["cnn", "agriculture"]));
    assert_eq!(detail["type"], "Journal");

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/admin/journals/rice-leaf-disease-detection-2023",
        Some(json!({ "authors": ["C. Dewi"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, detail) = send(&app, "GET", "/api/journals/rice-leaf-disease-detection-2023", None).await;
    assert_eq!(detail["authors_text"], "C. Dewi");
    assert_eq!(detail["authors_json"], json!(["C. Dewi"]));
}

// --- Projects ---

#[tokio::test]
async fn test_project_visibility_and_team() {
    let app = app().await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/admin/projects",
        Some(json!({
            "title": "Smart Farming",
            "metadata": { "client": "Dinas Pertanian", "budget": 10 },
            "tags": ["iot", "ai"],
            "gallery": [{ "url": "/api/uploads/projects/a.png" }],
            "is_featured": true,
            "team_members": [{ "member_slug": "jane-doe", "role": "Lead" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "smart-farming");
    assert_eq!(created["project"]["status"], "ongoing");
    assert_eq!(created["project"]["team_members"][0]["member_slug"], "jane-doe");
    assert_eq!(created["project"]["metadata"]["budget"], 10);

    send(
        &app,
        "POST",
        "/api/admin/projects",
        Some(json!({ "title": "Hidden Draft", "is_published": false })),
    )
    .await;

    let (_, public) = send(&app, "GET", "/api/projects", None).await;
    assert_eq!(public["count"], 1);
    assert_eq!(public["perPage"], 12);
    assert!(public["data"][0].get("team_members").is_none());

    let (_, admin) = send(&app, "GET", "/api/admin/projects", None).await;
    assert_eq!(admin["count"], 2);
    assert_eq!(admin["data"][0]["slug"], "hidden-draft");

    let (status, _) = send(&app, "GET", "/api/projects/hidden-draft", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, draft) = send(&app, "GET", "/api/admin/projects/hidden-draft", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["team_members"], json!([]));

    let (_, detail) = send(&app, "GET", "/api/projects/smart-farming", None).await;
    assert_eq!(detail["tags"], json!(["iot", "ai"]));
    assert_eq!(detail["gallery"][0]["url"], "/api/uploads/projects/a.png");

    let (_, featured) = send(&app, "GET", "/api/projects/featured?limit=100", None).await;
    assert_eq!(featured["data"].as_array().unwrap().len(), 1);
    let (_, only_featured) = send(&app, "GET", "/api/projects?featured=true", None).await;
    assert_eq!(only_featured["count"], 1);
}

#[tokio::test]
async fn test_project_update_returns_project() {
    let app = app().await;
    send(
        &app,
        "POST",
        "/api/admin/projects",
        Some(json!({
            "title": "Smart Farming",
            "team_members": [{ "member_slug": "jane-doe" }, { "member_slug": "budi" }]
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/admin/projects/smart-farming",
        Some(json!({ "status": "completed", "team_members": [{ "member_slug": "citra", "role": "Dev" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project updated");
    assert_eq!(body["project"]["status"], "completed");
    assert_eq!(
        body["project"]["team_members"],
        json!([{ "member_slug": "citra", "role": "Dev" }])
    );

    let (status, _) = send(&app, "PATCH", "/api/admin/projects/nope", Some(json!({ "status": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/admin/projects/smart-farming", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/api/admin/projects/smart-farming", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_project_categories_in_display_order() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/projects/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["slug"], "ai");
    assert_eq!(body["data"][1]["slug"], "iot");
}

// --- Collaborations ---

#[tokio::test]
async fn test_collaboration_lifecycle() {
    let app = app().await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/admin/collaborations",
        Some(json!({ "name": "Acme Corp", "country": "ID" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "acme-corp");

    let (_, all) = send(&app, "GET", "/api/collaborations", None).await;
    assert_eq!(all["data"][0]["type"], "other");

    let (_, page) = send(&app, "GET", "/api/admin/collaborations?type=other", None).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["perPage"], 10);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/admin/collaborations/acme-corp",
        Some(json!({ "type": "industry", "country": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = send(&app, "GET", "/api/admin/collaborations/acme-corp", None).await;
    assert_eq!(detail["type"], "industry");
    assert_eq!(detail["country"], Value::Null);

    let (status, _) = send(&app, "DELETE", "/api/admin/collaborations/acme-corp", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/api/admin/collaborations/acme-corp", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
