use axum::http::StatusCode;
use http_body_util::BodyExt;
use lightness_core::config::{Config, SuggestionsConfig};
use lightness_core::db::ExperienceDb;
use lightness_server::state::AppState;
use suggestion_agent::fallback::{persona_templates, BASE_TEMPLATES};
use suggestion_agent::{CompletionClient, SuggestionGenerator};
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app_with(dir: &TempDir, generator: SuggestionGenerator) -> axum::Router {
    let db = ExperienceDb::open_in(dir.path()).unwrap();
    let state = AppState::with_parts(dir.path().to_path_buf(), Config::default(), db, generator);
    lightness_server::build_router(state)
}

/// Router whose suggestion generator never reaches a model.
fn offline_app(dir: &TempDir) -> axum::Router {
    app_with(dir, SuggestionGenerator::offline("LIGHTNESS_TEST_UNSET_KEY"))
}

async fn send(app: &axum::Router, req: axum::http::Request<axum::body::Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    send(app, req).await
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_raw(app, uri, serde_json::to_vec(&body).unwrap()).await
}

async fn post_raw(app: &axum::Router, uri: &str, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body))
        .unwrap();
    send(app, req).await
}

fn strings(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

async fn create(app: &axum::Router, title: &str) -> u64 {
    let (status, body) = post_json(app, "/api/experiences", serde_json::json!({ "title": title })).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_u64().unwrap()
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn suggestions_without_model_fall_back_to_persona_table() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);

    let (status, body) = post_json(
        &app,
        "/api/ai/suggestions",
        serde_json::json!({ "task": "洗碗", "persona": "collector" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "AI服务暂时不可用，这里是一些通用建议");

    let suggestions = strings(&body["suggestions"]);
    assert_eq!(suggestions.len(), 3);
    let table = persona_templates(lightness_core::types::Persona::Collector);
    assert!(suggestions.iter().all(|s| table.contains(&s.as_str())));
}

#[tokio::test]
async fn suggestions_from_model_carry_metadata() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "choices": [{ "message": { "content": "收集泡泡\n给碗排队\n拍一张闪亮的照片" } }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let settings = SuggestionsConfig {
        base_url: server.url(),
        ..Default::default()
    };
    let client = CompletionClient::new("key".into(), &settings).unwrap();
    let dir = TempDir::new().unwrap();
    let app = app_with(&dir, SuggestionGenerator::with_client(client));

    let long_task = "洗".repeat(80);
    let (status, body) = post_json(
        &app,
        "/api/ai/suggestions",
        serde_json::json!({ "task": long_task, "persona": "collector" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        strings(&body["suggestions"]),
        vec!["收集泡泡", "给碗排队", "拍一张闪亮的照片"]
    );
    assert_eq!(body["metadata"]["persona"], "collector");
    let task = body["metadata"]["task"].as_str().unwrap();
    assert!(task.ends_with("..."));
    assert_eq!(task.chars().count(), 53);
    assert!(body["metadata"]["generatedAt"].is_string());
}

#[tokio::test]
async fn suggestions_reject_missing_parameters() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);

    for body in [
        serde_json::json!({}),
        serde_json::json!({ "task": "洗碗" }),
        serde_json::json!({ "task": "", "persona": "collector" }),
        serde_json::json!({ "task": "洗碗", "persona": 3 }),
        serde_json::json!({ "task": 5, "persona": "collector" }),
    ] {
        let (status, json) = post_json(&app, "/api/ai/suggestions", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "缺少必要参数");
    }
}

#[tokio::test]
async fn suggestions_with_unreadable_body_use_base_table() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);

    let (status, body) = post_raw(&app, "/api/ai/suggestions", b"not json".to_vec()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    let suggestions = strings(&body["suggestions"]);
    assert_eq!(suggestions.len(), 3);
    assert!(suggestions.iter().all(|s| BASE_TEMPLATES.contains(&s.as_str())));
}

#[tokio::test]
async fn suggestions_with_null_body_use_base_table() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);

    let (status, body) = post_raw(&app, "/api/ai/suggestions", b"null".to_vec()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(strings(&body["suggestions"]).len(), 3);
}

#[tokio::test]
async fn suggestions_with_non_object_json_are_missing_parameters() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);

    let bodies: [&str; 4] = ["[]", "\"洗碗\"", "42", "true"];
    for raw in bodies {
        let (status, json) = post_raw(&app, "/api/ai/suggestions", raw.as_bytes().to_vec()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "缺少必要参数");
    }
}

#[tokio::test]
async fn preflight_allows_any_origin() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);

    let req = axum::http::Request::builder()
        .method("OPTIONS")
        .uri("/api/ai/suggestions")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("OPTIONS"));
    let allowed = headers["access-control-allow-headers"].to_str().unwrap();
    assert!(allowed.to_lowercase().contains("content-type"));
}

// ---------------------------------------------------------------------------
// Experiences
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_assigns_increasing_ids() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);

    let first = create(&app, "洗碗").await;
    let second = create(&app, "回邮件").await;
    assert!(second > first);

    let (status, body) = get(&app, &format!("/api/experiences/{second}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "undesigned");
    assert!(body.get("design").is_none());
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);

    let (status, body) =
        post_json(&app, "/api/experiences", serde_json::json!({ "title": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_experience_is_404() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);
    let (status, _) = get(&app, "/api/experiences/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_lifecycle_ends_logged_and_positive() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);
    let id = create(&app, "倒垃圾").await;

    let (status, screen) = get(&app, &format!("/api/experiences/{id}/screens/design")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(screen["proceed"], true);

    let (status, body) = post_json(
        &app,
        &format!("/api/experiences/{id}/design"),
        serde_json::json!({
            "imagination": "像探险家",
            "persona": "explorer",
            "sideQuests": ["数一数楼梯", "观察邻居的门牌"]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next"], format!("/play/{id}"));
    assert_eq!(body["experience"]["design"]["persona"], "explorer");
    assert_eq!(body["experience"]["design"]["funIdea"], "像探险家");
    assert_eq!(
        strings(&body["experience"]["design"]["sideQuests"]),
        vec!["数一数楼梯", "观察邻居的门牌"]
    );

    let (status, body) = post_json(&app, &format!("/api/experiences/{id}/play"), serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next"], format!("/log/{id}"));
    assert!(body["experience"]["playedAt"].is_string());

    let (status, body) = post_json(
        &app,
        &format!("/api/experiences/{id}/log"),
        serde_json::json!({ "reflection": "其实挺好玩", "emotion": "happy" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next"], "/");
    assert_eq!(body["experience"]["status"], "logged");
    assert_eq!(body["experience"]["log"]["emotionPolarity"], "positive");
    assert!(body["experience"]["loggedAt"].is_string());
}

#[tokio::test]
async fn play_screen_on_undesigned_redirects_and_rejects() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);
    let id = create(&app, "洗碗").await;
    let (_, before) = get(&app, &format!("/api/experiences/{id}")).await;

    let (status, screen) = get(&app, &format!("/api/experiences/{id}/screens/play")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(screen["proceed"], false);
    assert_eq!(screen["redirect"], "/");

    let (status, body) = post_json(&app, &format!("/api/experiences/{id}/play"), serde_json::json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("undesigned"));

    let (_, after) = get(&app, &format!("/api/experiences/{id}")).await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn design_requires_imagination_and_known_persona() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);
    let id = create(&app, "洗碗").await;

    let (status, _) = post_json(
        &app,
        &format!("/api/experiences/{id}/design"),
        serde_json::json!({ "imagination": "  ", "persona": "creator" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        &format!("/api/experiences/{id}/design"),
        serde_json::json!({ "imagination": "魔法", "persona": "wizard" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, record) = get(&app, &format!("/api/experiences/{id}")).await;
    assert_eq!(record["status"], "undesigned");
}

#[tokio::test]
async fn unknown_screen_is_400() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);
    let id = create(&app, "洗碗").await;
    let (status, _) = get(&app, &format!("/api/experiences/{id}/screens/celebrate")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_returns_partitions() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);
    let a = create(&app, "a").await;
    let b = create(&app, "b").await;
    post_json(
        &app,
        &format!("/api/experiences/{b}/design"),
        serde_json::json!({ "imagination": "比赛", "persona": "competitor" }),
    )
    .await;

    let (status, lists) = post_json(&app, "/api/experiences/refresh", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lists["undesignedTasks"][0]["id"], a);
    assert_eq!(lists["designedTasks"][0]["id"], b);
    assert_eq!(lists["loggedTasks"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn live_views_follow_writes() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);
    create(&app, "洗碗").await;

    let mut seen = 0;
    for _ in 0..100 {
        let (_, lists) = get(&app, "/api/experiences").await;
        seen = lists["undesignedTasks"].as_array().unwrap().len();
        if seen == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(seen, 1);
}

#[tokio::test]
async fn event_stream_announces_writes() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);

    let req = axum::http::Request::builder()
        .uri("/api/events")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));

    let mut body = response.into_body();
    create(&app, "洗碗").await;

    let text = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let mut text = String::new();
        while let Some(frame) = body.frame().await {
            if let Ok(data) = frame.unwrap().into_data() {
                text.push_str(&String::from_utf8_lossy(&data));
            }
            if text.contains("event: update") {
                break;
            }
        }
        text
    })
    .await
    .expect("no event arrived");
    assert!(text.contains("event: update"));
    assert!(text.contains(r#""kind":"created""#));
}

// ---------------------------------------------------------------------------
// Playbook / catalog
// ---------------------------------------------------------------------------

async fn log_one(app: &axum::Router, title: &str, persona: &str, emotion: &str, reflection: &str) {
    let id = create(app, title).await;
    post_json(
        app,
        &format!("/api/experiences/{id}/design"),
        serde_json::json!({ "imagination": "想象", "persona": persona }),
    )
    .await;
    post_json(app, &format!("/api/experiences/{id}/play"), serde_json::json!({})).await;
    let (status, _) = post_json(
        app,
        &format!("/api/experiences/{id}/log"),
        serde_json::json!({ "reflection": reflection, "emotion": emotion }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn playbook_filters_and_counts() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);
    log_one(&app, "Dishes", "creator", "happy", "Music helped").await;
    log_one(&app, "倒垃圾", "explorer", "bored", "太远了").await;
    log_one(&app, "回邮件", "leader", "mixed", "一般").await;

    let (status, book) = get(&app, "/api/playbook").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["stats"]["total"], 3);
    assert_eq!(book["stats"]["positive"], 1);
    assert_eq!(book["stats"]["negative"], 2);
    // Newest first.
    assert_eq!(book["entries"][0]["title"], "回邮件");

    let (_, book) = get(&app, "/api/playbook?filter=negative").await;
    assert_eq!(book["entries"].as_array().unwrap().len(), 1);
    assert_eq!(book["entries"][0]["emotion"], "bored");

    let (_, book) = get(&app, "/api/playbook?q=MUSIC").await;
    assert_eq!(book["entries"].as_array().unwrap().len(), 1);
    assert_eq!(book["successes"][0]["title"], "Dishes");

    let (status, _) = get(&app, "/api/playbook?filter=favorites").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn catalog_lists_personas_and_emotions() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(&dir);
    let (status, catalog) = get(&app, "/api/catalog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(catalog["personas"].as_array().unwrap().len(), 8);
    assert_eq!(catalog["emotions"].as_array().unwrap().len(), 8);
    let bored = catalog["emotions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == "bored")
        .unwrap();
    assert_eq!(bored["polarity"], "negative");
}
