use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rest_api::{app, ApiConfig, AppState};
use serde_json::{json, Value};
use store::Store;
use tower::ServiceExt;

fn test_app() -> Router {
    let config = ApiConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_path: ":memory:".to_string(),
        jwt_secret: "integration-test-secret-0123456789ab".to_string(),
        access_ttl_secs: 3600,
        refresh_ttl_secs: 86400,
    };
    let store = Store::open_in_memory().unwrap();
    app(AppState::new(config, store))
}

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Registers an account and returns its access token.
async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "supersecret",
            "name": username,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["tokens"]["access"].as_str().unwrap().to_string()
}

async fn create_patient(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/patients",
        Some(token),
        Some(json!({
            "name": name,
            "age": 30,
            "gender": "M",
            "contact": "555",
            "address": "12 High St",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["patient"]["id"].as_i64().unwrap()
}

async fn create_doctor(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/doctors",
        Some(token),
        Some(json!({
            "name": name,
            "specialization": "Cardiologist",
            "contact": "555",
            "address": "3 Clinic Way",
            "experience": 5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["doctor"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_probe_needs_no_token() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_then_login_round_trip() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": "alice",
            "email": "a@x.com",
            "password": "password1",
            "name": "Alice",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["tokens"]["access"].is_string());
    assert!(body["tokens"]["refresh"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["tokens"]["access"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_reports_missing_fields_and_collisions() {
    let app = test_app();

    let (status, body) = send(&app, Method::POST, "/api/auth/register", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["username", "email", "password"] {
        assert!(body["errors"][field].is_array(), "no report for {field}");
    }

    register(&app, "alice").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "supersecret",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["username"][0]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn record_routes_reject_bad_credentials() {
    let app = test_app();
    let token = register(&app, "alice").await;

    let (status, _) = send(&app, Method::GET, "/api/patients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/patients", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A refresh token must not pass where an access token is required.
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "supersecret" })),
    )
    .await;
    let refresh = body["tokens"]["refresh"].as_str().unwrap();
    let (status, _) = send(&app, Method::GET, "/api/patients", Some(refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The real access token still works.
    let (status, _) = send(&app, Method::GET, "/api/patients", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn patient_crud_round_trip() {
    let app = test_app();
    let token = register(&app, "alice").await;

    let id = create_patient(&app, &token, "Bob").await;

    let (status, body) = send(&app, Method::GET, "/api/patients", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["patients"][0]["name"], "Bob");

    let path = format!("/api/patients/{id}");
    let (status, body) = send(&app, Method::GET, &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gender"], "M");

    // Partial update: only age changes, everything else stays put.
    let (status, body) = send(
        &app,
        Method::PUT,
        &path,
        Some(&token),
        Some(json!({ "age": 31 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patient"]["age"], 31);
    assert_eq!(body["patient"]["name"], "Bob");
    assert_eq!(body["patient"]["address"], "12 High St");

    let (status, _) = send(&app, Method::DELETE, &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_enum_values_are_field_errors() {
    let app = test_app();
    let token = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/patients",
        Some(&token),
        Some(json!({
            "name": "Bob",
            "age": 30,
            "gender": "X",
            "contact": "555",
            "address": "12 High St",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["gender"][0]
        .as_str()
        .unwrap()
        .contains("unrecognized value"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/doctors",
        Some(&token),
        Some(json!({
            "name": "Dr. Lee",
            "specialization": "Surgeon",
            "contact": "555",
            "address": "3 Clinic Way",
            "experience": 5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["specialization"].is_array());
}

#[tokio::test]
async fn records_are_invisible_across_accounts() {
    let app = test_app();
    let alice = register(&app, "alice").await;
    let carol = register(&app, "carol").await;

    let id = create_patient(&app, &alice, "Bob").await;
    let path = format!("/api/patients/{id}");

    let (status, _) = send(&app, Method::GET, &path, Some(&carol), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        Method::PUT,
        &path,
        Some(&carol),
        Some(json!({ "age": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &path, Some(&carol), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/patients", Some(&carol), None).await;
    assert_eq!(body["count"], 0);

    // Untouched for the owner.
    let (status, body) = send(&app, Method::GET, &path, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["age"], 30);
}

#[tokio::test]
async fn mapping_flow_with_duplicate_rejection() {
    let app = test_app();
    let token = register(&app, "alice").await;
    let patient_id = create_patient(&app, &token, "Bob").await;
    let doctor_id = create_doctor(&app, &token, "Dr. Lee").await;
    let link = json!({ "patient_id": patient_id, "doctor_id": doctor_id });

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/mappings",
        Some(&token),
        Some(link.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["mapping"]["patient_name"], "Bob");
    assert_eq!(body["mapping"]["doctor_name"], "Dr. Lee");
    assert_eq!(body["mapping"]["doctor_specialization"], "Cardiologist");
    let mapping_id = body["mapping"]["id"].as_i64().unwrap();

    // The same pair cannot be linked twice.
    let (status, body) = send(&app, Method::POST, "/api/mappings", Some(&token), Some(link)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already assigned"));

    let (_, body) = send(&app, Method::GET, "/api/mappings", Some(&token), None).await;
    assert_eq!(body["count"], 1);

    let path = format!("/api/mappings/{patient_id}");
    let (status, body) = send(&app, Method::GET, &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patient"], "Bob");
    assert_eq!(body["doctors_count"], 1);

    let path = format!("/api/mappings/{mapping_id}");
    let (status, _) = send(&app, Method::DELETE, &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/mappings", Some(&token), None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn mapping_endpoints_must_be_owned() {
    let app = test_app();
    let alice = register(&app, "alice").await;
    let carol = register(&app, "carol").await;

    let foreign_patient = create_patient(&app, &carol, "Eve").await;
    let doctor_id = create_doctor(&app, &alice, "Dr. Lee").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/mappings",
        Some(&alice),
        Some(json!({ "patient_id": foreign_patient, "doctor_id": doctor_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let path = format!("/api/mappings/{foreign_patient}");
    let (status, _) = send(&app, Method::GET, &path, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_record_cascades_its_mappings() {
    let app = test_app();
    let token = register(&app, "alice").await;
    let patient_id = create_patient(&app, &token, "Bob").await;
    let doctor_id = create_doctor(&app, &token, "Dr. Lee").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/mappings",
        Some(&token),
        Some(json!({ "patient_id": patient_id, "doctor_id": doctor_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let path = format!("/api/patients/{patient_id}");
    let (status, _) = send(&app, Method::DELETE, &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/mappings", Some(&token), None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
