use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use study_match_core::testing::MemStore;

fn app() -> Router {
    api_lib::build_router(api_lib::test_state(Arc::new(MemStore::new())))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Signs up a fresh user, returning the session cookie and the uid.
async fn signup(app: &Router, email: &str) -> (String, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/auth/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"email": email, "password": "hunter22"}).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("signup sets a session cookie")
        .to_string();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let uid = body["uid"].as_str().expect("signup returns uid").to_string();
    (cookie, uid)
}

fn profile_payload(name: &str) -> Value {
    json!({
        "fullName": name,
        "preferredStudyTime": "morning",
        "classes": {"Calc": 1},
        "major": "Math",
        "year": "sophomore",
        "description": "looking for a study partner",
    })
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = app();
    for (method, uri) in [
        ("GET", "/api/next_batch"),
        ("POST", "/api/submit_swipe"),
        ("GET", "/api/matches"),
        ("GET", "/api/profile"),
        ("POST", "/api/update-profile"),
    ] {
        let (status, _) = send(&app, method, uri, None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn signup_profile_roundtrip() {
    let app = app();
    let (cookie, uid) = signup(&app, "ada@example.edu").await;

    // No profile document yet.
    let (status, _) = send(&app, "GET", "/api/profile", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/update-profile",
        Some(&cookie),
        Some(profile_payload("Ada")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/profile", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uid"], uid);
    assert_eq!(body["fullName"], "Ada");
    assert_eq!(body["preferredStudyTime"], "MORNING");
    assert_eq!(body["classes"]["Calc"], 1);
    assert_eq!(body["year"], "sophomore");
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let app = app();
    signup(&app, "dup@example.edu").await;
    let (status, _) = send(
        &app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({"email": "dup@example.edu", "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_profile_payloads_are_rejected() {
    let app = app();
    let (cookie, _) = signup(&app, "bob@example.edu").await;

    let mut bad_year = profile_payload("Bob");
    bad_year["year"] = json!("5th");
    let mut bad_level = profile_payload("Bob");
    bad_level["classes"] = json!({"Calc": 7});
    let mut bad_name = profile_payload("Bob");
    bad_name["fullName"] = json!("   ");

    for payload in [bad_year, bad_level, bad_name] {
        let (status, _) = send(&app, "POST", "/api/update-profile", Some(&cookie), Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn swipe_validation() {
    let app = app();
    let (cookie, uid) = signup(&app, "carol@example.edu").await;

    // Malformed direction.
    let (status, _) = send(
        &app,
        "POST",
        "/api/submit_swipe",
        Some(&cookie),
        Some(json!({"targetUid": "someone", "direction": "up"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Self-swipe.
    let (status, _) = send(
        &app,
        "POST",
        "/api/submit_swipe",
        Some(&cookie),
        Some(json!({"targetUid": uid, "direction": "right"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = app();
    let (cookie, _) = signup(&app, "dave@example.edu").await;

    let (status, _) = send(&app, "POST", "/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/next_batch", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
