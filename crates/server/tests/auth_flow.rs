mod support;

use axum::http::StatusCode;
use serde_json::json;

use support::{app, json_request, multipart_request, send, empty_request, Part, PNG};

#[tokio::test]
async fn signup_login_and_list_users() {
    let t = app();

    let req = multipart_request("POST", "/api/users/signup", None, &[
        Part::Text("name", "Ann"),
        Part::Text("email", "Ann@Example.com"),
        Part::Text("password", "hunter22"),
        Part::File("image", "image/png", PNG),
    ]);
    let (status, body) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["email"], "ann@example.com");
    let token = body["token"].as_str().unwrap().to_string();
    let who = t.gate.verify_token(&token).unwrap();
    assert_eq!(who.user_id.to_string(), body["user_id"].as_str().unwrap());
    assert_eq!(t.media.stored_count(), 1);

    let (status, body) = send(&t.router, json_request("POST", "/api/users/login", None, json!({"email": "ann@example.com", "password": "hunter22"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ann");

    let (status, body) = send(&t.router, json_request("POST", "/api/users/login", None, json!({"email": "ann@example.com", "password": "nope-nope"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = send(&t.router, empty_request("GET", "/api/users", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
    assert!(body["users"][0].get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_signup_is_conflict_and_bad_input_is_422() {
    let t = app();
    let parts = [Part::Text("name", "Bob"), Part::Text("email", "bob@example.com"), Part::Text("password", "secret1")];
    let (status, _) = send(&t.router, multipart_request("POST", "/api/users/signup", None, &parts)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&t.router, multipart_request("POST", "/api/users/signup", None, &parts)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1002);

    let short = [Part::Text("name", "Cy"), Part::Text("email", "cy@example.com"), Part::Text("password", "123")];
    let (status, body) = send(&t.router, multipart_request("POST", "/api/users/signup", None, &short)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_failed");
}

#[tokio::test]
async fn health_and_metrics_are_public() {
    let t = app();
    let (status, body) = send(&t.router, empty_request("GET", "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, _) = send(&t.router, empty_request("GET", "/metrics", None)).await;
    assert_eq!(status, StatusCode::OK);
}
