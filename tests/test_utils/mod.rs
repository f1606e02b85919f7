//! Test utilities for integration tests
use std::env;
use std::fs;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use tower::util::ServiceExt;

use ephemail::api::AppState;
use ephemail::api::app;
use ephemail::core::AppConfig;
use ephemail::core::db::async_db;
use ephemail::core::db::initialize_db;
use ephemail::settings;

/// Creates a test application router backed by a throwaway database.
///
/// Registration order matters to tests (the first account becomes the
/// emperor), so add `#[serial]` to the test function to keep the
/// bootstrap deterministic.
pub async fn test_app() -> Router {
    // An unroutable provider URL; tests that send mail use
    // `test_app_with_provider` instead.
    let (app, _db) = test_app_with_db("http://localhost:9").await;
    app
}

/// Like `test_app` with outbound mail pointed at the given base URL so
/// a mockito server can stand in for the provider.
pub async fn test_app_with_provider(resend_api_url: &str) -> Router {
    let (app, _db) = test_app_with_db(resend_api_url).await;
    app
}

/// Builds the router and also hands back the database connection for
/// tests that need to reach behind the API.
pub async fn test_app_with_db(resend_api_url: &str) -> (Router, tokio_rusqlite::Connection) {
    // Create a unique directory for the test with a randomly
    // generated name using a timestamp to avoid collisions and
    // vulnerabilities
    let temp_dir = env::temp_dir();
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
        .to_string();
    let dir = temp_dir.join(ts);
    let db_path = dir.join("db");
    fs::create_dir_all(&db_path).expect("Failed to create db directory");

    let db_path_str = db_path.to_str().unwrap();
    let db = async_db(db_path_str)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to migrate db");
        Ok(())
    })
    .await
    .unwrap();

    // Every suite needs at least one domain to create mailboxes under
    settings::set_setting(&db, settings::EMAIL_DOMAINS, "ephemail.test")
        .await
        .unwrap();

    let app_config = AppConfig {
        storage_path: dir.display().to_string(),
        db_path: db_path_str.to_string(),
        resend_api_url: resend_api_url.to_string(),
    };
    let app_state = AppState::new(db.clone(), app_config);
    (app(Arc::new(RwLock::new(app_state))), db)
}

/// Reads a response body out to a string
pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Registers an account and returns its id and API key. The first
/// account registered on a fresh app is the emperor.
pub async fn register_user(app: &Router, email: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::json!({ "email": email }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_string(response.into_body()).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    (
        json["user"]["id"].as_str().unwrap().to_string(),
        json["apiKey"].as_str().unwrap().to_string(),
    )
}

/// Creates a permanent mailbox under the test domain and returns its
/// id and address.
pub async fn create_mailbox(app: &Router, api_key: &str, name: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/mailboxes")
                .method("POST")
                .header("content-type", "application/json")
                .header("x-api-key", api_key)
                .body(Body::from(
                    serde_json::json!({
                        "name": name,
                        "domain": "ephemail.test",
                        "expiryTime": 0,
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_string(response.into_body()).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    (
        json["id"].as_str().unwrap().to_string(),
        json["address"].as_str().unwrap().to_string(),
    )
}

/// Posts an inbound message to an address through the mail bridge
/// endpoint and returns the response status.
pub async fn deliver_inbound(app: &Router, to: &str, subject: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/inbound")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "from": "sender@example.com",
                        "to": to,
                        "subject": subject,
                        "content": format!("Body of {}", subject),
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    response.status()
}
