//! Integration tests for the webhook settings API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serial_test::serial;
    use tower::util::ServiceExt;

    use crate::test_utils::{body_to_string, register_user, test_app};

    async fn save_webhook(
        app: &axum::Router,
        api_key: &str,
        url: &str,
        enabled: bool,
    ) -> axum::http::Response<Body> {
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/webhook")
                    .method("POST")
                    .header("content-type", "application/json")
                    .header("x-api-key", api_key)
                    .body(Body::from(
                        serde_json::json!({ "url": url, "enabled": enabled }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn get_webhook(app: &axum::Router, api_key: &str) -> serde_json::Value {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/webhook")
                    .header("x-api-key", api_key)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_string(response.into_body()).await;
        serde_json::from_str(&body).unwrap()
    }

    /// Tests the defaults before anything is saved
    #[tokio::test]
    #[serial]
    async fn it_reports_webhook_defaults() {
        let app = test_app().await;
        let (_user_id, api_key) = register_user(&app, "alice@example.com").await;

        let json = get_webhook(&app, &api_key).await;

        assert_eq!(json["enabled"], false);
        assert_eq!(json["url"], "");
    }

    /// Tests the save and read round trip
    #[tokio::test]
    #[serial]
    async fn it_round_trips_webhook_settings() {
        let app = test_app().await;
        let (_user_id, api_key) = register_user(&app, "alice@example.com").await;

        let response =
            save_webhook(&app, &api_key, "https://example.com/hook", true).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = get_webhook(&app, &api_key).await;
        assert_eq!(json["enabled"], true);
        assert_eq!(json["url"], "https://example.com/hook");

        // Saving again replaces rather than duplicates
        let response =
            save_webhook(&app, &api_key, "https://example.com/other", false).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = get_webhook(&app, &api_key).await;
        assert_eq!(json["enabled"], false);
        assert_eq!(json["url"], "https://example.com/other");
    }

    /// Tests that only http and https targets are accepted
    #[tokio::test]
    #[serial]
    async fn it_rejects_non_http_urls() {
        let app = test_app().await;
        let (_user_id, api_key) = register_user(&app, "alice@example.com").await;

        let response = save_webhook(&app, &api_key, "ftp://example.com/hook", true).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_to_string(response.into_body()).await;
        assert!(body.contains("Invalid webhook URL"));
    }

    /// Tests that civilians cannot manage webhooks
    #[tokio::test]
    #[serial]
    async fn it_forbids_civilians() {
        let app = test_app().await;
        let (_alice_id, _alice_key) = register_user(&app, "alice@example.com").await;
        let (_bob_id, bob_key) = register_user(&app, "bob@example.com").await;

        let response = save_webhook(&app, &bob_key, "https://example.com/hook", true).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    /// Tests firing a sample notification at a target
    #[tokio::test]
    #[serial]
    async fn it_sends_a_test_notification() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header("x-webhook-event", "new_message")
            .with_status(200)
            .expect(1)
            .create();

        let app = test_app().await;
        let (_user_id, api_key) = register_user(&app, "alice@example.com").await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/webhook/test")
                    .method("POST")
                    .header("content-type", "application/json")
                    .header("x-api-key", &api_key)
                    .body(Body::from(
                        serde_json::json!({ "url": format!("{}/hook", server.url()) })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        mock.assert();
    }

    /// Tests that a failing target surfaces as a gateway error
    #[tokio::test]
    #[serial]
    async fn it_reports_a_failed_test_notification() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/hook").with_status(500).create();

        let app = test_app().await;
        let (_user_id, api_key) = register_user(&app, "alice@example.com").await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/webhook/test")
                    .method("POST")
                    .header("content-type", "application/json")
                    .header("x-api-key", &api_key)
                    .body(Body::from(
                        serde_json::json!({ "url": format!("{}/hook", server.url()) })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_to_string(response.into_body()).await;
        assert!(body.contains("Webhook test failed"));
    }
}
