use actix_web::http::StatusCode;
use actix_web::{test, web, App as ActixApp};
use gatehouse::http::{controllers, json_config};
use gatehouse::store::MemoryUserStore;
use gatehouse::{config, App};
use serde_json::{json, Value};
use std::sync::Arc;

async fn seeded_app() -> (Arc<MemoryUserStore>, App) {
    let store = Arc::new(MemoryUserStore::new());
    let app = App::with_store(config::Server::for_tests(), store.clone());

    app.auth
        .register("admin", "admin@example.com", "admin")
        .await
        .unwrap();

    (store, app)
}

/// Mints a session token straight from the auth core; the HTTP login
/// path has its own tests.
async fn admin_token(app: &App) -> String {
    let user = app.auth.authenticate("admin", "admin").await.unwrap();
    app.auth.login(&user).unwrap()
}

macro_rules! init_service {
    ($app:expr) => {
        test::init_service(
            ActixApp::new()
                .app_data(web::Data::new($app.clone()))
                .app_data(json_config())
                .configure(controllers::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn login_and_profile_roundtrip() {
    let (_store, app) = seeded_app().await;
    let service = init_service!(&app);

    let req = test::TestRequest::post()
        .uri("/auth.AuthService/Login")
        .set_json(json!({ "username": "admin", "password": "admin" }))
        .to_request();

    let body: Value = test::call_and_read_body_json(&service, req).await;
    let token = body["access_token"].as_str().unwrap().to_owned();
    assert!(!token.is_empty());

    let req = test::TestRequest::post()
        .uri("/auth.AuthService/GetProfile")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();

    let body: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["email"], "admin@example.com");
    assert!(body["user"]["id"].is_i64());
}

#[actix_web::test]
async fn bad_password_and_unknown_user_answer_identically() {
    let (_store, app) = seeded_app().await;
    let service = init_service!(&app);

    let mut bodies = Vec::new();
    for payload in [
        json!({ "username": "admin", "password": "wrong" }),
        json!({ "username": "nobody", "password": "wrong" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/auth.AuthService/Login")
            .set_json(payload)
            .to_request();

        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        bodies.push(body);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0]["error"], "Invalid credentials");
}

#[actix_web::test]
async fn login_rejects_missing_and_empty_fields() {
    let (_store, app) = seeded_app().await;
    let service = init_service!(&app);

    // A missing field never deserializes.
    let req = test::TestRequest::post()
        .uri("/auth.AuthService/Login")
        .set_json(json!({ "username": "admin" }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Present but empty fields fail validation.
    let req = test::TestRequest::post()
        .uri("/auth.AuthService/Login")
        .set_json(json!({ "username": "", "password": "" }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn profile_requires_a_wellformed_bearer_header() {
    let (_store, app) = seeded_app().await;
    let service = init_service!(&app);

    let missing = test::TestRequest::post()
        .uri("/auth.AuthService/GetProfile")
        .to_request();
    let resp = test::call_service(&service, missing).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "Authorization header with Bearer token is required"
    );

    for header in ["Token abc", "Bearer ", "bogus"] {
        let req = test::TestRequest::post()
            .uri("/auth.AuthService/GetProfile")
            .insert_header(("Authorization", header))
            .to_request();

        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn profile_rejects_garbage_tokens() {
    let (_store, app) = seeded_app().await;
    let service = init_service!(&app);

    let req = test::TestRequest::post()
        .uri("/auth.AuthService/GetProfile")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();

    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid or expired token");
}

#[actix_web::test]
async fn profile_of_a_deleted_user_is_unauthorized() {
    let (store, app) = seeded_app().await;
    let service = init_service!(&app);

    let token = admin_token(&app).await;
    let admin = app.auth.get_profile(&token).await.unwrap();
    assert!(store.delete(admin.id));

    let req = test::TestRequest::post()
        .uri("/auth.AuthService/GetProfile")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();

    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn health_reports_ok() {
    let (_store, app) = seeded_app().await;
    let service = init_service!(&app);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&service, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "gatehouse");
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn send_messages_counts_and_echoes() {
    let (_store, app) = seeded_app().await;
    let service = init_service!(&app);
    let token = admin_token(&app).await;

    let req = test::TestRequest::post()
        .uri("/auth.AuthService/SendMessages")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "messages": [
                { "message": "one" },
                { "message": "two" },
                { "message": "three" },
            ]
        }))
        .to_request();

    let body: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(body["total_messages"], 3);
    assert_eq!(body["status"], "success");
    assert_eq!(body["processed_messages"], json!(["one", "two", "three"]));
}

#[actix_web::test]
async fn chat_stream_echoes_with_a_rewritten_sender() {
    let (_store, app) = seeded_app().await;
    let service = init_service!(&app);
    let token = admin_token(&app).await;

    let req = test::TestRequest::post()
        .uri("/auth.AuthService/ChatStream")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "username": "alice",
            "message": "hello there",
            "room": "general",
        }))
        .to_request();

    let body: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(body["username"], "Server (echoing alice)");
    assert_eq!(body["message"], "Echo: hello there");
    assert_eq!(body["room"], "general");
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn notification_stream_pushes_then_ends() {
    let (_store, app) = seeded_app().await;
    let service = init_service!(&app);
    let token = admin_token(&app).await;

    let req = test::TestRequest::get()
        .uri("/auth.AuthService/StreamNotifications?duration_seconds=3")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();

    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    let body = test::read_body(resp).await;
    let body = std::str::from_utf8(&body).unwrap();

    let events: Vec<Value> = body
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect();

    // Exactly three pushes, then the terminal event.
    assert_eq!(events.len(), 4);
    assert_eq!(events[0]["id"], "1");
    assert_eq!(events[1]["id"], "2");
    assert_eq!(events[2]["id"], "3");
    assert_eq!(events[3], json!({ "type": "end" }));

    let timestamps: Vec<&str> = events[..3]
        .iter()
        .map(|event| event["timestamp"].as_str().unwrap())
        .collect();
    assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[actix_web::test]
async fn notification_stream_requires_auth() {
    let (_store, app) = seeded_app().await;
    let service = init_service!(&app);

    let req = test::TestRequest::get()
        .uri("/auth.AuthService/StreamNotifications?duration_seconds=2")
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/auth.AuthService/StreamNotifications?duration_seconds=2")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
