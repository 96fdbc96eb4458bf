mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use tasknest::auth::{generate_token, AuthMiddleware};
use tasknest::error::json_error_handler;
use tasknest::routes;

macro_rules! test_app {
    ($config:expr, $stores:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($config.clone()))
                .app_data(web::Data::from($stores.users.clone()))
                .app_data(web::Data::from($stores.tasks.clone()))
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .service(routes::health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware::new($stores.users.clone(), &$config))
                        .configure(routes::config),
                ),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_register_login_and_me_flow() {
    let config = common::test_config();
    let stores = common::test_stores();
    let app = test_app!(config, stores);

    // Register a new user; email should come back normalized, without any hash.
    let resp = common::register(&app, "Alice", "Alice@Example.com", "Password123!").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = common::read_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"].get("password_hash").is_none());

    // Registering the same email again conflicts.
    let resp = common::register(&app, "Alice", "alice@example.com", "Password123!").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = common::read_json(resp).await;
    assert_eq!(body["success"], false);

    // Login succeeds and issues a token.
    let resp = common::login(&app, "alice@example.com", "Password123!").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::read_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    // Wrong password and unknown email fail identically: the response must not
    // reveal whether the address is registered.
    let resp = common::login(&app, "alice@example.com", "wrong-password").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let wrong_pw_body = common::read_json(resp).await;

    let resp = common::login(&app, "nobody@example.com", "Password123!").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = common::read_json(resp).await;
    assert_eq!(wrong_pw_body["message"], unknown_body["message"]);

    // The token unlocks the caller's own profile.
    let req = test::TestRequest::get()
        .uri("/api/user/me")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::read_json(resp).await;
    assert_eq!(body["user"]["name"], "Alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
}

#[actix_rt::test]
async fn test_private_routes_reject_bad_credentials() {
    let config = common::test_config();
    let stores = common::test_stores();
    let app = test_app!(config, stores);

    // No Authorization header at all.
    let req = test::TestRequest::get().uri("/api/user/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = common::read_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Not authorized, token missing");

    // Header present but not of the Bearer form.
    let req = test::TestRequest::get()
        .uri("/api/user/me")
        .append_header(("Authorization", "Basic abcdef"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Garbage token. The rejection is a rendered JSON response, not a bare
    // service error.
    let req = test::TestRequest::get()
        .uri("/api/user/me")
        .append_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = common::read_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Token invalid"));

    // Expired token for a real user.
    let token = common::register_and_token(&app, "Bob", "bob@example.com", "Password123!").await;
    assert!(!token.is_empty());
    let resp = common::login(&app, "bob@example.com", "Password123!").await;
    let body = common::read_json(resp).await;
    let user_id: Uuid = serde_json::from_value(body["user"]["id"].clone()).unwrap();

    let expired = generate_token(user_id, &config.jwt_secret, -2).unwrap();
    let req = test::TestRequest::get()
        .uri("/api/user/me")
        .append_header(("Authorization", format!("Bearer {}", expired)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = common::read_json(resp).await;
    assert_eq!(body["success"], false);

    // Structurally valid token whose subject no longer resolves to an account.
    let stale = generate_token(Uuid::new_v4(), &config.jwt_secret, 24).unwrap();
    let req = test::TestRequest::get()
        .uri("/api/user/me")
        .append_header(("Authorization", format!("Bearer {}", stale)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = common::read_json(resp).await;
    assert_eq!(body["message"], "User not found");
}

#[actix_rt::test]
async fn test_register_validation() {
    let config = common::test_config();
    let stores = common::test_stores();
    let app = test_app!(config, stores);

    // Invalid email.
    let resp = common::register(&app, "Alice", "not-an-email", "Password123!").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = common::read_json(resp).await;
    assert_eq!(body["success"], false);

    // Short password.
    let resp = common::register(&app, "Alice", "alice@example.com", "pw").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Missing field entirely (handled by the JSON error handler).
    let req = test::TestRequest::post()
        .uri("/api/user/register")
        .set_json(json!({ "email": "alice@example.com", "password": "Password123!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = common::read_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn test_update_profile() {
    let config = common::test_config();
    let stores = common::test_stores();
    let app = test_app!(config, stores);

    let token = common::register_and_token(&app, "Alice", "alice@example.com", "Password123!").await;
    common::register(&app, "Bob", "bob@example.com", "Password123!").await;

    // Partial update: name and avatar only, email untouched.
    let req = test::TestRequest::put()
        .uri("/api/user/profile")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "name": "Alice Cooper", "avatar": "https://example.com/a.png" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::read_json(resp).await;
    assert_eq!(body["user"]["name"], "Alice Cooper");
    assert_eq!(body["user"]["avatar"], "https://example.com/a.png");
    assert_eq!(body["user"]["email"], "alice@example.com");

    // Changing to an email already in use conflicts.
    let req = test::TestRequest::put()
        .uri("/api/user/profile")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "email": "bob@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Changing to a fresh email works and is normalized.
    let req = test::TestRequest::put()
        .uri("/api/user/profile")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "email": "Alice.Cooper@Example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::read_json(resp).await;
    assert_eq!(body["user"]["email"], "alice.cooper@example.com");
}

#[actix_rt::test]
async fn test_update_password() {
    let config = common::test_config();
    let stores = common::test_stores();
    let app = test_app!(config, stores);

    let token = common::register_and_token(&app, "Alice", "alice@example.com", "old-password").await;

    // Wrong current password is rejected.
    let req = test::TestRequest::put()
        .uri("/api/user/password")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "current_password": "guess", "new_password": "new-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Correct current password accepts the change.
    let req = test::TestRequest::put()
        .uri("/api/user/password")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "current_password": "old-password", "new_password": "new-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Old password no longer works; the new one does.
    let resp = common::login(&app, "alice@example.com", "old-password").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = common::login(&app, "alice@example.com", "new-password").await;
    assert_eq!(resp.status(), StatusCode::OK);
}
