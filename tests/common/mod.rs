use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test;
use serde_json::json;
use std::sync::Arc;

use tasknest::config::Config;
use tasknest::store::{MemoryStore, TaskStore, UserStore};

/// Fixed configuration for integration tests; no environment needed.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_port: 0,
        server_host: "127.0.0.1".to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        token_ttl_hours: 24,
    }
}

pub struct TestStores {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
}

/// One in-memory store behind both contracts, as the app sees them.
pub fn test_stores() -> TestStores {
    let store = Arc::new(MemoryStore::new());
    TestStores {
        users: store.clone(),
        tasks: store,
    }
}

pub async fn read_json<B: MessageBody>(resp: ServiceResponse<B>) -> serde_json::Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).expect("response body should be JSON")
}

pub async fn register<S, B>(app: &S, name: &str, email: &str, password: &str) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/user/register")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": password
        }))
        .to_request();
    test::call_service(app, req).await
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/user/login")
        .set_json(json!({
            "email": email,
            "password": password
        }))
        .to_request();
    test::call_service(app, req).await
}

/// Registers a fresh account and returns its bearer token.
pub async fn register_and_token<S, B>(app: &S, name: &str, email: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = register(app, name, email, password).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body = read_json(resp).await;
    body["token"]
        .as_str()
        .expect("registration should return a token")
        .to_string()
}
