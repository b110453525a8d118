//! Handler tests for the users domain
//!
//! Drive the auth, users and addresses routers over in-memory repositories:
//! - status codes and fixed messages
//! - caller identity from bearer tokens and cookies
//! - ownership checks on addresses

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum_helpers::{JwtAuth, JwtConfig};
use domain_users::addresses::handlers as address_handlers;
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()

const SECRET: &str = "handler-test-secret-with-32-characters!";

struct TestApp {
    router: Router,
    jwt: JwtAuth,
    addresses: Arc<InMemoryAddressRepository>,
}

impl TestApp {
    fn new() -> Self {
        let jwt = JwtAuth::new(&JwtConfig::new(SECRET).unwrap());
        let address_repo = InMemoryAddressRepository::new();
        let users = Arc::new(InMemoryUserRepository::with_addresses(address_repo.clone()));
        let addresses = Arc::new(address_repo);

        let user_service = UserService::new(users.clone(), addresses.clone());
        let address_service = AddressService::new(addresses.clone(), users.clone());

        let router = Router::new()
            .nest(
                "/auth",
                auth_handlers::auth_router(user_service.clone(), jwt.clone()),
            )
            .nest("/users", handlers::router(user_service, jwt.clone()))
            .nest(
                "/addresses",
                address_handlers::router(address_service, jwt.clone()),
            );

        Self {
            router,
            jwt,
            addresses,
        }
    }

    fn token_for(&self, user_id: i64) -> String {
        self.jwt
            .create_access_token(user_id, "someone@example.com", "Someone")
            .unwrap()
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    /// Registers a user and returns their id
    async fn register(&self, email: &str) -> i64 {
        let response = self
            .call(
                "POST",
                "/users",
                None,
                Some(json!({"name": "A", "email": email, "password": "p"})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = json_body(response).await;
        body["user"]["id"].as_i64().unwrap()
    }

    async fn add_address(&self, token: &str, street: &str) -> i64 {
        let response = self
            .call("POST", "/addresses", Some(token), Some(address_json(street)))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = json_body(response).await;
        body["address"]["id"].as_i64().unwrap()
    }
}

fn address_json(street: &str) -> Value {
    json!({
        "street": street,
        "city": "Springfield",
        "country": "US",
        "postal_code": "12345"
    })
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_register_returns_200_with_generated_id() {
    let app = TestApp::new();

    let response = app
        .call(
            "POST",
            "/users",
            None,
            Some(json!({"name": "A", "email": "a@x.com", "password": "p"})),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response).await;
    assert_eq!(body["message"], "User created successfully!");
    assert_eq!(body["user"]["id"], 1);
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_register_with_initial_addresses() {
    let app = TestApp::new();

    let response = app
        .call(
            "POST",
            "/users",
            None,
            Some(json!({
                "name": "A",
                "email": "a@x.com",
                "password": "p",
                "addresses": [address_json("1 Main St")]
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response).await;
    assert_eq!(body["user"]["addresses"][0]["street"], "1 Main St");
}

#[tokio::test]
async fn test_register_duplicate_email_returns_409() {
    let app = TestApp::new();
    app.register("a@x.com").await;

    let response = app
        .call(
            "POST",
            "/users",
            None,
            Some(json!({"name": "B", "email": "a@x.com", "password": "q"})),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_invalid_body_returns_400() {
    let app = TestApp::new();

    let missing_field = app
        .call("POST", "/users", None, Some(json!({"name": "A"})))
        .await;
    assert_eq!(missing_field.status(), StatusCode::BAD_REQUEST);

    let bad_email = app
        .call(
            "POST",
            "/users",
            None,
            Some(json!({"name": "A", "email": "nope", "password": "p"})),
        )
        .await;
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(bad_email).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_success_issues_usable_token() {
    let app = TestApp::new();
    let id = app.register("a@x.com").await;

    let response = app
        .call(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "a@x.com", "password": "p"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: LoginResponse = json_body(response).await;
    assert_eq!(body.token_type, "Bearer");
    assert_eq!(body.user.id, id);
    assert!(body.expires_in > 0);

    let me = app
        .call("GET", "/users/me", Some(&body.access_token), None)
        .await;
    assert_eq!(me.status(), StatusCode::OK);
    let profile: UserResponse = json_body(me).await;
    assert_eq!(profile.email, "a@x.com");
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_email_alike() {
    let app = TestApp::new();
    app.register("a@x.com").await;

    for (email, password) in [("a@x.com", "wrong"), ("nobody@x.com", "p")] {
        let response = app
            .call(
                "POST",
                "/auth/login",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = json_body(response).await;
        assert_eq!(body["message"], "Invalid username or password.");
    }
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new();

    let response = app.call("GET", "/users/me", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let garbage = app.call("GET", "/users/me", Some("not-a-jwt"), None).await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_accepts_cookie_token() {
    let app = TestApp::new();
    let id = app.register("a@x.com").await;

    let request = Request::builder()
        .method("GET")
        .uri("/users/me")
        .header(header::COOKIE, format!("access_token={}", app.token_for(id)))
        .body(Body::empty())
        .unwrap();

    assert_eq!(app.send(request).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_me_for_missing_user_returns_404() {
    let app = TestApp::new();

    let response = app
        .call("GET", "/users/me", Some(&app.token_for(77)), None)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response).await;
    assert_eq!(body["message"], "User not found.");
}

#[tokio::test]
async fn test_update_me_changes_profile() {
    let app = TestApp::new();
    let id = app.register("a@x.com").await;
    let token = app.token_for(id);

    let response = app
        .call(
            "PUT",
            "/users/me",
            Some(&token),
            Some(json!({"name": "Renamed"})),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let profile: UserResponse = json_body(response).await;
    assert_eq!(profile.name, "Renamed");
    assert_eq!(profile.email, "a@x.com");
}

#[tokio::test]
async fn test_update_me_to_taken_email_returns_409() {
    let app = TestApp::new();
    app.register("a@x.com").await;
    let id = app.register("b@x.com").await;

    let response = app
        .call(
            "PUT",
            "/users/me",
            Some(&app.token_for(id)),
            Some(json!({"email": "a@x.com"})),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_me_cascades_addresses() {
    let app = TestApp::new();
    let id = app.register("a@x.com").await;
    let token = app.token_for(id);
    app.add_address(&token, "1 Main St").await;
    app.add_address(&token, "2 Main St").await;

    let response = app.call("DELETE", "/users/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: MessageResponse = json_body(response).await;
    assert_eq!(body.message, "User deleted successfully");

    assert!(app.addresses.list_by_user(id).await.unwrap().is_empty());

    let again = app.call("DELETE", "/users/me", Some(&token), None).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_address_ignores_payload_owner() {
    let app = TestApp::new();
    let owner = app.register("a@x.com").await;
    let other = app.register("b@x.com").await;

    let mut payload = address_json("1 Main St");
    payload["user_id"] = json!(other);
    let response = app
        .call("POST", "/addresses", Some(&app.token_for(owner)), Some(payload))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response).await;
    assert_eq!(body["message"], "Address created successfully!");

    let address_id = body["address"]["id"].as_i64().unwrap();
    let stored = app.addresses.get_by_id(address_id).await.unwrap().unwrap();
    assert_eq!(stored.user_id, owner);
}

#[tokio::test]
async fn test_create_address_for_missing_user_returns_404() {
    let app = TestApp::new();

    let response = app
        .call(
            "POST",
            "/addresses",
            Some(&app.token_for(9)),
            Some(address_json("1 Main St")),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_mine_only_returns_callers_addresses() {
    let app = TestApp::new();
    let a = app.register("a@x.com").await;
    let b = app.register("b@x.com").await;
    app.add_address(&app.token_for(a), "a-street").await;
    app.add_address(&app.token_for(b), "b-street").await;

    let response = app
        .call("GET", "/addresses/mine", Some(&app.token_for(a)), None)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let list: Vec<AddressResponse> = json_body(response).await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].street, "a-street");
}

#[tokio::test]
async fn test_update_foreign_address_returns_404_without_mutation() {
    let app = TestApp::new();
    let user1 = app.register("one@x.com").await;
    let user2 = app.register("two@x.com").await;
    let user3 = app.register("three@x.com").await;

    for street in ["a", "b", "c", "d"] {
        app.add_address(&app.token_for(user1), street).await;
    }
    let target = app.add_address(&app.token_for(user3), "owned by three").await;
    assert_eq!((user2, target), (2, 5));

    let response = app
        .call(
            "PUT",
            "/addresses/5",
            Some(&app.token_for(user2)),
            Some(address_json("hijacked")),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response).await;
    assert_eq!(body["message"], "Address with ID 5 not found for current user.");

    let stored = app.addresses.get_by_id(5).await.unwrap().unwrap();
    assert_eq!(stored.street, "owned by three");
    assert_eq!(stored.user_id, user3);
}

#[tokio::test]
async fn test_update_own_address() {
    let app = TestApp::new();
    let id = app.register("a@x.com").await;
    let token = app.token_for(id);
    let address_id = app.add_address(&token, "old").await;

    let response = app
        .call(
            "PUT",
            &format!("/addresses/{}", address_id),
            Some(&token),
            Some(address_json("new")),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: MessageResponse = json_body(response).await;
    assert_eq!(body.message, "Address updated successfully");

    let fetched = app
        .call("GET", &format!("/addresses/{}", address_id), Some(&token), None)
        .await;
    let address: AddressResponse = json_body(fetched).await;
    assert_eq!(address.street, "new");
}

#[tokio::test]
async fn test_delete_foreign_address_returns_404() {
    let app = TestApp::new();
    let owner = app.register("a@x.com").await;
    let intruder = app.register("b@x.com").await;
    let address_id = app.add_address(&app.token_for(owner), "mine").await;

    let response = app
        .call(
            "DELETE",
            &format!("/addresses/{}", address_id),
            Some(&app.token_for(intruder)),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response).await;
    assert_eq!(
        body["message"],
        "Address not found or does not belong to the user."
    );
    assert!(app.addresses.get_by_id(address_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_own_address() {
    let app = TestApp::new();
    let owner = app.register("a@x.com").await;
    let token = app.token_for(owner);
    let address_id = app.add_address(&token, "mine").await;

    let response = app
        .call("DELETE", &format!("/addresses/{}", address_id), Some(&token), None)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: MessageResponse = json_body(response).await;
    assert_eq!(body.message, "Address deleted successfully");
    assert!(app.addresses.get_by_id(address_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_foreign_address_returns_404() {
    let app = TestApp::new();
    let owner = app.register("a@x.com").await;
    let other = app.register("b@x.com").await;
    let address_id = app.add_address(&app.token_for(owner), "mine").await;

    let response = app
        .call(
            "GET",
            &format!("/addresses/{}", address_id),
            Some(&app.token_for(other)),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_address_id_returns_400() {
    let app = TestApp::new();
    let owner = app.register("a@x.com").await;

    let response = app
        .call("GET", "/addresses/abc", Some(&app.token_for(owner)), None)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_addresses_require_token() {
    let app = TestApp::new();

    let response = app
        .call("POST", "/addresses", None, Some(address_json("x")))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
