use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::net::SocketAddr;
use study_gate::{config::ServerConfig, context::AppContext, db, server::build_router};
use tower::ServiceExt;

/// Default admin secret seeded by the test configuration
#[allow(dead_code)]
pub const ADMIN_SECRET: &str = "10012002";

/// Create a test app on a fresh in-memory database.
/// Returns the router and the shared context.
#[allow(dead_code)]
pub async fn create_test_app() -> (Router, AppContext) {
    create_test_app_with(ServerConfig::test_default()).await
}

/// Create a test app with a custom configuration.
#[allow(dead_code)]
pub async fn create_test_app_with(config: ServerConfig) -> (Router, AppContext) {
    let pool = db::create_memory_pool()
        .await
        .expect("Failed to open in-memory database");
    let ctx = AppContext::with_pool(config, pool)
        .await
        .expect("Failed to build app context");

    (build_router(ctx.clone()), ctx)
}

/// Send a request and decode the JSON body (Null when empty or not JSON).
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    dispatch(app, request).await
}

/// Send a pre-built request and decode the JSON body
#[allow(dead_code)]
pub async fn dispatch(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

#[allow(dead_code)]
pub async fn post(app: &Router, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body), token).await
}

#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, token).await
}

/// Register a student and return the new id.
#[allow(dead_code)]
pub async fn register(app: &Router, email: &str, password: &str) -> i64 {
    let (status, body) = post(
        app,
        "/api/auth/register",
        serde_json::json!({
            "name": "Ali",
            "email": email,
            "password": password,
            "phone": "0770",
            "grade": "G4"
        }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "registration failed: {}", body);
    body["id"].as_i64().expect("id in registration response")
}

/// Log in as admin and return the grant token.
#[allow(dead_code)]
pub async fn admin_token(app: &Router, secret: &str) -> String {
    let (status, body) = post(
        app,
        "/api/admin/login",
        serde_json::json!({ "password": secret }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "admin login failed: {}", body);
    body["token"].as_str().expect("token in admin login").to_string()
}

/// Student login.
#[allow(dead_code)]
pub async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    post(
        app,
        "/api/auth/login",
        serde_json::json!({ "email": email, "password": password }),
        None,
    )
    .await
}

/// Student login as seen from a specific peer address
#[allow(dead_code)]
pub async fn login_from(
    app: &Router,
    peer: &str,
    email: &str,
    password: &str,
) -> (StatusCode, Value) {
    let addr: SocketAddr = peer.parse().expect("peer address");
    let mut request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));

    dispatch(app, request).await
}
