//! Router-level tests: the full `/api` tree over an in-memory store, with the
//! catalog pointed at a port nothing listens on.

mod accounts;
mod reviews;

use std::time::Duration;

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use shelf_catalog::{CatalogClient, CatalogConfig};
use shelf_core::{store::BookshelfStore, user::UserPatch};
use shelf_store_sqlite::SqliteStore;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{AppState, HttpOptions, TokenConfig, app};

pub(crate) struct Harness {
  pub store:  SqliteStore,
  pub router: Router,
}

impl Harness {
  pub async fn new() -> Self { Self::with_options(HttpOptions::default()).await }

  pub async fn with_options(options: HttpOptions) -> Self {
    let store = SqliteStore::open_in_memory().await.expect("in-memory store");
    let catalog = CatalogClient::new(CatalogConfig {
      base_url: "http://127.0.0.1:1".into(),
      api_key:  None,
      timeout:  Duration::from_millis(500),
    })
    .expect("catalog client");
    let state = AppState::new(store.clone(), catalog, TokenConfig::new("test-secret", 7));
    Self { store, router: app(state, &options) }
  }

  pub async fn send(
    &self,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(body) => req
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string())),
      None => req.body(Body::empty()),
    }
    .unwrap();

    let response = self.router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
  }

  pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    self.send(Method::GET, uri, token, None).await
  }

  pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    self.send(Method::POST, uri, token, Some(body)).await
  }

  pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    self.send(Method::PUT, uri, token, Some(body)).await
  }

  pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    self.send(Method::DELETE, uri, token, None).await
  }

  /// Register `username` with password `secret1`; returns `(token, id)`.
  pub async fn register(&self, username: &str) -> (String, Uuid) {
    let (status, body) = self
      .post(
        "/api/auth/register",
        None,
        json!({
          "username": username,
          "email": format!("{username}@example.com"),
          "password": "secret1",
          "displayName": username.to_uppercase(),
        }),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let token = body["token"].as_str().unwrap().to_owned();
    let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
    (token, id)
  }

  pub async fn register_admin(&self, username: &str) -> (String, Uuid) {
    let (token, id) = self.register(username).await;
    self
      .store
      .update_user(id, UserPatch { is_admin: Some(true), ..Default::default() })
      .await
      .unwrap()
      .unwrap();
    (token, id)
  }

  pub async fn add_book(&self, token: &str, title: &str, author: &str) -> Uuid {
    let (status, body) =
      self.post("/api/books", Some(token), json!({ "title": title, "author": author })).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().parse().unwrap()
  }

  pub async fn review(&self, token: &str, book_id: Uuid, rating: u8, text: &str) -> Value {
    let (status, body) = self
      .post(
        "/api/reviews",
        Some(token),
        json!({
          "bookId": book_id,
          "rating": rating,
          "readStatus": "read",
          "reviewText": text,
        }),
      )
      .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
  }
}

/// Error bodies carry a machine-readable code.
pub(crate) fn code(body: &Value) -> &str { body["code"].as_str().unwrap_or_default() }

pub(crate) fn error_fields(body: &Value) -> Vec<String> {
  body["errors"]
    .as_array()
    .map(|errors| {
      errors
        .iter()
        .filter_map(|e| e["field"].as_str().map(str::to_owned))
        .collect()
    })
    .unwrap_or_default()
}

// ─── Cross-cutting ────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_connected_database() {
  let h = Harness::new().await;
  let (status, body) = h.get("/api/health", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ok");
  assert_eq!(body["database"], "connected");
  assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
  let h = Harness::new().await;
  let req = Request::builder()
    .method(Method::POST)
    .uri("/api/auth/login")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let response = h.router.clone().oneshot(req).await.unwrap();
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(code(&body), "VALIDATION_ERROR");
  assert_eq!(error_fields(&body), ["body"]);
}

fn failing_router(expose: bool) -> Router {
  use axum::{middleware, routing::get};

  use crate::{ApiError, attach_error_detail};

  Router::new()
    .route(
      "/boom",
      get(|| async { Err::<(), _>(ApiError::Internal("disk on fire".into())) }),
    )
    .layer(middleware::map_response_with_state(expose, attach_error_detail))
}

async fn call(router: Router, uri: &str) -> (StatusCode, Value) {
  let response = router
    .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
    .await
    .unwrap();
  let status = response.status();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn server_error_detail_is_hidden_by_default() {
  let (status, body) = call(failing_router(false), "/boom").await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["error"], "server error");
  assert!(body.get("detail").is_none());
}

#[tokio::test]
async fn server_error_detail_is_exposed_when_enabled() {
  let (status, body) = call(failing_router(true), "/boom").await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(code(&body), "INTERNAL_ERROR");
  assert!(body["detail"].as_str().unwrap().contains("disk on fire"));
}
