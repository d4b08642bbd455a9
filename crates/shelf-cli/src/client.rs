//! Async HTTP client wrapping the Shelf JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use shelf_core::{
  book::{BookDetail, SearchResults},
  review::{ReadStatus, ReviewView},
  user::{FollowOutcome, ProfilePage, PublicProfile, Session},
};
use uuid::Uuid;

/// Connection settings for the Shelf API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Bearer token from a previous login, if any.
  pub token:    Option<String>,
}

/// Body of `POST /api/reviews`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
  pub book_id:     Uuid,
  pub rating:      u8,
  pub read_status: ReadStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub review_text: Option<String>,
  pub is_public:   bool,
}

/// Async HTTP client for the Shelf JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  fn require_token(&self) -> Result<()> {
    if self.config.token.is_none() {
      return Err(anyhow!("not logged in; run `shelf login` first"));
    }
    Ok(())
  }

  /// Send `req` and decode a successful JSON body; error bodies become the
  /// server's message.
  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
    let resp = self.auth(req).send().await.with_context(|| format!("{what} failed"))?;
    let resp = check(resp, what).await?;
    resp.json().await.with_context(|| format!("deserialising {what}"))
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  /// `POST /api/auth/register`
  pub async fn register(
    &self,
    username: &str,
    email: &str,
    password: &str,
    display_name: &str,
  ) -> Result<Session> {
    let body = json!({
      "username": username,
      "email": email,
      "password": password,
      "displayName": display_name,
    });
    self
      .send(self.client.post(self.url("/auth/register")).json(&body), "POST /auth/register")
      .await
  }

  /// `POST /api/auth/login`
  pub async fn login(&self, login: &str, password: &str) -> Result<Session> {
    let body = json!({ "login": login, "password": password });
    self
      .send(self.client.post(self.url("/auth/login")).json(&body), "POST /auth/login")
      .await
  }

  /// `GET /api/auth/me`
  pub async fn me(&self) -> Result<PublicProfile> {
    self.require_token()?;
    self.send(self.client.get(self.url("/auth/me")), "GET /auth/me").await
  }

  // ── Books ─────────────────────────────────────────────────────────────────

  /// `GET /api/books/search?q=<q>`
  pub async fn search(&self, query: &str) -> Result<SearchResults> {
    self
      .send(
        self.client.get(self.url("/books/search")).query(&[("q", query)]),
        "GET /books/search",
      )
      .await
  }

  /// `GET /api/books/{id}`
  pub async fn book(&self, id: Uuid) -> Result<BookDetail> {
    self
      .send(self.client.get(self.url(&format!("/books/{id}"))), "GET /books/{id}")
      .await
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  /// `POST /api/reviews`
  pub async fn review(&self, review: &ReviewRequest) -> Result<ReviewView> {
    self.require_token()?;
    self
      .send(self.client.post(self.url("/reviews")).json(review), "POST /reviews")
      .await
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// `GET /api/users/{username}`
  pub async fn profile(&self, username: &str) -> Result<ProfilePage> {
    self
      .send(self.client.get(self.url(&format!("/users/{username}"))), "GET /users/{username}")
      .await
  }

  /// `POST /api/users/{id}/follow`
  pub async fn follow(&self, user_id: Uuid) -> Result<FollowOutcome> {
    self.require_token()?;
    self
      .send(
        self.client.post(self.url(&format!("/users/{user_id}/follow"))),
        "POST /users/{id}/follow",
      )
      .await
  }
}

/// Pass successful responses through; turn error responses into an error
/// carrying the server's message.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body: Value = resp.json().await.unwrap_or(Value::Null);
  Err(anyhow!("{what} → {status}: {}", error_message(&body)))
}

/// Flatten an API error body into one line.
pub fn error_message(body: &Value) -> String {
  let mut message = body["error"].as_str().unwrap_or("request failed").to_string();

  if let Some(errors) = body["errors"].as_array() {
    let details: Vec<String> = errors
      .iter()
      .filter_map(|e| e["message"].as_str().map(str::to_owned))
      .collect();
    if !details.is_empty() {
      message = format!("{message}: {}", details.join("; "));
    }
  } else if let Some(field) = body["field"].as_str() {
    message = format!("{message} ({field})");
  }
  message
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validation_errors_are_listed() {
    let body = json!({
      "error": "validation failed",
      "code": "VALIDATION_ERROR",
      "errors": [
        { "field": "email", "message": "email must be a valid address" },
        { "field": "password", "message": "password must be at least 6 characters" },
      ],
    });
    assert_eq!(
      error_message(&body),
      "validation failed: email must be a valid address; password must be at least 6 characters"
    );
  }

  #[test]
  fn conflicts_name_the_field() {
    let body = json!({ "error": "username already exists", "code": "CONFLICT", "field": "username" });
    assert_eq!(error_message(&body), "username already exists (username)");
  }

  #[test]
  fn non_json_errors_fall_back() {
    assert_eq!(error_message(&Value::Null), "request failed");
  }

  #[test]
  fn review_request_uses_wire_names() {
    let req = ReviewRequest {
      book_id:     Uuid::nil(),
      rating:      4,
      read_status: ReadStatus::CurrentlyReading,
      review_text: None,
      is_public:   true,
    };
    assert_eq!(
      serde_json::to_value(&req).unwrap(),
      json!({
        "bookId": Uuid::nil(),
        "rating": 4,
        "readStatus": "currently-reading",
        "isPublic": true,
      })
    );
  }

  #[test]
  fn url_joins_the_api_prefix() {
    let client = ApiClient::new(ApiConfig { base_url: "http://localhost:3000/".into(), token: None })
      .unwrap();
    assert_eq!(client.url("/books/search"), "http://localhost:3000/api/books/search");
    assert!(client.require_token().is_err());
  }
}
