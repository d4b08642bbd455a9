use axum::http::StatusCode;
use serde_json::json;

use super::{Harness, code, error_fields};

#[tokio::test]
async fn register_then_login_by_username_and_email() {
  let h = Harness::new().await;
  let (status, body) = h
    .post(
      "/api/auth/register",
      None,
      json!({
        "username": "alice",
        "email": "Alice@Example.com",
        "password": "secret1",
        "displayName": "Alice",
      }),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
  assert_eq!(body["user"]["username"], "alice");
  assert!(body["user"].get("passwordHash").is_none());
  assert!(body["user"].get("email").is_none());

  let (status, body) =
    h.post("/api/auth/login", None, json!({ "login": "alice", "password": "secret1" })).await;
  assert_eq!(status, StatusCode::OK, "{body}");

  let (status, _) = h
    .post("/api/auth/login", None, json!({ "email": "ALICE@example.com", "password": "secret1" }))
    .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() {
  let h = Harness::new().await;
  h.register("alice").await;

  let (s1, b1) =
    h.post("/api/auth/login", None, json!({ "login": "alice", "password": "wrong!" })).await;
  let (s2, b2) =
    h.post("/api/auth/login", None, json!({ "login": "nobody", "password": "secret1" })).await;

  assert_eq!(s1, StatusCode::BAD_REQUEST);
  assert_eq!(s2, StatusCode::BAD_REQUEST);
  assert_eq!(b1, b2);
  assert_eq!(code(&b1), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn register_rejects_bad_fields() {
  let h = Harness::new().await;
  let (status, body) = h
    .post(
      "/api/auth/register",
      None,
      json!({
        "username": "a b",
        "email": "not-an-email",
        "password": "123",
        "displayName": "",
      }),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(code(&body), "VALIDATION_ERROR");
  assert_eq!(error_fields(&body), ["displayName", "email", "password", "username"]);
}

#[tokio::test]
async fn duplicate_username_or_email_conflicts() {
  let h = Harness::new().await;
  h.register("alice").await;

  let (status, body) = h
    .post(
      "/api/auth/register",
      None,
      json!({
        "username": "alice",
        "email": "other@example.com",
        "password": "secret1",
        "displayName": "Other",
      }),
    )
    .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["field"], "username");

  let (status, body) = h
    .post(
      "/api/auth/register",
      None,
      json!({
        "username": "alice2",
        "email": "ALICE@example.com",
        "password": "secret1",
        "displayName": "Other",
      }),
    )
    .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["field"], "email");
}

#[tokio::test]
async fn me_requires_a_valid_token() {
  let h = Harness::new().await;
  let (token, id) = h.register("alice").await;

  let (status, body) = h.get("/api/auth/me", Some(&token)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["id"], id.to_string());

  let (status, body) = h.get("/api/auth/me", None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(code(&body), "UNAUTHENTICATED");

  let (status, _) = h.get("/api/auth/me", Some("garbage")).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_ignores_privileged_fields() {
  let h = Harness::new().await;
  let (token, _) = h.register("alice").await;

  let (status, body) = h
    .put(
      "/api/auth/profile",
      Some(&token),
      json!({
        "displayName": "Alice L.",
        "bio": "reads a lot",
        "readingGoal": 40,
        "favoriteGenres": [" Fantasy ", ""],
        "isAdmin": true,
      }),
    )
    .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["displayName"], "Alice L.");
  assert_eq!(body["readingGoal"], 40);
  assert_eq!(body["favoriteGenres"], json!(["Fantasy"]));

  let (status, _) = h.get("/api/admin/stats", Some(&token)).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn profile_update_validates_ranges() {
  let h = Harness::new().await;
  let (token, _) = h.register("alice").await;

  let (status, body) = h
    .put(
      "/api/auth/profile",
      Some(&token),
      json!({ "readingGoal": 0, "bio": "x".repeat(501) }),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(error_fields(&body), ["bio", "readingGoal"]);
}

#[tokio::test]
async fn blank_display_name_is_rejected() {
  let h = Harness::new().await;
  let (status, body) = h
    .post(
      "/api/auth/register",
      None,
      json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": "secret1",
        "displayName": "   ",
      }),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(error_fields(&body), ["displayName"]);

  let (token, _) = h.register("bob").await;
  let (status, body) = h
    .put("/api/auth/profile", Some(&token), json!({ "displayName": "  " }))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(error_fields(&body), ["displayName"]);

  let (_, me) = h.get("/api/auth/me", Some(&token)).await;
  assert_ne!(me["displayName"], "");
}
