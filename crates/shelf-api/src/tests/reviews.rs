use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use super::{Harness, code, error_fields};

#[tokio::test]
async fn second_review_of_a_book_updates_the_first() {
  let h = Harness::new().await;
  let (alice, _) = h.register("alice").await;
  let book = h.add_book(&alice, "1984", "George Orwell").await;

  let first = h.review(&alice, book, 3, "ok").await;
  let second = h.review(&alice, book, 5, "Better on reread.").await;
  assert_eq!(first["id"], second["id"]);
  assert_eq!(second["rating"], 5);
  assert_eq!(second["book"]["averageRating"], 5.0);

  let (_, detail) = h.get(&format!("/api/books/{book}"), None).await;
  assert_eq!(detail["book"]["ratingsCount"], 1);
}

#[tokio::test]
async fn average_rating_covers_every_reviewer() {
  let h = Harness::new().await;
  let (alice, _) = h.register("alice").await;
  let (bob, _) = h.register("bob").await;
  let book = h.add_book(&alice, "Dune", "Frank Herbert").await;

  h.review(&alice, book, 5, "").await;
  h.review(&bob, book, 4, "").await;

  let (_, detail) = h.get(&format!("/api/books/{book}"), None).await;
  assert_eq!(detail["book"]["averageRating"], 4.5);
  assert_eq!(detail["book"]["ratingsCount"], 2);
}

#[tokio::test]
async fn review_body_is_validated() {
  let h = Harness::new().await;
  let (alice, _) = h.register("alice").await;

  let (status, body) = h
    .post("/api/reviews", Some(&alice), json!({ "rating": 6, "readStatus": "skimmed" }))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(error_fields(&body), ["bookId", "rating", "readStatus"]);

  let (status, body) = h
    .post(
      "/api/reviews",
      Some(&alice),
      json!({ "bookId": Uuid::new_v4(), "rating": 4, "readStatus": "read" }),
    )
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn private_reviews_are_visible_to_their_author_only() {
  let h = Harness::new().await;
  let (alice, alice_id) = h.register("alice").await;
  let (bob, _) = h.register("bob").await;
  let book = h.add_book(&alice, "Dune", "Frank Herbert").await;

  let (status, _) = h
    .post(
      "/api/reviews",
      Some(&alice),
      json!({
        "bookId": book,
        "rating": 4,
        "readStatus": "currently-reading",
        "reviewText": "secret thoughts",
        "isPublic": false,
      }),
    )
    .await;
  assert_eq!(status, StatusCode::OK);

  let uri = format!("/api/reviews/user/{alice_id}");
  let (_, own) = h.get(&uri, Some(&alice)).await;
  assert_eq!(own["total"], 1);
  let (_, other) = h.get(&uri, Some(&bob)).await;
  assert_eq!(other["total"], 0);
  let (_, anon) = h.get(&uri, None).await;
  assert_eq!(anon["total"], 0);

  let (_, filtered) = h.get(&format!("{uri}?status=read"), Some(&alice)).await;
  assert_eq!(filtered["total"], 0);
  let (status, _) = h.get(&format!("{uri}?status=skimmed"), Some(&alice)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn book_reviews_skip_rating_only_entries() {
  let h = Harness::new().await;
  let (alice, _) = h.register("alice").await;
  let (bob, _) = h.register("bob").await;
  let book = h.add_book(&alice, "Dune", "Frank Herbert").await;
  h.review(&alice, book, 5, "Spice!").await;
  h.review(&bob, book, 3, "").await;

  let (status, body) = h.get(&format!("/api/reviews/book/{book}?limit=10"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 1);
  assert_eq!(body["page"], 1);
  assert_eq!(body["totalPages"], 1);
  assert_eq!(body["items"][0]["reviewText"], "Spice!");

  let (status, body) = h.get(&format!("/api/reviews/book/{book}?limit=51"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(error_fields(&body), ["limit"]);
}

#[tokio::test]
async fn likes_toggle() {
  let h = Harness::new().await;
  let (alice, _) = h.register("alice").await;
  let (bob, _) = h.register("bob").await;
  let book = h.add_book(&alice, "Dune", "Frank Herbert").await;
  let review = h.review(&alice, book, 5, "Spice!").await;
  let uri = format!("/api/reviews/{}/like", review["id"].as_str().unwrap());

  let (status, body) = h.post(&uri, Some(&bob), json!({})).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "liked": true, "likesCount": 1 }));

  let (_, body) = h.post(&uri, Some(&bob), json!({})).await;
  assert_eq!(body, json!({ "liked": false, "likesCount": 0 }));

  let (status, _) =
    h.post(&format!("/api/reviews/{}/like", Uuid::new_v4()), Some(&bob), json!({})).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_author_may_delete() {
  let h = Harness::new().await;
  let (alice, _) = h.register("alice").await;
  let (bob, _) = h.register("bob").await;
  let book = h.add_book(&alice, "Dune", "Frank Herbert").await;
  let review = h.review(&alice, book, 5, "Spice!").await;
  let uri = format!("/api/reviews/{}", review["id"].as_str().unwrap());

  let (status, body) = h.delete(&uri, Some(&bob)).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(code(&body), "FORBIDDEN");

  let (status, _) = h.delete(&uri, Some(&alice)).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, detail) = h.get(&format!("/api/books/{book}"), None).await;
  assert_eq!(detail["book"]["ratingsCount"], 0);

  let (status, _) = h.delete(&uri, Some(&alice)).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feed_shows_followed_users_public_reviews() {
  let h = Harness::new().await;
  let (alice, alice_id) = h.register("alice").await;
  let (bob, _) = h.register("bob").await;
  let (carol, _) = h.register("carol").await;
  let book = h.add_book(&alice, "Dune", "Frank Herbert").await;
  h.review(&alice, book, 5, "Spice!").await;
  h.review(&carol, book, 2, "Sand.").await;

  let (_, empty) = h.get("/api/reviews/feed/following", Some(&bob)).await;
  assert_eq!(empty["total"], 0);

  h.post(&format!("/api/users/{alice_id}/follow"), Some(&bob), json!({})).await;
  let (status, feed) = h.get("/api/reviews/feed/following", Some(&bob)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(feed["total"], 1);
  assert_eq!(feed["items"][0]["user"]["username"], "alice");

  let (status, _) = h.get("/api/reviews/feed/following", None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn oversized_page_is_rejected() {
  let h = Harness::new().await;
  let (alice, _) = h.register("alice").await;
  let book = h.add_book(&alice, "Dune", "Frank Herbert").await;

  let uri = format!("/api/reviews/book/{book}?page=9223372036854775808&limit=20");
  let (status, body) = h.get(&uri, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(error_fields(&body), ["page"]);
}
