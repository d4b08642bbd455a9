//! `CatalogClient` against a local stub of the volumes endpoint.

use std::{collections::HashMap, time::Duration};

use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
use serde_json::{Value, json};

use crate::{CatalogClient, CatalogConfig, Error};

/// Serve `router` on an ephemeral port and return its base URL.
async fn serve(router: Router) -> String {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, router).await.unwrap();
  });
  format!("http://{addr}")
}

fn client(base_url: String, timeout: Duration) -> CatalogClient {
  CatalogClient::new(CatalogConfig { base_url, api_key: Some("k".into()), timeout }).unwrap()
}

/// Echoes the received query parameters back inside a single volume.
async fn echo(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
  Json(json!({
    "totalItems": 321,
    "items": [{
      "id": "vol-1",
      "volumeInfo": {
        "title": params.get("q"),
        "authors": ["Frank Herbert"],
        "description": format!(
          "{}|{}|{}",
          params.get("startIndex").map(String::as_str).unwrap_or(""),
          params.get("maxResults").map(String::as_str).unwrap_or(""),
          params.get("key").map(String::as_str).unwrap_or(""),
        ),
      }
    }]
  }))
}

#[tokio::test]
async fn search_sends_parameters_and_normalizes() {
  let base = serve(Router::new().route("/volumes", get(echo))).await;
  let page = client(base, Duration::from_secs(5)).search("dune", 20, 500).await.unwrap();

  assert_eq!(page.total_items, 321);
  assert_eq!(page.items.len(), 1);
  let book = &page.items[0];
  assert_eq!(book.title, "dune");
  assert_eq!(book.external_id.as_deref(), Some("vol-1"));
  // maxResults is clamped to the catalog's ceiling.
  assert_eq!(book.description, "20|40|k");
}

#[tokio::test]
async fn empty_result_has_no_items() {
  let base = serve(Router::new().route("/volumes", get(|| async { Json(json!({})) }))).await;
  let page = client(base, Duration::from_secs(5)).search("zzz", 0, 10).await.unwrap();
  assert!(page.items.is_empty());
  assert_eq!(page.total_items, 0);
}

#[tokio::test]
async fn upstream_error_status_is_reported() {
  let base = serve(Router::new().route(
    "/volumes",
    get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
  ))
  .await;

  let err = client(base, Duration::from_secs(5)).search("dune", 0, 10).await.unwrap_err();
  assert!(matches!(err, Error::Status(s) if s == StatusCode::SERVICE_UNAVAILABLE));
}

#[tokio::test]
async fn slow_catalog_times_out() {
  let base = serve(Router::new().route(
    "/volumes",
    get(|| async {
      tokio::time::sleep(Duration::from_secs(5)).await;
      Json(json!({}))
    }),
  ))
  .await;

  let err = client(base, Duration::from_millis(100)).search("dune", 0, 10).await.unwrap_err();
  assert!(err.is_timeout());
}
