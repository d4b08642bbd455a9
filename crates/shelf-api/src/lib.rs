//! JSON REST API for Shelf.
//!
//! Exposes an axum [`Router`] backed by any [`BookshelfStore`] and a
//! [`CatalogClient`]. TLS and process concerns are the caller's.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let router = shelf_api::app(state, &HttpOptions::default());
//! axum::serve(listener, router).await?;
//! ```

pub mod accounts;
pub mod admin;
pub mod auth;
pub mod books;
pub mod error;
pub mod health;
pub mod pagination;
pub mod password;
pub mod reviews;
pub mod token;
pub mod users;
pub mod validate;

use std::{sync::Arc, time::Instant};

use axum::{
  Json, Router,
  extract::State,
  http::HeaderValue,
  middleware,
  response::{IntoResponse, Response},
  routing::{delete, get, post, put},
};
use serde_json::json;
use shelf_catalog::CatalogClient;
use shelf_core::store::BookshelfStore;
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};

pub use error::ApiError;
use error::InternalDetail;
pub use token::TokenConfig;

/// Shared state handed to every handler.
pub struct AppState<S> {
  pub store:      Arc<S>,
  pub catalog:    Arc<CatalogClient>,
  pub tokens:     Arc<TokenConfig>,
  pub started_at: Instant,
}

impl<S> AppState<S> {
  pub fn new(store: S, catalog: CatalogClient, tokens: TokenConfig) -> Self {
    Self {
      store:      Arc::new(store),
      catalog:    Arc::new(catalog),
      tokens:     Arc::new(tokens),
      started_at: Instant::now(),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:      self.store.clone(),
      catalog:    self.catalog.clone(),
      tokens:     self.tokens.clone(),
      started_at: self.started_at,
    }
  }
}

/// Transport options applied around the API router.
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
  /// Allowed CORS origins; `*` allows any. Empty disables CORS handling.
  pub cors_origins:        Vec<String>,
  /// Include diagnostic text in 500 responses.
  pub expose_error_detail: bool,
}

/// Build the resource routes. Paths are relative to the `/api` prefix.
pub fn api_router<S: BookshelfStore>(state: AppState<S>) -> Router<()> {
  Router::new()
    // Accounts
    .route("/auth/register", post(accounts::register::<S>))
    .route("/auth/login", post(accounts::login::<S>))
    .route("/auth/me", get(accounts::me))
    .route("/auth/profile", put(accounts::update_profile::<S>))
    // Books
    .route("/books", post(books::create::<S>))
    .route("/books/search", get(books::search::<S>))
    .route("/books/trending", get(books::trending::<S>))
    .route("/books/recent", get(books::recent::<S>))
    .route("/books/{id}", get(books::get_one::<S>))
    // Reviews
    .route("/reviews", post(reviews::upsert::<S>))
    .route("/reviews/user/{id}", get(reviews::by_user::<S>))
    .route("/reviews/book/{id}", get(reviews::by_book::<S>))
    .route("/reviews/feed/following", get(reviews::feed::<S>))
    .route("/reviews/{id}", delete(reviews::delete::<S>))
    .route("/reviews/{id}/like", post(reviews::like::<S>))
    // Users
    .route("/users", get(users::search::<S>))
    .route("/users/{user}", get(users::profile::<S>))
    .route("/users/{user}/follow", post(users::follow::<S>))
    .route("/users/{user}/followers", get(users::followers::<S>))
    .route("/users/{user}/following", get(users::following::<S>))
    // Admin
    .route("/admin/stats", get(admin::stats::<S>))
    .route("/admin/users", get(admin::list::<S>))
    .route(
      "/admin/users/{id}",
      get(admin::get_one::<S>).put(admin::update::<S>).delete(admin::delete::<S>),
    )
    .route("/admin/users/{id}/reset-password", post(admin::reset_password::<S>))
    // Health
    .route("/health", get(health::handler::<S>))
    .with_state(state)
}

/// The complete application: `/api` routes plus tracing, optional CORS and
/// server-error detail handling.
pub fn app<S: BookshelfStore>(state: AppState<S>, options: &HttpOptions) -> Router {
  let mut router = Router::new()
    .nest("/api", api_router(state))
    .layer(middleware::map_response_with_state(
      options.expose_error_detail,
      attach_error_detail,
    ))
    .layer(TraceLayer::new_for_http());

  if !options.cors_origins.is_empty() {
    router = router.layer(cors_layer(&options.cors_origins));
  }
  router
}

fn cors_layer(origins: &[String]) -> CorsLayer {
  let allow_origin = if origins.iter().any(|o| o == "*") {
    AllowOrigin::any()
  } else {
    AllowOrigin::list(origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()))
  };
  CorsLayer::new()
    .allow_origin(allow_origin)
    .allow_methods(Any)
    .allow_headers(Any)
}

/// Rewrite server-error bodies to include their diagnostic text when
/// `expose` is set. The detail extension is always stripped.
async fn attach_error_detail(State(expose): State<bool>, mut response: Response) -> Response {
  let Some(InternalDetail(detail)) = response.extensions_mut().remove::<InternalDetail>() else {
    return response;
  };
  if !expose {
    return response;
  }
  let status = response.status();
  (
    status,
    Json(json!({ "error": "server error", "code": "INTERNAL_ERROR", "detail": detail })),
  )
    .into_response()
}

#[cfg(test)]
mod tests;
