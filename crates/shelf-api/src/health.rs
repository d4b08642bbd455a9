//! `GET /health`

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shelf_core::store::BookshelfStore;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
  pub status:      &'static str,
  pub timestamp:   DateTime<Utc>,
  pub database:    &'static str,
  pub uptime_secs: u64,
  pub version:     &'static str,
}

/// 200 when the store answers, 503 otherwise.
pub async fn handler<S: BookshelfStore>(
  State(state): State<AppState<S>>,
) -> (StatusCode, Json<Health>) {
  let db_ok = match state.store.ping().await {
    Ok(()) => true,
    Err(e) => {
      warn!(error = %e, "health check: store unreachable");
      false
    }
  };

  let health = Health {
    status:      if db_ok { "ok" } else { "degraded" },
    timestamp:   Utc::now(),
    database:    if db_ok { "connected" } else { "disconnected" },
    uptime_secs: state.started_at.elapsed().as_secs(),
    version:     env!("CARGO_PKG_VERSION"),
  };
  let status = if db_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
  (status, Json(health))
}
