//! Adapter for the external book catalog (Google Books `volumes` API).
//!
//! [`CatalogClient::search`] queries the catalog and normalizes each volume
//! into a [`NewBook`] that the store can import as-is.

mod wire;

pub mod error;

use std::time::Duration;

use shelf_core::book::NewBook;
use tracing::debug;

pub use error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";

/// The catalog rejects `maxResults` above this.
pub const MAX_RESULTS: u32 = 40;

/// Connection settings for the catalog.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
  pub base_url: String,
  pub api_key:  Option<String>,
  pub timeout:  Duration,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_owned(),
      api_key:  None,
      timeout:  Duration::from_secs(10),
    }
  }
}

/// One page of catalog results.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
  pub items:       Vec<NewBook>,
  /// Total matches reported by the catalog; falls back to `items.len()`.
  pub total_items: u64,
}

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct CatalogClient {
  client: reqwest::Client,
  config: CatalogConfig,
}

impl CatalogClient {
  pub fn new(config: CatalogConfig) -> Result<Self> {
    let client = reqwest::Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  /// `GET {base_url}/volumes?q=…&startIndex=…&maxResults=…`
  pub async fn search(
    &self,
    query: &str,
    start_index: u32,
    max_results: u32,
  ) -> Result<CatalogPage> {
    let url = format!("{}/volumes", self.config.base_url.trim_end_matches('/'));
    let max_results = max_results.clamp(1, MAX_RESULTS);

    let mut params = vec![
      ("q", query.to_owned()),
      ("startIndex", start_index.to_string()),
      ("maxResults", max_results.to_string()),
      ("fields", wire::FIELDS.to_owned()),
    ];
    if let Some(key) = &self.config.api_key {
      params.push(("key", key.clone()));
    }

    let resp = self.client.get(&url).query(&params).send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }

    let list: wire::VolumeList = resp.json().await?;
    debug!(query, returned = list.items.len(), "catalog search");

    let items: Vec<NewBook> = list.items.into_iter().map(wire::Volume::into_new_book).collect();
    Ok(CatalogPage {
      total_items: list.total_items.unwrap_or(items.len() as u64),
      items,
    })
  }
}

#[cfg(test)]
mod tests;
