//! Server configuration: `config.toml` layered with `SHELF_*` environment
//! variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context as _, bail};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use shelf_api::{HttpOptions, token::DEFAULT_TTL_DAYS};
use shelf_catalog::{CatalogConfig, DEFAULT_BASE_URL};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  /// HS256 signing secret. Required.
  pub jwt_secret:           String,
  pub token_ttl_days:       i64,
  pub catalog_base_url:     String,
  pub catalog_api_key:      Option<String>,
  pub catalog_timeout_secs: u64,
  pub expose_error_detail:  bool,
  /// `*` allows any origin; empty disables CORS handling.
  pub cors_origins:         Vec<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "127.0.0.1".to_string(),
      port:                 3000,
      store_path:           PathBuf::from("~/.local/share/shelf/shelf.db"),
      jwt_secret:           String::new(),
      token_ttl_days:       DEFAULT_TTL_DAYS,
      catalog_base_url:     DEFAULT_BASE_URL.to_string(),
      catalog_api_key:      None,
      catalog_timeout_secs: 10,
      expose_error_detail:  false,
      cors_origins:         Vec::new(),
    }
  }
}

impl ServerConfig {
  /// Read `path` if it exists, then apply `SHELF_*` overrides.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(Config::builder().add_source(File::from(path).required(false)))
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
    let settings = builder
      .add_source(
        Environment::with_prefix("SHELF")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("cors_origins"),
      )
      .build()
      .context("failed to read configuration")?;

    let cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;

    if cfg.jwt_secret.trim().is_empty() {
      bail!("jwt_secret must be set (config.toml or SHELF_JWT_SECRET)");
    }
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn catalog(&self) -> CatalogConfig {
    CatalogConfig {
      base_url: self.catalog_base_url.trim_end_matches('/').to_string(),
      api_key:  self.catalog_api_key.clone().filter(|k| !k.is_empty()),
      timeout:  Duration::from_secs(self.catalog_timeout_secs),
    }
  }

  pub fn http_options(&self) -> HttpOptions {
    HttpOptions {
      cors_origins:        self.cors_origins.clone(),
      expose_error_detail: self.expose_error_detail,
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  fn parse(toml: &str) -> anyhow::Result<ServerConfig> {
    ServerConfig::from_builder(
      Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
  }

  #[test]
  fn defaults_fill_missing_keys() {
    let cfg = parse(r#"jwt_secret = "s3cret""#).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:3000");
    assert_eq!(cfg.token_ttl_days, 7);
    assert_eq!(cfg.catalog().timeout, Duration::from_secs(10));
    assert_eq!(cfg.catalog().base_url, DEFAULT_BASE_URL);
    assert!(cfg.http_options().cors_origins.is_empty());
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = parse(
      r#"
        jwt_secret = "s3cret"
        port = 8080
        catalog_base_url = "http://localhost:9000/"
        catalog_api_key = ""
        cors_origins = ["http://localhost:5173"]
        expose_error_detail = true
      "#,
    )
    .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.catalog().base_url, "http://localhost:9000");
    assert_eq!(cfg.catalog().api_key, None);
    assert!(cfg.http_options().expose_error_detail);
    assert_eq!(cfg.cors_origins, ["http://localhost:5173"]);
  }

  #[test]
  fn missing_secret_is_an_error() {
    assert!(parse("port = 8080").is_err());
  }

  #[test]
  fn tilde_is_expanded() {
    let home = std::env::var("HOME").unwrap();
    let path = expand_tilde(Path::new("~/shelf.db"));
    assert_eq!(path, PathBuf::from(home).join("shelf.db"));
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
  }
}
