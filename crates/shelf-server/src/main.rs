//! shelf-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `SHELF_*`
//! environment variables, opens the SQLite store and serves the JSON API
//! under `/api`.
//!
//! ```
//! shelf-server                          # serve
//! echo 'pw' | shelf-server hash-password
//! echo 'pw' | shelf-server create-admin --username root \
//!   --email root@example.com --display-name Root
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use settings::ServerConfig;
use shelf_api::{AppState, TokenConfig, accounts::RegisterBody, password};
use shelf_catalog::CatalogClient;
use shelf_core::{
  store::BookshelfStore,
  user::{NewUser, UserPatch},
};
use shelf_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;
use validator::Validate;

#[derive(Parser)]
#[command(author, version, about = "Shelf book-tracking server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the API (the default).
  Serve,
  /// Print the argon2 hash for a password read from stdin and exit.
  HashPassword,
  /// Create an administrator, or promote the account with this email.
  /// The password is read from stdin.
  CreateAdmin {
    #[arg(long)]
    username:     String,
    #[arg(long)]
    email:        String,
    #[arg(long)]
    display_name: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command.unwrap_or(Command::Serve) {
    Command::HashPassword => {
      let password = read_password()?;
      let hash = password::hash_password(&password)
        .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
      println!("{hash}");
      Ok(())
    }
    Command::CreateAdmin { username, email, display_name } => {
      let cfg = ServerConfig::load(&cli.config)?;
      let store = open_store(&cfg).await?;
      create_admin(&store, username, email, display_name).await
    }
    Command::Serve => {
      let cfg = ServerConfig::load(&cli.config)?;
      serve(cfg).await
    }
  }
}

async fn open_store(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let store_path = cfg.store_path();
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let store = open_store(&cfg).await?;
  let catalog = CatalogClient::new(cfg.catalog()).context("failed to build catalog client")?;
  let tokens = TokenConfig::new(cfg.jwt_secret.clone(), cfg.token_ttl_days);

  let state = AppState::new(store, catalog, tokens);
  let app = shelf_api::app(state, &cfg.http_options());
  let address = cfg.address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!("shutting down");
    })
    .await
    .context("server error")
}

async fn create_admin(
  store: &SqliteStore,
  username: String,
  email: String,
  display_name: String,
) -> anyhow::Result<()> {
  if let Some(existing) = store.find_user_by_login(email.clone()).await? {
    store
      .update_user(existing.user_id, UserPatch { is_admin: Some(true), ..Default::default() })
      .await?;
    info!(user_id = %existing.user_id, username = %existing.username, "promoted to admin");
    return Ok(());
  }

  let account = RegisterBody {
    username,
    email: email.trim().to_owned(),
    password: read_password()?,
    display_name: display_name.trim().to_owned(),
  };
  check_account(&account)?;
  let password_hash = password::hash_password(&account.password)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;

  let user = store
    .create_user(NewUser {
      username: account.username,
      email: account.email,
      password_hash,
      display_name: account.display_name,
      is_admin: true,
    })
    .await
    .context("failed to create admin")?;
  info!(user_id = %user.user_id, username = %user.username, "admin created");
  Ok(())
}

/// Apply the registration rules to an account created from the command line.
fn check_account(account: &RegisterBody) -> anyhow::Result<()> {
  account.validate().map_err(|e| anyhow::anyhow!("invalid account: {e}"))
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
