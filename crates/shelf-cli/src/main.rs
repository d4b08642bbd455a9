//! `shelf`: command-line client for a Shelf server.
//!
//! # Usage
//!
//! ```
//! shelf --url http://localhost:3000 login alice
//! shelf search "the left hand of darkness"
//! shelf review <book-id> --rating 5 --status read --text "Loved it"
//! ```

mod client;
mod render;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, ReviewRequest};
use serde::Deserialize;
use session::TokenFile;
use shelf_core::{book::SearchResults, review::ReadStatus};
use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "shelf", about = "Command-line client for Shelf")]
struct Args {
  /// Path to a TOML config file (url, token_file).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the Shelf server (default: http://localhost:3000).
  #[arg(long, env = "SHELF_URL")]
  url: Option<String>,

  /// Where the login token is kept (default: ~/.config/shelf/token).
  #[arg(long, env = "SHELF_TOKEN_FILE", value_name = "FILE")]
  token_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create an account and log in.
  Register {
    username:     String,
    email:        String,
    #[arg(long)]
    display_name: Option<String>,
    /// Read from stdin when omitted.
    #[arg(long, env = "SHELF_PASSWORD", hide_env_values = true)]
    password:     Option<String>,
  },
  /// Log in with a username or email and save the token.
  Login {
    login:    String,
    #[arg(long, env = "SHELF_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },
  /// Forget the saved token.
  Logout,
  /// Show the logged-in account.
  Whoami,
  /// Search Shelf and the external catalog.
  Search { query: String },
  /// Show a book and its latest reviews.
  Book { id: Uuid },
  /// Rate and review a book; replaces your earlier review of it.
  Review {
    book_id: Uuid,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    rating:  u8,
    /// read, currently-reading or want-to-read.
    #[arg(long)]
    status:  ReadStatus,
    #[arg(long)]
    text:    Option<String>,
    #[arg(long)]
    private: bool,
  },
  /// Show a user's profile page.
  Profile { username: String },
  /// Follow a user, or unfollow if already following.
  Follow { user_id: Uuid },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:        String,
  #[serde(default)]
  token_file: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:3000".to_string());
  let token_file = TokenFile::new(
    args
      .token_file
      .or(file_cfg.token_file)
      .unwrap_or_else(session::default_path),
  );

  let client = ApiClient::new(ApiConfig { base_url, token: token_file.load()? })?;
  run(args.command, &client, &token_file).await
}

async fn run(command: Command, client: &ApiClient, token_file: &TokenFile) -> Result<()> {
  match command {
    Command::Register { username, email, display_name, password } => {
      let password = password_or_prompt(password)?;
      let display_name = display_name.unwrap_or_else(|| username.clone());
      let session = client.register(&username, &email, &password, &display_name).await?;
      token_file.save(&session.token)?;
      println!("Welcome, {}! Logged in as @{}.", session.user.display_name, session.user.username);
    }
    Command::Login { login, password } => {
      let password = password_or_prompt(password)?;
      let session = client.login(&login, &password).await?;
      token_file.save(&session.token)?;
      println!("Logged in as @{}.", session.user.username);
    }
    Command::Logout => {
      if token_file.clear()? {
        println!("Logged out.");
      } else {
        println!("Not logged in.");
      }
    }
    Command::Whoami => println!("{}", render::identity(&client.me().await?)),
    Command::Search { query } => {
      let results = match client.search(&query).await {
        Ok(results) => results,
        Err(e) => {
          warn!(error = %e, "search failed");
          SearchResults {
            message: Some("Search is temporarily unavailable".to_string()),
            ..Default::default()
          }
        }
      };
      print!("{}", render::search(&results));
    }
    Command::Book { id } => print!("{}", render::book(&client.book(id).await?)),
    Command::Review { book_id, rating, status, text, private } => {
      let view = client
        .review(&ReviewRequest {
          book_id,
          rating,
          read_status: status,
          review_text: text,
          is_public: !private,
        })
        .await?;
      let title = view.book.as_ref().map(|b| b.title.as_str()).unwrap_or("book");
      println!("Saved {} for {title}.", render::stars(view.review.rating));
    }
    Command::Profile { username } => print!("{}", render::profile(&client.profile(&username).await?)),
    Command::Follow { user_id } => {
      let outcome = client.follow(user_id).await?;
      let verb = if outcome.following { "Following" } else { "Unfollowed" };
      println!("{verb} ({} followers).", outcome.followers_count);
    }
  }
  Ok(())
}

/// Use `given`, or read a password line from stdin.
fn password_or_prompt(given: Option<String>) -> Result<String> {
  use std::io::{self, BufRead, Write};
  if let Some(password) = given {
    return Ok(password);
  }
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']).to_string();
  if password.is_empty() {
    bail!("a password is required");
  }
  Ok(password)
}
