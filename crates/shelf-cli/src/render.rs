//! Plain-text rendering of API responses.

use std::fmt::Write as _;

use shelf_core::{
  book::{Book, BookDetail, SearchResults},
  review::ReviewView,
  user::{ProfilePage, PublicProfile},
};

/// `★★★☆☆` for a 1–5 rating.
pub fn stars(rating: u8) -> String {
  let filled = usize::from(rating.min(5));
  format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn book_line(book: &Book) -> String {
  let mut line = format!("{}  {} — {}", book.id, book.title, book.author);
  if book.ratings_count > 0 {
    let _ = write!(line, "  ({:.1}, {} ratings)", book.average_rating, book.ratings_count);
  }
  line
}

fn review_block(out: &mut String, view: &ReviewView) {
  let who = view
    .user
    .as_ref()
    .map(|u| u.username.as_str())
    .unwrap_or("[deleted]");
  let _ = writeln!(
    out,
    "  {} {}  {}  ({})",
    stars(view.review.rating),
    who,
    view.book.as_ref().map(|b| b.title.as_str()).unwrap_or(""),
    view.review.read_status,
  );
  if !view.review.review_text.is_empty() {
    let _ = writeln!(out, "    {}", view.review.review_text);
  }
}

pub fn search(results: &SearchResults) -> String {
  let mut out = String::new();
  if let Some(message) = &results.message {
    let _ = writeln!(out, "note: {message}");
  }

  let _ = writeln!(out, "On Shelf ({}):", results.total_local);
  for book in &results.local_books {
    let _ = writeln!(out, "  {}", book_line(book));
  }

  let _ = writeln!(out, "From the catalog ({}):", results.total_external);
  for book in &results.external_books {
    let year = book
      .published_date
      .map(|d| d.format(" (%Y)").to_string())
      .unwrap_or_default();
    let _ = writeln!(out, "  {} — {}{year}", book.title, book.author);
  }
  out
}

pub fn book(detail: &BookDetail) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}", book_line(&detail.book));
  if !detail.book.description.is_empty() {
    let _ = writeln!(out, "\n{}\n", detail.book.description);
  }
  for view in &detail.reviews {
    review_block(&mut out, view);
  }
  out
}

pub fn identity(profile: &PublicProfile) -> String {
  format!(
    "{} (@{})  id {}\nfollowers {}  following {}  goal {} books/year",
    profile.display_name,
    profile.username,
    profile.id,
    profile.followers.len(),
    profile.following.len(),
    profile.reading_goal,
  )
}

pub fn profile(page: &ProfilePage) -> String {
  let mut out = identity(&page.user);
  let s = page.stats;
  let _ = writeln!(
    out,
    "\nread {}  reading {}  want to read {}  total {}",
    s.read, s.currently_reading, s.want_to_read, s.total_books
  );
  if !page.user.bio.is_empty() {
    let _ = writeln!(out, "{}", page.user.bio);
  }
  for view in &page.recent_reviews {
    review_block(&mut out, view);
  }
  out
}
