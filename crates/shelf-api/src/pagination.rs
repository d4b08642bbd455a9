//! Page/limit query handling and the paginated response envelope.

use serde::{Deserialize, Serialize};
use shelf_core::store::Page;
use validator::Validate;

use crate::error::{ApiError, FieldError};

/// `{items, total, page, totalPages}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
  pub items:       Vec<T>,
  pub total:       u64,
  pub page:        u64,
  pub total_pages: u64,
}

/// `?page=&limit=` on its own. Endpoints with extra filters carry the two
/// fields themselves and call [`Window::resolve`].
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PageQuery {
  pub page:  Option<u64>,
  pub limit: Option<u64>,
}

impl PageQuery {
  pub fn window(&self, default_limit: u64, max_limit: u64) -> Result<Window, ApiError> {
    Window::resolve(self.page, self.limit, default_limit, max_limit)
  }
}

/// A validated, 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
  pub page:  u64,
  pub limit: u64,
}

/// Whether `(page - 1) * limit` fits the store's signed 64-bit offset.
fn offset_fits(page: u64, limit: u64) -> bool {
  (page - 1)
    .checked_mul(limit)
    .is_some_and(|offset| offset <= i64::MAX as u64)
}

impl Window {
  /// Resolve raw `page` / `limit` parameters, rejecting values outside
  /// `page >= 1` and `1 <= limit <= max_limit`.
  pub fn resolve(
    page: Option<u64>,
    limit: Option<u64>,
    default_limit: u64,
    max_limit: u64,
  ) -> Result<Self, ApiError> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(default_limit);

    let mut errors = vec![];
    if page < 1 {
      errors.push(FieldError::new("page", "page must be at least 1"));
    } else if !offset_fits(page, limit) {
      errors.push(FieldError::new("page", "page is out of range"));
    }
    if !(1..=max_limit).contains(&limit) {
      errors.push(FieldError::new("limit", format!("limit must be between 1 and {max_limit}")));
    }
    if !errors.is_empty() {
      return Err(ApiError::Validation(errors));
    }

    Ok(Self { page, limit })
  }

  pub fn limit(&self) -> usize { self.limit as usize }

  pub fn offset(&self) -> usize { ((self.page - 1) * self.limit) as usize }

  pub fn wrap<T>(self, page: Page<T>) -> Paginated<T> {
    Paginated {
      items:       page.items,
      total:       page.total,
      page:        self.page,
      total_pages: page.total.div_ceil(self.limit),
    }
  }
}
