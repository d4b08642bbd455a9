//! Derived book rating arithmetic.

use serde::{Deserialize, Serialize};

/// The aggregate written back onto a book after any review change.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
  /// Mean rating rounded to one decimal; `0.0` when there are no ratings.
  pub average: f64,
  pub count:   u64,
}

impl RatingSummary {
  pub fn from_ratings<I>(ratings: I) -> Self
  where
    I: IntoIterator<Item = u8>,
  {
    let (sum, count) = ratings
      .into_iter()
      .fold((0u64, 0u64), |(sum, count), r| (sum + u64::from(r), count + 1));

    if count == 0 {
      return Self::default();
    }

    let mean = sum as f64 / count as f64;
    Self { average: (mean * 10.0).round() / 10.0, count }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn averages_and_counts() {
    let summary = RatingSummary::from_ratings([5, 3, 4]);
    assert_eq!(summary.average, 4.0);
    assert_eq!(summary.count, 3);
  }

  #[test]
  fn rounds_to_one_decimal() {
    assert_eq!(RatingSummary::from_ratings([1, 2, 2]).average, 1.7);
    assert_eq!(RatingSummary::from_ratings([4, 5]).average, 4.5);
    assert_eq!(RatingSummary::from_ratings([5, 4, 4]).average, 4.3);
  }

  #[test]
  fn empty_resets_to_zero() {
    let summary = RatingSummary::from_ratings(std::iter::empty());
    assert_eq!(summary, RatingSummary { average: 0.0, count: 0 });
  }
}
