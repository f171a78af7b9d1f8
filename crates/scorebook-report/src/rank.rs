//! Rank Assigner: descending competition ranking.
//!
//! Tied values share a rank and the next distinct value skips the tied
//! count: `[70, 90, 90, 50]` ranks as `3rd, 1st, 1st, 4th`.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::PLACEHOLDER;

/// A rank within a population, or no rank at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
  Ranked(u32),
  /// The value was zero (no data) and takes no part in the ranking.
  Unranked,
}

impl Position {
  pub fn rank(self) -> Option<u32> {
    match self {
      Self::Ranked(n) => Some(n),
      Self::Unranked => None,
    }
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Ranked(n) => write!(f, "{n}{}", ordinal_suffix(*n)),
      Self::Unranked => f.write_str(PLACEHOLDER),
    }
  }
}

impl Serialize for Position {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// English ordinal suffix for `n` (`st`, `nd`, `rd`, `th`).
pub fn ordinal_suffix(n: u32) -> &'static str {
  if (11..=13).contains(&(n % 100)) {
    return "th";
  }
  match n % 10 {
    1 => "st",
    2 => "nd",
    3 => "rd",
    _ => "th",
  }
}

fn is_rankable(value: f64) -> bool { value > 0.0 }

/// Rank every value in `values`, preserving input order.
///
/// A value's rank is one more than the number of ranked values strictly
/// greater than it. Zero, negative and NaN values are excluded from the
/// population and come back as [`Position::Unranked`].
pub fn rank(values: &[f64]) -> Vec<Position> {
  let mut population: Vec<f64> =
    values.iter().copied().filter(|v| is_rankable(*v)).collect();
  population.sort_by(|a, b| b.total_cmp(a));

  values
    .iter()
    .map(|&value| {
      if is_rankable(value) {
        let greater = population.partition_point(|&other| other > value);
        Position::Ranked(greater as u32 + 1)
      } else {
        Position::Unranked
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn labels(values: &[f64]) -> Vec<String> {
    rank(values).iter().map(ToString::to_string).collect()
  }

  #[test]
  fn ties_share_rank_and_skip() {
    assert_eq!(labels(&[70.0, 90.0, 90.0, 50.0]), ["3rd", "1st", "1st", "4th"]);
  }

  #[test]
  fn zero_is_unranked_and_does_not_shift_others() {
    assert_eq!(labels(&[0.0, 40.0, 0.0, 60.0]), ["-", "2nd", "-", "1st"]);
  }

  #[test]
  fn all_zero_population() {
    assert_eq!(labels(&[0.0, 0.0]), ["-", "-"]);
    assert!(rank(&[]).is_empty());
  }

  #[test]
  fn ordinal_suffixes() {
    let cases = [
      (1, "1st"),
      (2, "2nd"),
      (3, "3rd"),
      (4, "4th"),
      (11, "11th"),
      (12, "12th"),
      (13, "13th"),
      (21, "21st"),
      (22, "22nd"),
      (23, "23rd"),
      (101, "101st"),
      (111, "111th"),
      (112, "112th"),
    ];
    for (n, expected) in cases {
      assert_eq!(Position::Ranked(n).to_string(), expected);
    }
  }

  #[test]
  fn positions_serialise_as_labels() {
    let json = serde_json::to_string(&rank(&[10.0, 0.0])).unwrap();
    assert_eq!(json, r#"["1st","-"]"#);
  }
}
