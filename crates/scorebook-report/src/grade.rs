//! Grade Classifier: maps a subject total to a grade band.

use serde::Serialize;

/// A grade band. Senior classes use the alphanumeric bands (`A1` … `F9`),
/// every other class the letter bands (`A` … `F`).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr,
)]
pub enum Grade {
  A1,
  B2,
  C4,
  C5,
  C6,
  D7,
  E8,
  F9,
  A,
  B,
  C,
  P,
  E,
  F,
}

/// Classify `total` for a senior or non-senior class.
///
/// | Senior | Non-senior |
/// |--------|------------|
/// | >= 85 A1 | >= 80 A |
/// | >= 80 B2 | >= 70 B |
/// | >= 60 C4 | >= 60 C |
/// | >= 53 C5 | >= 50 P |
/// | >= 50 C6 | >= 40 E |
/// | >= 45 D7 | else F |
/// | >= 40 E8 | |
/// | else F9 | |
///
/// Negative or NaN totals land in the lowest band.
pub fn classify(total: f64, is_senior: bool) -> Grade {
  if is_senior {
    match total {
      t if t >= 85.0 => Grade::A1,
      t if t >= 80.0 => Grade::B2,
      t if t >= 60.0 => Grade::C4,
      t if t >= 53.0 => Grade::C5,
      t if t >= 50.0 => Grade::C6,
      t if t >= 45.0 => Grade::D7,
      t if t >= 40.0 => Grade::E8,
      _ => Grade::F9,
    }
  } else {
    match total {
      t if t >= 80.0 => Grade::A,
      t if t >= 70.0 => Grade::B,
      t if t >= 60.0 => Grade::C,
      t if t >= 50.0 => Grade::P,
      t if t >= 40.0 => Grade::E,
      _ => Grade::F,
    }
  }
}
