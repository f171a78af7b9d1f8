//! Score rows: one student's component scores for one subject.
//!
//! Totals are always recomputed from the components; a total supplied by a
//! client or left over in storage is never trusted.

use serde::{Deserialize, Deserializer, Serialize};
use strum::IntoEnumIterator as _;

use crate::{Error, Result};

// ─── Components ──────────────────────────────────────────────────────────────

/// The assessed parts of a subject score, in column order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ComponentKind {
  Ca1,
  Ca2,
  Exam,
}

impl ComponentKind {
  /// Highest score a teacher may enter for this component.
  pub fn max(self) -> f64 {
    match self {
      Self::Ca1 => 20.0,
      Self::Ca2 => 20.0,
      Self::Exam => 60.0,
    }
  }
}

/// Highest total a single subject can reach.
pub const SUBJECT_MAX: f64 = 100.0;

/// Continuous-assessment and exam scores for one subject.
///
/// Missing, `null` or non-numeric values deserialise as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
  #[serde(default, deserialize_with = "lenient_score")]
  pub ca1:  f64,
  #[serde(default, deserialize_with = "lenient_score")]
  pub ca2:  f64,
  #[serde(default, deserialize_with = "lenient_score")]
  pub exam: f64,
}

impl Components {
  pub fn new(ca1: f64, ca2: f64, exam: f64) -> Self { Self { ca1, ca2, exam } }

  pub fn get(&self, kind: ComponentKind) -> f64 {
    match kind {
      ComponentKind::Ca1 => self.ca1,
      ComponentKind::Ca2 => self.ca2,
      ComponentKind::Exam => self.exam,
    }
  }

  pub fn total(&self) -> f64 { self.ca1 + self.ca2 + self.exam }

  /// Reject negative or over-maximum components.
  pub fn validate(&self) -> Result<()> {
    for kind in ComponentKind::iter() {
      let value = self.get(kind);
      if !(0.0..=kind.max()).contains(&value) {
        return Err(Error::ScoreOutOfRange {
          component: kind,
          value,
          max: kind.max(),
        });
      }
    }
    Ok(())
  }
}

fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = serde_json::Value::deserialize(deserializer)?;
  let value = match raw {
    serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
    serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
    _ => 0.0,
  };
  Ok(if value.is_finite() { value } else { 0.0 })
}

// ─── Subjects ────────────────────────────────────────────────────────────────

/// Normalised key for matching subject names: trimmed and upper-cased.
///
/// Rows and catalog entries that differ only in case refer to the same
/// subject.
pub fn subject_key(subject: &str) -> String { subject.trim().to_uppercase() }

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A subject score as submitted by a teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectScore {
  pub subject:    String,
  #[serde(flatten)]
  pub components: Components,
}

impl SubjectScore {
  pub fn new(subject: impl Into<String>, components: Components) -> Self {
    Self { subject: subject.into(), components }
  }

  pub fn validate(&self) -> Result<()> {
    if self.subject.trim().is_empty() {
      return Err(Error::EmptySubject);
    }
    self.components.validate()
  }
}

/// A stored score row, keyed by `(class, serial_number, subject)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
  pub class:         String,
  /// Identifies one student within a class.
  pub serial_number: u32,
  pub student_name:  String,
  pub subject:       String,
  #[serde(flatten)]
  pub components:    Components,
  pub total:         f64,
}

impl ScoreEntry {
  pub fn new(
    class: impl Into<String>,
    serial_number: u32,
    student_name: impl Into<String>,
    score: SubjectScore,
  ) -> Self {
    Self {
      class: class.into(),
      serial_number,
      student_name: student_name.into(),
      subject: score.subject,
      total: score.components.total(),
      components: score.components,
    }
  }
}
