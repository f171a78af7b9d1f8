//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with microsecond precision, UUIDs
//! hyphenated lowercase strings and subject lists compact JSON arrays.

use chrono::{DateTime, SecondsFormat, Utc};
use scorebook_core::{
  audit::LogEntry,
  catalog::ClassSubjects,
  score::{Components, ScoreEntry},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// Fixed-width so that lexical order in SQL matches chronological order.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Subject lists ────────────────────────────────────────────────────────────

pub fn encode_subjects(subjects: &[String]) -> Result<String> {
  Ok(serde_json::to_string(subjects)?)
}

pub fn decode_subjects(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Raw row types ────────────────────────────────────────────────────────────

/// A `scores` row as read from SQLite, before the total is recomputed.
pub struct RawScore {
  pub class:         String,
  pub serial_number: u32,
  pub student_name:  String,
  pub subject:       String,
  pub ca1:           f64,
  pub ca2:           f64,
  pub exam:          f64,
}

impl RawScore {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      class:         row.get(0)?,
      serial_number: row.get(1)?,
      student_name:  row.get(2)?,
      subject:       row.get(3)?,
      ca1:           row.get(4)?,
      ca2:           row.get(5)?,
      exam:          row.get(6)?,
    })
  }

  pub fn into_entry(self) -> ScoreEntry {
    let components = Components::new(self.ca1, self.ca2, self.exam);
    ScoreEntry {
      class: self.class,
      serial_number: self.serial_number,
      student_name: self.student_name,
      subject: self.subject,
      total: components.total(),
      components,
    }
  }
}

pub struct RawClassSubjects {
  pub class:         String,
  pub subjects_json: String,
  pub max_total:     Option<f64>,
}

impl RawClassSubjects {
  pub fn into_class_subjects(self) -> Result<ClassSubjects> {
    Ok(ClassSubjects {
      class:     self.class,
      subjects:  decode_subjects(&self.subjects_json)?,
      max_total: self.max_total,
    })
  }
}

pub struct RawLogEntry {
  pub log_id:    String,
  pub timestamp: String,
  pub action:    String,
}

impl RawLogEntry {
  pub fn into_log_entry(self) -> Result<LogEntry> {
    Ok(LogEntry {
      log_id:    decode_uuid(&self.log_id)?,
      timestamp: decode_dt(&self.timestamp)?,
      action:    self.action,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn subjects_round_trip() {
    let subjects = vec!["english language".to_owned(), "intro. technology".to_owned()];
    let encoded = encode_subjects(&subjects).unwrap();
    assert_eq!(decode_subjects(&encoded).unwrap(), subjects);
  }

  #[test]
  fn bad_timestamp_is_a_date_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }

  #[test]
  fn raw_score_recomputes_total() {
    let raw = RawScore {
      class:         "jss1".into(),
      serial_number: 4,
      student_name:  "Ada".into(),
      subject:       "english".into(),
      ca1:           10.0,
      ca2:           5.5,
      exam:          30.0,
    };
    assert_eq!(raw.into_entry().total, 45.5);
  }
}
