//! ETag computation for class workbook downloads.
//!
//! ETags are SHA-256 hashes over the class's subject list and its score rows,
//! sorted by `(serial_number, subject)`. Any edit that would change the
//! exported workbook changes the tag; row order in storage does not.

use axum::http::{HeaderMap, header};
use scorebook_core::{
  catalog::ClassSubjects,
  score::{ScoreEntry, subject_key},
};
use sha2::{Digest, Sha256};

/// Compute an ETag for the workbook built from `catalog` and `rows`.
pub fn compute_etag(catalog: &ClassSubjects, rows: &[ScoreEntry]) -> String {
  let mut sorted: Vec<&ScoreEntry> = rows.iter().collect();
  sorted.sort_by_cached_key(|r| (r.serial_number, subject_key(&r.subject)));

  let mut hasher = Sha256::new();
  hasher.update(catalog.class.as_bytes());
  for subject in &catalog.subjects {
    hasher.update([0u8]);
    hasher.update(subject.as_bytes());
  }
  if let Some(max) = catalog.max_total {
    hasher.update(max.to_le_bytes());
  }

  for row in sorted {
    hasher.update([1u8]);
    hasher.update(row.serial_number.to_le_bytes());
    hasher.update(row.student_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(row.subject.as_bytes());
    hasher.update([0u8]);
    for value in [row.components.ca1, row.components.ca2, row.components.exam] {
      hasher.update(value.to_le_bytes());
    }
  }

  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Whether an `If-None-Match` header in `headers` already names `etag`.
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  headers
    .get_all(header::IF_NONE_MATCH)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(','))
    .map(str::trim)
    .any(|candidate| {
      candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;
  use scorebook_core::score::{Components, SubjectScore};

  use super::*;

  fn row(serial: u32, subject: &str, exam: f64) -> ScoreEntry {
    ScoreEntry::new(
      "jss1",
      serial,
      "Ada",
      SubjectScore::new(subject, Components::new(10.0, 10.0, exam)),
    )
  }

  fn jss1() -> ClassSubjects { ClassSubjects::new("jss1", &["english", "mathematics"]) }

  #[test]
  fn row_order_does_not_matter() {
    let a = row(1, "english", 40.0);
    let b = row(2, "mathematics", 30.0);
    assert_eq!(
      compute_etag(&jss1(), &[a.clone(), b.clone()]),
      compute_etag(&jss1(), &[b, a])
    );
  }

  #[test]
  fn editing_a_score_changes_etag() {
    let before = compute_etag(&jss1(), &[row(1, "english", 40.0)]);
    let after = compute_etag(&jss1(), &[row(1, "english", 41.0)]);
    assert_ne!(before, after);
  }

  #[test]
  fn changing_subjects_changes_etag() {
    let rows = [row(1, "english", 40.0)];
    let other = ClassSubjects::new("jss1", &["english"]);
    assert_ne!(compute_etag(&jss1(), &rows), compute_etag(&other, &rows));
  }

  #[test]
  fn etag_is_quoted_hex() {
    let etag = compute_etag(&jss1(), &[]);
    assert!(etag.starts_with('"') && etag.ends_with('"'));
    assert_eq!(etag.len(), 64 + 2);
  }

  #[test]
  fn if_none_match_lists_and_wildcards() {
    let etag = compute_etag(&jss1(), &[]);
    let mut headers = HeaderMap::new();
    assert!(!if_none_match(&headers, &etag));

    headers.insert(
      header::IF_NONE_MATCH,
      HeaderValue::from_str(&format!("\"stale\", W/{etag}")).unwrap(),
    );
    assert!(if_none_match(&headers, &etag));

    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
    assert!(if_none_match(&headers, &etag));
  }
}
