//! The `ScoreStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `scorebook-store-sqlite`). The HTTP layer depends on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  audit::LogEntry,
  catalog::ClassSubjects,
  score::{ScoreEntry, SubjectScore},
};

/// Abstraction over a Scorebook storage backend.
///
/// Score rows are keyed by `(class, serial_number, subject)`; subjects are
/// compared case-insensitively. The audit log is append-only.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ScoreStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Scores ────────────────────────────────────────────────────────────

  /// Record a new student in `class` and return the serial number assigned
  /// to them (one more than the highest serial already in the class).
  ///
  /// Fails with [`Error::NoScores`](crate::Error::NoScores) when `scores` is
  /// empty; a student with no rows would not hold on to its serial.
  fn insert_student<'a>(
    &'a self,
    class: &'a str,
    student_name: &'a str,
    scores: Vec<SubjectScore>,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + 'a;

  /// Insert or replace the given subject scores for an existing student.
  ///
  /// If `rename` is set, every row of the student takes the new name.
  /// Returns the number of subject rows written, or `None` if no student
  /// with `serial_number` exists in `class`.
  fn upsert_scores<'a>(
    &'a self,
    class: &'a str,
    serial_number: u32,
    rename: Option<String>,
    scores: Vec<SubjectScore>,
  ) -> impl Future<Output = Result<Option<usize>, Self::Error>> + Send + 'a;

  /// All rows for `class`, ordered by serial number.
  ///
  /// Fails rather than truncating when the class holds more than `limit`
  /// rows, so a report never sees half of a student.
  fn list_scores<'a>(
    &'a self,
    class: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ScoreEntry>, Self::Error>> + Send + 'a;

  /// Delete every row belonging to the given students; returns rows removed.
  fn delete_students<'a>(
    &'a self,
    class: &'a str,
    serial_numbers: &'a [u32],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  // ── Catalog ───────────────────────────────────────────────────────────

  /// The subjects for `class`, or `None` if the class is not in the catalog.
  fn get_subjects<'a>(
    &'a self,
    class: &'a str,
  ) -> impl Future<Output = Result<Option<ClassSubjects>, Self::Error>> + Send + 'a;

  /// Insert or replace one catalog entry.
  fn put_subjects(
    &self,
    entry: ClassSubjects,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Class keys in catalog order.
  fn list_classes(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Upsert every entry of `catalog`, preserving its order.
  fn seed_catalog(
    &self,
    catalog: Vec<ClassSubjects>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Audit log ─────────────────────────────────────────────────────────

  /// Append an entry; the timestamp is set by the store.
  fn append_log(
    &self,
    action: String,
  ) -> impl Future<Output = Result<LogEntry, Self::Error>> + Send + '_;

  /// The most recent `limit` entries, newest first.
  fn recent_logs(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<LogEntry>, Self::Error>> + Send + '_;
}
