//! [`SqliteStore`]: the SQLite implementation of [`ScoreStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use scorebook_core::{
  audit::LogEntry,
  catalog::ClassSubjects,
  score::{ScoreEntry, SubjectScore, subject_key},
  store::ScoreStore,
};

use crate::{
  Error, Result,
  encode::{
    RawClassSubjects, RawLogEntry, RawScore, encode_dt, encode_subjects,
    encode_uuid,
  },
  schema::SCHEMA,
};

const UPSERT_SCORE: &str = "
  INSERT INTO scores (
    class, serial_number, student_name, subject, subject_key,
    ca1, ca2, exam, total, updated_at
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
  ON CONFLICT (class, serial_number, subject_key) DO UPDATE SET
    student_name = excluded.student_name,
    subject      = excluded.subject,
    ca1          = excluded.ca1,
    ca2          = excluded.ca2,
    exam         = excluded.exam,
    total        = excluded.total,
    updated_at   = excluded.updated_at";

const UPSERT_CLASS: &str = "
  INSERT INTO subjects (class, position, subjects_json, max_total)
  VALUES (?1, ?2, ?3, ?4)
  ON CONFLICT (class) DO UPDATE SET
    position      = excluded.position,
    subjects_json = excluded.subjects_json,
    max_total     = excluded.max_total";

/// Write every score for one student; returns the number of rows touched.
fn upsert_rows(
  conn: &rusqlite::Connection,
  class: &str,
  serial_number: u32,
  student_name: &str,
  scores: &[SubjectScore],
  updated_at: &str,
) -> rusqlite::Result<usize> {
  let mut stmt = conn.prepare_cached(UPSERT_SCORE)?;
  let mut written = 0;
  for score in scores {
    let c = score.components;
    written += stmt.execute(rusqlite::params![
      class,
      serial_number,
      student_name,
      score.subject.trim(),
      subject_key(&score.subject),
      c.ca1,
      c.ca2,
      c.exam,
      c.total(),
      updated_at,
    ])?;
  }
  Ok(written)
}

fn validate_scores(scores: &[SubjectScore]) -> Result<()> {
  for score in scores {
    score.validate()?;
  }
  Ok(())
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Scorebook store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ScoreStore impl ─────────────────────────────────────────────────────────

impl ScoreStore for SqliteStore {
  type Error = Error;

  // ── Scores ────────────────────────────────────────────────────────────────

  async fn insert_student(
    &self,
    class: &str,
    student_name: &str,
    scores: Vec<SubjectScore>,
  ) -> Result<u32> {
    let student_name = student_name.trim().to_owned();
    if student_name.is_empty() {
      return Err(scorebook_core::Error::EmptyName.into());
    }
    if scores.is_empty() {
      return Err(scorebook_core::Error::NoScores.into());
    }
    validate_scores(&scores)?;

    let class  = class.to_owned();
    let at_str = encode_dt(Utc::now());

    let serial = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let serial: u32 = tx.query_row(
          "SELECT COALESCE(MAX(serial_number), 0) + 1 FROM scores WHERE class = ?1",
          rusqlite::params![class],
          |r| r.get(0),
        )?;
        upsert_rows(&tx, &class, serial, &student_name, &scores, &at_str)?;
        tx.commit()?;
        Ok(serial)
      })
      .await?;

    Ok(serial)
  }

  async fn upsert_scores(
    &self,
    class: &str,
    serial_number: u32,
    rename: Option<String>,
    scores: Vec<SubjectScore>,
  ) -> Result<Option<usize>> {
    let rename = rename
      .map(|n| n.trim().to_owned())
      .filter(|n| !n.is_empty());
    validate_scores(&scores)?;

    let class  = class.to_owned();
    let at_str = encode_dt(Utc::now());

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing: Option<String> = tx
          .query_row(
            "SELECT student_name FROM scores
             WHERE class = ?1 AND serial_number = ?2
             ORDER BY rowid LIMIT 1",
            rusqlite::params![class, serial_number],
            |r| r.get(0),
          )
          .optional()?;

        let Some(existing) = existing else {
          return Ok(None);
        };

        let student_name = match rename {
          Some(name) => {
            tx.execute(
              "UPDATE scores SET student_name = ?3
               WHERE class = ?1 AND serial_number = ?2",
              rusqlite::params![class, serial_number, name],
            )?;
            name
          }
          None => existing,
        };

        let written =
          upsert_rows(&tx, &class, serial_number, &student_name, &scores, &at_str)?;
        tx.commit()?;
        Ok(Some(written))
      })
      .await?;

    Ok(written)
  }

  async fn list_scores(&self, class: &str, limit: usize) -> Result<Vec<ScoreEntry>> {
    let owned_class = class.to_owned();
    // One row past the cap tells a full class from an overfull one.
    let fetch = i64::try_from(limit).unwrap_or(i64::MAX).saturating_add(1);

    let raws: Vec<RawScore> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT class, serial_number, student_name, subject, ca1, ca2, exam
           FROM scores
           WHERE class = ?1
           ORDER BY serial_number, rowid
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owned_class, fetch], RawScore::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if raws.len() > limit {
      tracing::warn!(class, limit, "score rows exceed the row limit");
      return Err(Error::RowLimitExceeded { class: class.to_owned(), limit });
    }

    Ok(raws.into_iter().map(RawScore::into_entry).collect())
  }

  async fn delete_students(&self, class: &str, serial_numbers: &[u32]) -> Result<usize> {
    let class   = class.to_owned();
    let serials = serial_numbers.to_vec();

    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut removed = 0;
        {
          let mut stmt = tx.prepare(
            "DELETE FROM scores WHERE class = ?1 AND serial_number = ?2",
          )?;
          for serial in &serials {
            removed += stmt.execute(rusqlite::params![class, serial])?;
          }
        }
        tx.commit()?;
        Ok(removed)
      })
      .await?;

    Ok(removed)
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn get_subjects(&self, class: &str) -> Result<Option<ClassSubjects>> {
    let class = class.to_owned();

    let raw: Option<RawClassSubjects> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT class, subjects_json, max_total FROM subjects WHERE class = ?1",
            rusqlite::params![class],
            |row| {
              Ok(RawClassSubjects {
                class:         row.get(0)?,
                subjects_json: row.get(1)?,
                max_total:     row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawClassSubjects::into_class_subjects).transpose()
  }

  async fn put_subjects(&self, entry: ClassSubjects) -> Result<()> {
    let subjects_json = encode_subjects(&entry.subjects)?;

    self
      .conn
      .call(move |conn| {
        // Existing classes keep their position; new ones go last.
        let position: i64 = conn.query_row(
          "SELECT COALESCE(
             (SELECT position FROM subjects WHERE class = ?1),
             (SELECT COALESCE(MAX(position), -1) + 1 FROM subjects)
           )",
          rusqlite::params![entry.class],
          |r| r.get(0),
        )?;
        conn.execute(
          UPSERT_CLASS,
          rusqlite::params![entry.class, position, subjects_json, entry.max_total],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_classes(&self) -> Result<Vec<String>> {
    let classes = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT class FROM subjects ORDER BY position, class")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(classes)
  }

  async fn seed_catalog(&self, catalog: Vec<ClassSubjects>) -> Result<()> {
    let encoded: Vec<(ClassSubjects, String)> = catalog
      .into_iter()
      .map(|entry| {
        let json = encode_subjects(&entry.subjects)?;
        Ok((entry, json))
      })
      .collect::<Result<_>>()?;
    let count = encoded.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(UPSERT_CLASS)?;
          for (position, (entry, json)) in encoded.iter().enumerate() {
            stmt.execute(rusqlite::params![
              entry.class,
              position as i64,
              json,
              entry.max_total,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(classes = count, "subject catalog seeded");
    Ok(())
  }

  // ── Audit log ─────────────────────────────────────────────────────────────

  async fn append_log(&self, action: String) -> Result<LogEntry> {
    let entry = LogEntry {
      log_id:    Uuid::new_v4(),
      timestamp: Utc::now(),
      action,
    };

    let id_str = encode_uuid(entry.log_id);
    let at_str = encode_dt(entry.timestamp);
    let action = entry.action.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO logs (log_id, timestamp, action) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, at_str, action],
        )?;
        Ok(())
      })
      .await?;

    Ok(entry)
  }

  async fn recent_logs(&self, limit: usize) -> Result<Vec<LogEntry>> {
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawLogEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT log_id, timestamp, action FROM logs
           ORDER BY timestamp DESC, rowid DESC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], |row| {
            Ok(RawLogEntry {
              log_id:    row.get(0)?,
              timestamp: row.get(1)?,
              action:    row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLogEntry::into_log_entry).collect()
  }
}
