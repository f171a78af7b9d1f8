//! The export pipeline: rows → aggregates → sheet → workbook bytes.

use scorebook_core::{catalog::ClassSubjects, score::ScoreEntry};

use crate::{
  Result,
  aggregate::aggregate,
  archive::write_archive,
  sheet::{build, sheet_file_name},
  xlsx::write_xlsx,
};

/// The `.xlsx` bytes for one class, or `None` if the class has no scores.
pub fn class_workbook(
  rows: &[ScoreEntry],
  catalog: &ClassSubjects,
) -> Result<Option<Vec<u8>>> {
  match build(&aggregate(rows, catalog), catalog) {
    Some(sheet) => Ok(Some(write_xlsx(&sheet)?)),
    None => Ok(None),
  }
}

/// A zip holding `<class>_scores.xlsx` for every class with data.
///
/// Classes without scores are skipped; returns `None` if none has data.
pub fn all_classes_archive(
  classes: &[(ClassSubjects, Vec<ScoreEntry>)],
) -> Result<Option<Vec<u8>>> {
  let mut entries = Vec::with_capacity(classes.len());
  for (catalog, rows) in classes {
    match class_workbook(rows, catalog)? {
      Some(bytes) => entries.push((sheet_file_name(&catalog.class), bytes)),
      None => tracing::debug!(class = %catalog.class, "no scores; skipping"),
    }
  }

  if entries.is_empty() {
    return Ok(None);
  }
  write_archive(&entries).map(Some)
}
