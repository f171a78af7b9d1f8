//! Report Builder: flattens aggregates into a header row plus one row per
//! student.
//!
//! This is the only place where the typed per-subject results become
//! dynamically named columns.

use scorebook_core::{
  catalog::ClassSubjects,
  score::{ComponentKind, subject_key},
};
use strum::IntoEnumIterator as _;

use crate::{PLACEHOLDER, aggregate::StudentAggregate};

/// Worksheet name used for every class export.
pub const SHEET_NAME: &str = "Scores";

/// File name of the bundle produced by a full export.
pub const ARCHIVE_FILE_NAME: &str = "all_scores.zip";

const COLUMN_WIDTH: f64 = 15.0;

/// Per-class workbook file name, e.g. `jss1_scores.xlsx`.
pub fn sheet_file_name(class: &str) -> String { format!("{class}_scores.xlsx") }

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
  Number(f64),
  Text(String),
}

impl Cell {
  fn placeholder() -> Self { Self::Text(PLACEHOLDER.to_owned()) }
}

impl From<&str> for Cell {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Cell {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<f64> for Cell {
  fn from(n: f64) -> Self { Self::Number(n) }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
  pub header: String,
  pub width:  f64,
}

/// A single worksheet: the header row is rendered bold by the serializer.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
  pub name:    String,
  pub columns: Vec<Column>,
  pub rows:    Vec<Vec<Cell>>,
}

impl Sheet {
  pub fn headers(&self) -> impl Iterator<Item = &str> {
    self.columns.iter().map(|c| c.header.as_str())
  }

  /// Index of the column with this exact header.
  pub fn column_index(&self, header: &str) -> Option<usize> {
    self.columns.iter().position(|c| c.header == header)
  }
}

/// Column headers for a class offering `subjects`, in export order.
pub fn headers(subjects: &[String]) -> Vec<String> {
  let mut headers = vec!["S/N".to_owned(), "NAMES".to_owned()];
  for subject in subjects {
    let key = subject_key(subject);
    for kind in ComponentKind::iter() {
      headers.push(format!("{key} {kind}"));
    }
    for suffix in ["TOTAL", "POSITION", "GRADE", "CLASS AVERAGE"] {
      headers.push(format!("{key} {suffix}"));
    }
  }
  headers.extend(
    ["GRAND TOTAL", "GRAND AVERAGE", "POSITION (IN CLASS)"].map(str::to_owned),
  );
  headers
}

fn student_row(student: &StudentAggregate) -> Vec<Cell> {
  let mut row = vec![
    Cell::Number(f64::from(student.serial_number)),
    Cell::from(student.student_name.as_str()),
  ];

  for result in &student.subjects {
    if result.offered {
      for kind in ComponentKind::iter() {
        row.push(Cell::Number(result.components.get(kind)));
      }
      row.push(Cell::Number(result.total));
      row.push(Cell::from(result.position.to_string()));
      row.push(
        result
          .grade
          .map_or_else(Cell::placeholder, |g| Cell::from(g.to_string())),
      );
      row.push(Cell::from(result.class_average.to_string()));
    } else {
      // Components, total, position, grade and class average.
      row.extend(std::iter::repeat_with(Cell::placeholder).take(7));
    }
  }

  row.push(Cell::Number(student.grand_total));
  row.push(Cell::from(student.grand_average.to_string()));
  row.push(Cell::from(student.position.to_string()));
  row
}

/// Build the export sheet, or `None` when there is nothing to export.
pub fn build(
  aggregates: &[StudentAggregate],
  catalog: &ClassSubjects,
) -> Option<Sheet> {
  if aggregates.is_empty() {
    return None;
  }

  let columns = headers(&catalog.subjects)
    .into_iter()
    .map(|header| Column { header, width: COLUMN_WIDTH })
    .collect();

  Some(Sheet {
    name: SHEET_NAME.to_owned(),
    columns,
    rows: aggregates.iter().map(student_row).collect(),
  })
}
