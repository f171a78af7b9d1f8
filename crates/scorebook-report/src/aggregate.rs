//! Aggregator: reshapes flat score rows into per-student records.
//!
//! A [`StudentAggregate`] is never stored. It is rebuilt from the current row
//! snapshot on every report request and discarded afterwards.

use std::{
  collections::{BTreeMap, HashMap},
  fmt,
};

use scorebook_core::{
  catalog::ClassSubjects,
  score::{Components, SUBJECT_MAX, ScoreEntry, subject_key},
};
use serde::{Serialize, Serializer};

use crate::{
  PLACEHOLDER,
  grade::{Grade, classify},
  rank::{Position, rank},
};

// ─── Percentage ──────────────────────────────────────────────────────────────

/// A percentage rendered with one decimal place, e.g. `70.0%`, or the
/// placeholder when the ratio is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Percentage(Option<f64>);

impl Percentage {
  /// `part / whole * 100`; undefined when `whole` is not positive.
  pub fn of(part: f64, whole: f64) -> Self {
    if whole > 0.0 {
      Self(Some(part / whole * 100.0))
    } else {
      Self(None)
    }
  }

  pub fn undefined() -> Self { Self(None) }
}

impl fmt::Display for Percentage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.0 {
      Some(v) => write!(f, "{v:.1}%"),
      None => f.write_str(PLACEHOLDER),
    }
  }
}

impl Serialize for Percentage {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// One student's result in one catalog subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectResult {
  /// The subject name as it appears in the catalog.
  pub subject:       String,
  pub components:    Components,
  pub total:         f64,
  /// `false` when the student has no row for the subject or scored nothing.
  pub offered:       bool,
  /// `None` when the subject is not offered.
  pub grade:         Option<Grade>,
  pub position:      Position,
  /// Mean total among the students offering the subject.
  pub class_average: Percentage,
}

/// The derived, per-student view of a class's scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentAggregate {
  pub serial_number: u32,
  pub student_name:  String,
  /// One entry per catalog subject, in catalog order.
  pub subjects:      Vec<SubjectResult>,
  pub grand_total:   f64,
  pub grand_average: Percentage,
  /// Class position by grand total.
  pub position:      Position,
}

impl StudentAggregate {
  /// Look up a subject by name, ignoring case.
  pub fn subject(&self, name: &str) -> Option<&SubjectResult> {
    let key = subject_key(name);
    self.subjects.iter().find(|s| subject_key(&s.subject) == key)
  }
}

// ─── Grouping ────────────────────────────────────────────────────────────────

struct Roster {
  student_name: String,
  scores:       HashMap<String, Components>,
}

/// Group rows by serial number; iteration order is ascending serial.
fn group_by_serial(rows: &[ScoreEntry]) -> BTreeMap<u32, Roster> {
  let mut students: BTreeMap<u32, Roster> = BTreeMap::new();
  for row in rows {
    let roster = students.entry(row.serial_number).or_insert_with(|| Roster {
      student_name: row.student_name.clone(),
      scores:       HashMap::new(),
    });
    roster.scores.insert(subject_key(&row.subject), row.components);
  }
  students
}

fn class_average(totals: impl Iterator<Item = f64>) -> Percentage {
  let (sum, count) = totals
    .filter(|t| *t > 0.0)
    .fold((0.0, 0usize), |(sum, count), t| (sum + t, count + 1));
  Percentage::of(sum, count as f64 * SUBJECT_MAX)
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// Build one [`StudentAggregate`] per student found in `rows`.
///
/// Rows whose subject is not in `catalog` are ignored. Totals are recomputed
/// from components; the stored `total` column is not consulted.
pub fn aggregate(
  rows: &[ScoreEntry],
  catalog: &ClassSubjects,
) -> Vec<StudentAggregate> {
  let roster = group_by_serial(rows);
  let senior = catalog.is_senior();
  let keys: Vec<String> =
    catalog.subjects.iter().map(|s| subject_key(s)).collect();

  // table[student][subject]
  let table: Vec<Vec<Components>> = roster
    .values()
    .map(|student| {
      keys
        .iter()
        .map(|k| student.scores.get(k).copied().unwrap_or_default())
        .collect()
    })
    .collect();

  let subject_positions: Vec<Vec<Position>> = (0..keys.len())
    .map(|j| {
      let totals: Vec<f64> = table.iter().map(|row| row[j].total()).collect();
      rank(&totals)
    })
    .collect();

  let class_averages: Vec<Percentage> = (0..keys.len())
    .map(|j| class_average(table.iter().map(|row| row[j].total())))
    .collect();

  let grand_totals: Vec<f64> = table
    .iter()
    .map(|row| row.iter().map(Components::total).sum())
    .collect();
  let overall = rank(&grand_totals);
  let max_possible = catalog.max_possible();

  roster
    .into_iter()
    .zip(table)
    .enumerate()
    .map(|(i, ((serial_number, student), row))| {
      let subjects = catalog
        .subjects
        .iter()
        .zip(row)
        .enumerate()
        .map(|(j, (name, components))| {
          let total = components.total();
          let offered = total > 0.0;
          SubjectResult {
            subject: name.clone(),
            components,
            total,
            offered,
            grade: offered.then(|| classify(total, senior)),
            position: subject_positions[j][i],
            class_average: class_averages[j],
          }
        })
        .collect();

      StudentAggregate {
        serial_number,
        student_name: student.student_name,
        subjects,
        grand_total: grand_totals[i],
        grand_average: Percentage::of(grand_totals[i], max_possible),
        position: overall[i],
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;
  use scorebook_core::score::SubjectScore;

  use super::*;

  fn row(serial: u32, name: &str, subject: &str, ca1: f64, ca2: f64, exam: f64) -> ScoreEntry {
    ScoreEntry::new(
      "jss1",
      serial,
      name,
      SubjectScore::new(subject, Components::new(ca1, ca2, exam)),
    )
  }

  fn jss1() -> ClassSubjects {
    ClassSubjects::new("jss1", &["english", "mathematics"])
  }

  #[test]
  fn single_student_end_to_end() {
    let rows = vec![
      row(1, "Ada", "english", 10.0, 10.0, 40.0),
      row(1, "Ada", "mathematics", 15.0, 15.0, 50.0),
    ];
    let students = aggregate(&rows, &jss1());
    assert_eq!(students.len(), 1);

    let ada = &students[0];
    assert_eq!(ada.grand_total, 140.0);
    assert_eq!(ada.grand_average.to_string(), "70.0%");
    assert_eq!(ada.subject("english").unwrap().grade, Some(Grade::C));
    assert_eq!(ada.subject("MATHEMATICS").unwrap().grade, Some(Grade::A));
    assert_eq!(ada.position, Position::Ranked(1));
  }

  #[test]
  fn stored_total_is_ignored() {
    let mut stale = row(1, "Ada", "english", 10.0, 10.0, 40.0);
    stale.total = 99.0;
    let students = aggregate(&[stale], &jss1());
    assert_eq!(students[0].subject("english").unwrap().total, 60.0);
  }

  #[test]
  fn missing_subject_is_not_offered_and_excluded_from_average() {
    let rows = vec![
      row(1, "Ada", "english", 10.0, 10.0, 40.0),
      row(1, "Ada", "mathematics", 15.0, 15.0, 50.0),
      row(2, "Bayo", "english", 20.0, 20.0, 40.0),
    ];
    let students = aggregate(&rows, &jss1());
    let bayo = &students[1];
    let maths = bayo.subject("mathematics").unwrap();
    assert!(!maths.offered);
    assert_eq!(maths.grade, None);
    assert_eq!(maths.position, Position::Unranked);
    assert_eq!(bayo.grand_total, 80.0);

    // Only Ada offers mathematics.
    assert_eq!(maths.class_average.to_string(), "80.0%");
    let english = bayo.subject("english").unwrap();
    assert_eq!(english.class_average.to_string(), "70.0%");
    assert_eq!(english.position, Position::Ranked(1));
  }

  #[test]
  fn subject_nobody_offers_has_placeholder_average() {
    let rows = vec![row(1, "Ada", "english", 10.0, 10.0, 40.0)];
    let students = aggregate(&rows, &jss1());
    let maths = students[0].subject("mathematics").unwrap();
    assert_eq!(maths.class_average, Percentage::undefined());
    assert_eq!(maths.class_average.to_string(), "-");
  }

  #[test]
  fn subjects_match_case_insensitively() {
    let rows = vec![row(1, "Ada", "English ", 10.0, 10.0, 40.0)];
    let students = aggregate(&rows, &jss1());
    assert!(students[0].subject("english").unwrap().offered);
  }

  #[test]
  fn unknown_subjects_are_ignored() {
    let rows = vec![
      row(1, "Ada", "english", 10.0, 10.0, 40.0),
      row(1, "Ada", "latin", 20.0, 20.0, 60.0),
    ];
    let students = aggregate(&rows, &jss1());
    assert_eq!(students[0].subjects.len(), 2);
    assert_eq!(students[0].grand_total, 60.0);
  }

  #[test]
  fn students_are_ordered_by_serial() {
    let rows = vec![
      row(3, "Chidi", "english", 10.0, 0.0, 0.0),
      row(1, "Ada", "english", 10.0, 0.0, 0.0),
      row(2, "Bayo", "english", 10.0, 0.0, 0.0),
    ];
    let serials: Vec<u32> =
      aggregate(&rows, &jss1()).iter().map(|s| s.serial_number).collect();
    assert_eq!(serials, [1, 2, 3]);
  }

  #[test]
  fn class_position_uses_grand_total_with_ties() {
    let rows = vec![
      row(1, "Ada", "english", 10.0, 10.0, 50.0),
      row(2, "Bayo", "english", 20.0, 20.0, 50.0),
      row(3, "Chidi", "english", 20.0, 20.0, 50.0),
      row(4, "Dayo", "english", 0.0, 0.0, 0.0),
    ];
    let positions: Vec<String> = aggregate(&rows, &jss1())
      .iter()
      .map(|s| s.position.to_string())
      .collect();
    assert_eq!(positions, ["3rd", "1st", "1st", "-"]);
  }

  #[test]
  fn fixed_denominator_for_science_track() {
    let catalog = ClassSubjects::new("sss2b", &["physics", "chemistry"])
      .with_max_total(1000.0);
    let rows = vec![ScoreEntry::new(
      "sss2b",
      1,
      "Ada",
      SubjectScore::new("physics", Components::new(20.0, 20.0, 60.0)),
    )];
    let students = aggregate(&rows, &catalog);
    assert_eq!(students[0].grand_average.to_string(), "10.0%");
    assert_eq!(students[0].subject("physics").unwrap().grade, Some(Grade::A1));
  }

  #[test]
  fn empty_catalog_has_undefined_average() {
    let catalog = ClassSubjects::new("jss1", &[]);
    let rows = vec![row(1, "Ada", "english", 10.0, 10.0, 40.0)];
    let students = aggregate(&rows, &catalog);
    assert_eq!(students[0].grand_total, 0.0);
    assert_eq!(students[0].grand_average.to_string(), "-");
  }

  #[test]
  fn aggregate_is_idempotent() {
    let rows = vec![
      row(1, "Ada", "english", 10.0, 10.0, 40.0),
      row(2, "Bayo", "mathematics", 15.0, 15.0, 50.0),
    ];
    assert_eq!(aggregate(&rows, &jss1()), aggregate(&rows, &jss1()));
  }

  fn arb_rows() -> impl Strategy<Value = Vec<ScoreEntry>> {
    let subjects = ["english", "mathematics", "french", "latin"];
    prop::collection::vec(
      (1u32..30, 0usize..subjects.len(), 0u8..=20, 0u8..=20, 0u8..=60),
      0..120,
    )
    .prop_map(move |raw| {
      raw
        .into_iter()
        .map(|(serial, s, ca1, ca2, exam)| {
          row(
            serial,
            "Student",
            subjects[s],
            f64::from(ca1),
            f64::from(ca2),
            f64::from(exam),
          )
        })
        .collect()
    })
  }

  proptest! {
    #[test]
    fn grand_total_is_sum_of_subject_totals(rows in arb_rows()) {
      let catalog = ClassSubjects::new("jss2", &["english", "mathematics", "french"]);
      for student in aggregate(&rows, &catalog) {
        let sum: f64 = student.subjects.iter().map(|s| s.total).sum();
        prop_assert_eq!(student.grand_total, sum);
        prop_assert_eq!(student.subjects.len(), 3);
      }
    }

    #[test]
    fn offered_subjects_have_grades_and_positions(rows in arb_rows()) {
      let catalog = ClassSubjects::new("jss2", &["english", "mathematics", "french"]);
      for student in aggregate(&rows, &catalog) {
        for subject in &student.subjects {
          prop_assert_eq!(subject.offered, subject.grade.is_some());
          prop_assert_eq!(subject.offered, subject.position.rank().is_some());
        }
      }
    }
  }
}
