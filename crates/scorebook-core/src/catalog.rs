//! The class → subject catalog.
//!
//! Seeded once at startup from [`default_catalog`] and only replaced through
//! an explicit reset.

use serde::{Deserialize, Serialize};

use crate::score::SUBJECT_MAX;

/// Class keys beginning with this prefix are on the senior track.
pub const SENIOR_PREFIX: &str = "sss";

/// Whether `class` uses the senior (WAEC-style) grading bands.
pub fn is_senior(class: &str) -> bool { class.starts_with(SENIOR_PREFIX) }

/// The ordered subjects offered by one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSubjects {
  pub class:     String,
  pub subjects:  Vec<String>,
  /// Fixed grand-total denominator; `None` means `subjects.len() * 100`.
  #[serde(default)]
  pub max_total: Option<f64>,
}

impl ClassSubjects {
  pub fn new(class: impl Into<String>, subjects: &[&str]) -> Self {
    Self {
      class:     class.into(),
      subjects:  subjects.iter().map(|s| (*s).to_owned()).collect(),
      max_total: None,
    }
  }

  pub fn with_max_total(mut self, max_total: f64) -> Self {
    self.max_total = Some(max_total);
    self
  }

  /// The denominator used for a student's grand average.
  pub fn max_possible(&self) -> f64 {
    self
      .max_total
      .unwrap_or(self.subjects.len() as f64 * SUBJECT_MAX)
  }

  pub fn is_senior(&self) -> bool { is_senior(&self.class) }
}

const EARLY_YEARS: &[&str] = &[
  "maths",
  "english",
  "elementary science",
  "social habits",
  "health habit",
  "crk",
  "writing",
  "creative art",
  "craft",
];

const PRIMARY: &[&str] = &[
  "english language",
  "mathematics",
  "elementary science",
  "social studies",
  "religion studies",
  "home economics",
  "verbal aptitude",
  "computer studies",
  "agricultural science",
  "civic education",
  "hand writing",
  "creative art",
  "quantitative",
  "health education",
  "french",
  "craft",
];

const JUNIOR_SECONDARY: &[&str] = &[
  "english language",
  "mathematics",
  "intro. technology",
  "social studies",
  "civic education",
  "computer studies",
  "integrated science",
  "agric science",
  "business studies",
  "physical health education",
  "french",
];

const SSS1: &[&str] = &[
  "english language",
  "mathematics",
  "christian religious knowledge",
  "civic",
  "agric science",
  "english literature",
  "biology",
  "economic",
  "government",
  "chemistry",
  "physic",
  "french",
  "data processing",
  "commerce",
  "accounting",
];

const SENIOR_ARTS: &[&str] = &[
  "english language",
  "mathematics",
  "christian religious knowledge",
  "civic",
  "agric science",
  "english literature",
  "economic",
  "government",
  "french",
  "data processing",
];

const SENIOR_SCIENCE: &[&str] = &[
  "english language",
  "mathematics",
  "civic edu.",
  "agric science",
  "biology",
  "economic",
  "chemistry",
  "physics",
  "french",
  "data processing",
  "geography",
];

/// Grand-total denominator for the science streams.
pub const SCIENCE_MAX_TOTAL: f64 = 1000.0;

/// The built-in catalog, in display order.
pub fn default_catalog() -> Vec<ClassSubjects> {
  vec![
    ClassSubjects::new("prenursery", EARLY_YEARS),
    ClassSubjects::new("nursery1", EARLY_YEARS),
    ClassSubjects::new("nursery2", EARLY_YEARS),
    ClassSubjects::new("primary1", PRIMARY),
    ClassSubjects::new("primary2", PRIMARY),
    ClassSubjects::new("primary3", PRIMARY),
    ClassSubjects::new("primary4", PRIMARY),
    ClassSubjects::new("primary5", PRIMARY),
    ClassSubjects::new("jss1", JUNIOR_SECONDARY),
    ClassSubjects::new("jss2", JUNIOR_SECONDARY),
    ClassSubjects::new("jss3", JUNIOR_SECONDARY),
    ClassSubjects::new("sss1", SSS1),
    ClassSubjects::new("sss2a", SENIOR_ARTS),
    ClassSubjects::new("sss3a", SENIOR_ARTS),
    ClassSubjects::new("sss2b", SENIOR_SCIENCE).with_max_total(SCIENCE_MAX_TOTAL),
    ClassSubjects::new("sss3b", SENIOR_SCIENCE).with_max_total(SCIENCE_MAX_TOTAL),
  ]
}
