//! Error types for `scorebook-core`.

use thiserror::Error;

use crate::score::ComponentKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown class: {0}")]
  UnknownClass(String),

  #[error("student {serial} not found in {class}")]
  StudentNotFound { class: String, serial: u32 },

  #[error("{component} score {value} is outside 0..={max}")]
  ScoreOutOfRange {
    component: ComponentKind,
    value:     f64,
    max:       f64,
  },

  #[error("student name must not be empty")]
  EmptyName,

  #[error("subject name must not be empty")]
  EmptySubject,

  #[error("at least one subject score is required")]
  NoScores,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
