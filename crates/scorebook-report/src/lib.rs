//! Grading, ranking and spreadsheet export for Scorebook.
//!
//! Turns a snapshot of raw score rows into per-student aggregates and then
//! into `.xlsx` workbooks. Pure synchronous; no HTTP or database
//! dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use scorebook_core::catalog::ClassSubjects;
//! use scorebook_report::{aggregate, sheet};
//!
//! let catalog = ClassSubjects::new("jss1", &["english", "mathematics"]);
//! let students = aggregate::aggregate(&[], &catalog);
//! assert!(sheet::build(&students, &catalog).is_none());
//! ```

pub mod aggregate;
pub mod archive;
pub mod error;
pub mod export;
pub mod grade;
pub mod rank;
pub mod sheet;
pub mod xlsx;

pub use error::{Error, Result};

/// Rendered in place of a value that does not exist, e.g. the grade of a
/// subject the student does not offer.
pub const PLACEHOLDER: &str = "-";
