//! Error types for the report pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("xml error: {0}")]
  Xml(String),

  #[error("zip error: {0}")]
  Zip(#[from] zip::result::ZipError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
