//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("forbidden")]
  Forbidden,
  #[error("not found: {0}")]
  NotFound(String),
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error(transparent)]
  Invalid(#[from] scorebook_core::Error),
  #[error("report error: {0}")]
  Report(#[from] scorebook_report::Error),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::NotFound(_)
      | Error::Invalid(scorebook_core::Error::StudentNotFound { .. }) => StatusCode::NOT_FOUND,
      Error::BadRequest(_) | Error::Invalid(_) => StatusCode::BAD_REQUEST,
      Error::Report(_) | Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"scorebook\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validation_errors_are_bad_requests() {
    let res = Error::from(scorebook_core::Error::EmptyName).into_response();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn missing_student_is_not_found() {
    let err = scorebook_core::Error::StudentNotFound { class: "jss1".into(), serial: 9 };
    assert_eq!(Error::from(err).into_response().status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn unauthorized_challenges_for_basic_auth() {
    let res = Error::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }
}
