//! Spreadsheet downloads (admin only).
//!
//! `GET /download-scores?class=<key>` returns one class workbook and honours
//! `If-None-Match`; `GET /download-all-scores` bundles every class with data
//! into `all_scores.zip`. Both answer `404` when there is nothing to export.

use axum::{
  extract::{Query, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use scorebook_core::store::ScoreStore;
use scorebook_report::{
  export::{all_classes_archive, class_workbook},
  sheet::{ARCHIVE_FILE_NAME, sheet_file_name},
  xlsx,
};

use crate::{
  AppState,
  auth::AdminOnly,
  error::Error,
  etag::{compute_etag, if_none_match},
  handlers::{ClassParams, require_class, store_err},
};

const ZIP_CONTENT_TYPE: &str = "application/zip";

fn attachment(content_type: &str, file_name: &str, etag: Option<String>, bytes: Vec<u8>) -> Response {
  let mut res = (
    StatusCode::OK,
    [
      (header::CONTENT_TYPE, content_type.to_owned()),
      (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
    ],
    bytes,
  )
    .into_response();
  if let Some(tag) = etag.and_then(|t| HeaderValue::from_str(&t).ok()) {
    res.headers_mut().insert(header::ETAG, tag);
  }
  res
}

/// `GET /download-scores?class=<key>`
pub async fn class<S>(
  admin: AdminOnly,
  State(state): State<AppState<S>>,
  Query(params): Query<ClassParams>,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: ScoreStore + Clone + 'static,
{
  let catalog = require_class(&state, &params.class).await?;
  let rows = state
    .store
    .list_scores(&params.class, state.config.row_limit)
    .await
    .map_err(store_err)?;
  if rows.is_empty() {
    return Err(Error::NotFound(format!("no scores recorded for {}", params.class)));
  }

  let etag = compute_etag(&catalog, &rows);
  if if_none_match(&headers, &etag) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }

  let bytes = class_workbook(&rows, &catalog)?
    .ok_or_else(|| Error::NotFound(format!("no scores recorded for {}", params.class)))?;

  tracing::info!(
    class = %params.class,
    rows = rows.len(),
    bytes = bytes.len(),
    by = %admin.username,
    "class workbook exported"
  );
  Ok(attachment(
    xlsx::CONTENT_TYPE,
    &sheet_file_name(&params.class),
    Some(etag),
    bytes,
  ))
}

/// `GET /download-all-scores`
pub async fn all<S>(
  admin: AdminOnly,
  State(state): State<AppState<S>>,
) -> Result<Response, Error>
where
  S: ScoreStore + Clone + 'static,
{
  let classes = state.store.list_classes().await.map_err(store_err)?;

  let mut snapshot = Vec::with_capacity(classes.len());
  for class in &classes {
    let catalog = require_class(&state, class).await?;
    let rows = state
      .store
      .list_scores(class, state.config.row_limit)
      .await
      .map_err(store_err)?;
    snapshot.push((catalog, rows));
  }

  let bytes = all_classes_archive(&snapshot)?
    .ok_or_else(|| Error::NotFound("no scores recorded in any class".into()))?;

  tracing::info!(
    classes = classes.len(),
    bytes = bytes.len(),
    by = %admin.username,
    "all classes exported"
  );
  Ok(attachment(ZIP_CONTENT_TYPE, ARCHIVE_FILE_NAME, None, bytes))
}
