//! Handlers for the class catalog.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/get-classes` | Class keys in catalog order |
//! | `GET`  | `/get-subjects?class=<key>` | 400 for an unknown class |

use axum::{
  Json,
  extract::{Query, State},
};
use scorebook_core::store::ScoreStore;

use crate::{
  AppState,
  auth::Authenticated,
  error::Error,
  handlers::{ClassParams, require_class, store_err},
};

/// `GET /get-classes`
pub async fn classes<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<String>>, Error>
where
  S: ScoreStore + Clone + 'static,
{
  let classes = state.store.list_classes().await.map_err(store_err)?;
  Ok(Json(classes))
}

/// `GET /get-subjects?class=<key>`
pub async fn subjects<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  Query(params): Query<ClassParams>,
) -> Result<Json<Vec<String>>, Error>
where
  S: ScoreStore + Clone + 'static,
{
  let catalog = require_class(&state, &params.class).await?;
  Ok(Json(catalog.subjects))
}
