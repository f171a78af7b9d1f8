//! Handlers for entering and reading scores.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/submit-scores` | Body: `{"class","name","scores":[…]}`; 201 with the new serial |
//! | `POST` | `/update-scores` | Body: `{"class","serialNumber","name"?,"scores":[…]}` |
//! | `GET`  | `/get-scores?class=<key>` | Raw rows plus the class's subjects |
//! | `GET`  | `/get-report?class=<key>` | Aggregated per-student results; 404 if empty |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use scorebook_core::{
  score::{ScoreEntry, SubjectScore},
  store::ScoreStore,
};
use scorebook_report::aggregate::{StudentAggregate, aggregate};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::Authenticated,
  error::Error,
  handlers::{ClassParams, require_class, serial, store_err},
};

fn validate_scores(scores: &[SubjectScore]) -> Result<(), Error> {
  for score in scores {
    score.validate()?;
  }
  Ok(())
}

// ─── Submit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub class:  String,
  pub name:   String,
  pub scores: Vec<SubjectScore>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submitted {
  pub serial_number: u32,
}

/// `POST /submit-scores`
pub async fn submit<S>(
  auth: Authenticated,
  State(state): State<AppState<S>>,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, Error>
where
  S: ScoreStore + Clone + 'static,
{
  require_class(&state, &body.class).await?;
  if body.name.trim().is_empty() {
    return Err(scorebook_core::Error::EmptyName.into());
  }
  if body.scores.is_empty() {
    return Err(scorebook_core::Error::NoScores.into());
  }
  validate_scores(&body.scores)?;

  let subjects = body.scores.len();
  let serial_number = state
    .store
    .insert_student(&body.class, &body.name, body.scores)
    .await
    .map_err(store_err)?;

  tracing::info!(
    class = %body.class,
    serial_number,
    subjects,
    by = %auth.username,
    "scores submitted"
  );
  Ok((StatusCode::CREATED, Json(Submitted { serial_number })))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub class:         String,
  #[serde(deserialize_with = "serial")]
  pub serial_number: u32,
  #[serde(default)]
  pub name:          Option<String>,
  #[serde(default)]
  pub scores:        Vec<SubjectScore>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Updated {
  pub updated: usize,
}

/// `POST /update-scores`
pub async fn update<S>(
  auth: Authenticated,
  State(state): State<AppState<S>>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Updated>, Error>
where
  S: ScoreStore + Clone + 'static,
{
  require_class(&state, &body.class).await?;
  let rename = body
    .name
    .map(|n| n.trim().to_owned())
    .filter(|n| !n.is_empty());
  if body.scores.is_empty() && rename.is_none() {
    return Err(Error::BadRequest("nothing to update".into()));
  }
  validate_scores(&body.scores)?;

  let updated = state
    .store
    .upsert_scores(&body.class, body.serial_number, rename, body.scores)
    .await
    .map_err(store_err)?
    .ok_or_else(|| scorebook_core::Error::StudentNotFound {
      class:  body.class.clone(),
      serial: body.serial_number,
    })?;

  tracing::info!(
    class = %body.class,
    serial_number = body.serial_number,
    updated,
    by = %auth.username,
    "scores updated"
  );
  Ok(Json(Updated { updated }))
}

// ─── Read ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassScores {
  pub subjects: Vec<String>,
  pub records:  Vec<ScoreEntry>,
}

/// `GET /get-scores?class=<key>`
pub async fn list<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  Query(params): Query<ClassParams>,
) -> Result<Json<ClassScores>, Error>
where
  S: ScoreStore + Clone + 'static,
{
  let catalog = require_class(&state, &params.class).await?;
  let records = state
    .store
    .list_scores(&params.class, state.config.row_limit)
    .await
    .map_err(store_err)?;
  Ok(Json(ClassScores { subjects: catalog.subjects, records }))
}

/// `GET /get-report?class=<key>`
pub async fn report<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  Query(params): Query<ClassParams>,
) -> Result<Json<Vec<StudentAggregate>>, Error>
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
  Ok(Json(aggregate(&rows, &catalog)))
}
