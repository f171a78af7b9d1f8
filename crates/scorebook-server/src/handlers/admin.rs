//! Administrative handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/admin-login` | Public; body `{"username","password"}`; 403 unless an admin |
//! | `POST` | `/delete-record` | Body `{"class","serialNumbers":[…]}` |
//! | `GET`  | `/logs?limit=<n>` | Newest first |
//! | `POST` | `/reset-subjects` | Re-seed the catalog from the built-in defaults |
//!
//! Every mutation here is also written to the audit log.

use axum::{
  Json,
  extract::{Query, State},
};
use scorebook_core::{audit::LogEntry, catalog::default_catalog, store::ScoreStore};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{AdminOnly, Role},
  error::Error,
  handlers::{require_class, serials, store_err},
};

const DEFAULT_LOG_LIMIT: usize = 50;

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
  pub message: String,
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /admin-login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<Message>, Error>
where
  S: ScoreStore + Clone + 'static,
{
  match state.auth.verify_credentials(&body.username, &body.password) {
    Ok(account) if account.role.permits(Role::Admin) => {
      tracing::info!(username = %body.username, "admin login");
      Ok(Json(Message { message: "Admin login successful".into() }))
    }
    _ => {
      tracing::warn!(username = %body.username, "rejected admin login");
      Err(Error::Forbidden)
    }
  }
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBody {
  pub class:          String,
  #[serde(deserialize_with = "serials")]
  pub serial_numbers: Vec<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
  pub deleted: usize,
}

/// `POST /delete-record`
pub async fn delete<S>(
  admin: AdminOnly,
  State(state): State<AppState<S>>,
  Json(body): Json<DeleteBody>,
) -> Result<Json<Deleted>, Error>
where
  S: ScoreStore + Clone + 'static,
{
  require_class(&state, &body.class).await?;
  if body.serial_numbers.is_empty() {
    return Err(Error::BadRequest("no serial numbers given".into()));
  }

  let deleted = state
    .store
    .delete_students(&body.class, &body.serial_numbers)
    .await
    .map_err(store_err)?;

  let listed = body
    .serial_numbers
    .iter()
    .map(u32::to_string)
    .collect::<Vec<_>>()
    .join(", ");
  state
    .store
    .append_log(format!(
      "{} deleted records S/N {listed} for {}",
      admin.username, body.class
    ))
    .await
    .map_err(store_err)?;

  tracing::info!(class = %body.class, deleted, by = %admin.username, "records deleted");
  Ok(Json(Deleted { deleted }))
}

// ─── Logs ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LogParams {
  pub limit: Option<usize>,
}

/// `GET /logs[?limit=<n>]`
pub async fn logs<S>(
  _admin: AdminOnly,
  State(state): State<AppState<S>>,
  Query(params): Query<LogParams>,
) -> Result<Json<Vec<LogEntry>>, Error>
where
  S: ScoreStore + Clone + 'static,
{
  let limit = params.limit.unwrap_or(DEFAULT_LOG_LIMIT);
  let entries = state.store.recent_logs(limit).await.map_err(store_err)?;
  Ok(Json(entries))
}

// ─── Reset ───────────────────────────────────────────────────────────────────

/// `POST /reset-subjects`
pub async fn reset_subjects<S>(
  admin: AdminOnly,
  State(state): State<AppState<S>>,
) -> Result<Json<Message>, Error>
where
  S: ScoreStore + Clone + 'static,
{
  let catalog = default_catalog();
  let count = catalog.len();
  state.store.seed_catalog(catalog).await.map_err(store_err)?;
  state
    .store
    .append_log(format!("{} reset the subject catalog to defaults", admin.username))
    .await
    .map_err(store_err)?;

  tracing::info!(classes = count, by = %admin.username, "subject catalog reset");
  Ok(Json(Message { message: format!("Reset subjects for {count} classes") }))
}
