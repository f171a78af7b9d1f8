//! HTTP layer for Scorebook.
//!
//! Exposes an axum [`Router`] for score entry, reports and spreadsheet
//! exports, backed by any [`ScoreStore`].

pub mod auth;
pub mod error;
pub mod etag;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use scorebook_core::store::ScoreStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{Account, AuthConfig};
use handlers::{admin, catalog, export, scores};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SCOREBOOK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Upper bound on rows read for one class per request.
  pub row_limit:  usize,
  pub accounts:   Vec<Account>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       3000,
      store_path: PathBuf::from("scorebook.db"),
      row_limit:  10_000,
      accounts:   Vec::new(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ScoreStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the Scorebook server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ScoreStore + Clone + 'static,
{
  Router::new()
    // Public
    .route("/ping",                get(handlers::ping))
    .route("/admin-login",         post(admin::login::<S>))
    // Teachers
    .route("/get-classes",         get(catalog::classes::<S>))
    .route("/get-subjects",        get(catalog::subjects::<S>))
    .route("/submit-scores",       post(scores::submit::<S>))
    .route("/update-scores",       post(scores::update::<S>))
    .route("/get-scores",          get(scores::list::<S>))
    .route("/get-report",          get(scores::report::<S>))
    // Admins
    .route("/delete-record",       post(admin::delete::<S>))
    .route("/download-scores",     get(export::class::<S>))
    .route("/download-all-scores", get(export::all::<S>))
    .route("/logs",                get(admin::logs::<S>))
    .route("/reset-subjects",      post(admin::reset_subjects::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
