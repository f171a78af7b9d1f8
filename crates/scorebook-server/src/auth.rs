//! HTTP Basic-auth extractors and the credential verifier behind them.
//!
//! Every configured account carries a [`Role`]. Teacher routes take an
//! [`Authenticated`] extractor; admin routes take [`AdminOnly`], which
//! answers `403` for a valid teacher login.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use scorebook_core::store::ScoreStore;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Teacher,
  Admin,
}

impl Role {
  /// Whether this role may use routes that require `required`.
  pub fn permits(self, required: Role) -> bool {
    match required {
      Role::Teacher => true,
      Role::Admin => self == Role::Admin,
    }
  }
}

/// One login, as written in the `[[accounts]]` table of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}

/// Credentials accepted as valid for this server instance.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
  pub accounts: Vec<Account>,
}

impl AuthConfig {
  /// Look up `username` and check `password` against its argon2 hash.
  pub fn verify_credentials(&self, username: &str, password: &str) -> Result<&Account, Error> {
    let account = self
      .accounts
      .iter()
      .find(|a| a.username == username)
      .ok_or(Error::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&account.password_hash)
      .map_err(|_| Error::Unauthorized)?;

    Argon2::default()
      .verify_password(password.as_bytes(), &parsed_hash)
      .map_err(|_| Error::Unauthorized)?;

    Ok(account)
  }
}

/// Present in a handler means the request carried valid credentials.
#[derive(Debug)]
pub struct Authenticated {
  pub username: String,
  pub role:     Role,
}

/// Present in a handler means the request came from an admin account.
#[derive(Debug)]
pub struct AdminOnly {
  pub username: String,
}

/// Verify a `Basic` authorization header against `config`.
pub fn verify_auth<'a>(headers: &HeaderMap, config: &'a AuthConfig) -> Result<&'a Account, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;
  config.verify_credentials(username, password)
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: ScoreStore + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let account = verify_auth(&parts.headers, &state.auth)?;
    Ok(Authenticated {
      username: account.username.clone(),
      role:     account.role,
    })
  }
}

impl<S> FromRequestParts<AppState<S>> for AdminOnly
where
  S: ScoreStore + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let account = verify_auth(&parts.headers, &state.auth)?;
    if !account.role.permits(Role::Admin) {
      tracing::warn!(username = %account.username, "admin route refused");
      return Err(Error::Forbidden);
    }
    Ok(AdminOnly { username: account.username.clone() })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::{Request, header};
  use rand_core::OsRng;
  use scorebook_store_sqlite::SqliteStore;

  use crate::ServerConfig;

  fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig::default()),
      auth:   Arc::new(AuthConfig {
        accounts: vec![
          Account {
            username:      "teacher".to_string(),
            password_hash: hash("chalk"),
            role:          Role::Teacher,
          },
          Account {
            username:      "admin".to_string(),
            password_hash: hash("secret"),
            role:          Role::Admin,
          },
        ],
      }),
    }
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  fn parts(authorization: Option<&str>) -> Parts {
    let mut builder = Request::builder();
    if let Some(value) = authorization {
      builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(axum::body::Body::empty()).unwrap().into_parts().0
  }

  #[test]
  fn admin_permits_everything() {
    assert!(Role::Admin.permits(Role::Teacher));
    assert!(Role::Admin.permits(Role::Admin));
    assert!(Role::Teacher.permits(Role::Teacher));
    assert!(!Role::Teacher.permits(Role::Admin));
  }

  #[tokio::test]
  async fn correct_credentials() {
    let state = make_state().await;
    let mut p = parts(Some(&basic("teacher", "chalk")));
    let auth = Authenticated::from_request_parts(&mut p, &state).await.unwrap();
    assert_eq!(auth.username, "teacher");
    assert_eq!(auth.role, Role::Teacher);
  }

  #[tokio::test]
  async fn wrong_password() {
    let state = make_state().await;
    let mut p = parts(Some(&basic("teacher", "wrong")));
    let result = Authenticated::from_request_parts(&mut p, &state).await;
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn unknown_user() {
    let state = make_state().await;
    let mut p = parts(Some(&basic("nobody", "chalk")));
    let result = Authenticated::from_request_parts(&mut p, &state).await;
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn missing_header() {
    let state = make_state().await;
    let mut p = parts(None);
    let result = Authenticated::from_request_parts(&mut p, &state).await;
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn invalid_base64() {
    let state = make_state().await;
    let mut p = parts(Some("Basic !!!not-base64!!!"));
    let result = Authenticated::from_request_parts(&mut p, &state).await;
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn teacher_is_forbidden_from_admin_routes() {
    let state = make_state().await;
    let mut p = parts(Some(&basic("teacher", "chalk")));
    let result = AdminOnly::from_request_parts(&mut p, &state).await;
    assert!(matches!(result, Err(Error::Forbidden)));

    let mut p = parts(Some(&basic("admin", "secret")));
    let admin = AdminOnly::from_request_parts(&mut p, &state).await.unwrap();
    assert_eq!(admin.username, "admin");
  }
}
