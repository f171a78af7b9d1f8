pub mod admin;
pub mod catalog;
pub mod export;
pub mod scores;

use scorebook_core::{catalog::ClassSubjects, store::ScoreStore};
use serde::{Deserialize, Deserializer, de};

use crate::{AppState, error::Error};

/// `GET /ping`
pub async fn ping() -> &'static str { "Alive!" }

/// `?class=<key>` for the per-class read routes.
#[derive(Debug, Deserialize)]
pub struct ClassParams {
  pub class: String,
}

pub(crate) fn store_err<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}

/// The catalog entry for `class`; unknown classes are a client error.
pub(crate) async fn require_class<S>(state: &AppState<S>, class: &str) -> Result<ClassSubjects, Error>
where
  S: ScoreStore + Clone + 'static,
{
  state
    .store
    .get_subjects(class)
    .await
    .map_err(store_err)?
    .ok_or_else(|| scorebook_core::Error::UnknownClass(class.to_owned()).into())
}

// ─── Serial numbers ──────────────────────────────────────────────────────────

// Clients send serial numbers both as JSON numbers and as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum SerialRepr {
  Number(u64),
  Text(String),
}

fn parse_serial<E: de::Error>(raw: SerialRepr) -> Result<u32, E> {
  let value = match raw {
    SerialRepr::Number(n) => u32::try_from(n).ok(),
    SerialRepr::Text(s) => s.trim().parse::<u32>().ok(),
  };
  value
    .filter(|n| *n > 0)
    .ok_or_else(|| E::custom("serial numbers must be positive integers"))
}

pub(crate) fn serial<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
  D: Deserializer<'de>,
{
  parse_serial(SerialRepr::deserialize(deserializer)?)
}

pub(crate) fn serials<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
  D: Deserializer<'de>,
{
  Vec::<SerialRepr>::deserialize(deserializer)?
    .into_iter()
    .map(parse_serial)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Deserialize)]
  struct One {
    #[serde(deserialize_with = "serial")]
    n: u32,
  }

  #[derive(Debug, Deserialize)]
  struct Many {
    #[serde(deserialize_with = "serials")]
    n: Vec<u32>,
  }

  #[test]
  fn serials_accept_numbers_and_strings() {
    let one: One = serde_json::from_str(r#"{"n": "7"}"#).unwrap();
    assert_eq!(one.n, 7);
    let many: Many = serde_json::from_str(r#"{"n": [1, "2", " 3 "]}"#).unwrap();
    assert_eq!(many.n, [1, 2, 3]);
  }

  #[test]
  fn serials_reject_zero_and_garbage() {
    assert!(serde_json::from_str::<One>(r#"{"n": 0}"#).is_err());
    assert!(serde_json::from_str::<One>(r#"{"n": "abc"}"#).is_err());
    assert!(serde_json::from_str::<Many>(r#"{"n": [1, -4]}"#).is_err());
  }
}
