//! Append-only audit records for destructive and administrative actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One audit record. Never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
  pub log_id:    Uuid,
  /// Server-assigned timestamp.
  pub timestamp: DateTime<Utc>,
  pub action:    String,
}
