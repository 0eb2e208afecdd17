//! Persisted record types, one JSON document per bucket entry.
//! Distinct from billet-types API models to keep the storage layer independent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A composed message. Written once at creation, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub options: Vec<String>,
}

/// A known sender. Created lazily on first verified login; the message list
/// only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub message_ids: Vec<String>,
}

/// A pending login link. Deleted on the first verification attempt,
/// whatever its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Login {
    pub email: String,
    pub issued_at: DateTime<Utc>,
}

/// One (recipient, option) outcome slot for a message. Materialized in bulk
/// when the message is recorded; `selected_at` is stamped at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub message_id: String,
    pub recipient: u32,
    pub option: u32,
    pub selected_at: Option<DateTime<Utc>>,
}
