//! Content and chat-session storage
//!
//! This module owns the persisted state: the content records produced by a
//! crawl run and the chat sessions with their ordered messages. Content is
//! replaced wholesale on each run; sessions and messages are append-only.

mod database;
pub mod error;
mod schema;

pub use database::Database;
pub use error::DbError;

use crate::llm::Role;
use serde::{Deserialize, Serialize};

/// A stored content record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    /// Row id
    pub id: i64,

    /// Page title
    pub title: String,

    /// Summarized page content
    pub content: String,

    /// Absolute URL of the source page
    pub url: String,

    /// Creation time, unix seconds
    pub created_at: i64,

    /// Last update time, unix seconds
    pub updated_at: i64,
}

/// A persisted chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Opaque session id
    pub id: String,

    /// Creation time, unix seconds
    pub created_at: i64,

    /// Time of the last appended message, unix seconds
    pub updated_at: i64,
}

/// A persisted chat message, owned by exactly one session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    /// Row id
    pub id: i64,

    /// Owning session
    pub session_id: String,

    /// Who produced the message
    pub role: Role,

    /// Message text
    pub content: String,

    /// Creation time, unix seconds
    pub created_at: i64,
}
