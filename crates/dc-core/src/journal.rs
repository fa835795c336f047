//! Append-only journal entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{UserId, ValidationError, non_empty};

/// A free-text journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Creates an entry, rejecting blank content.
    pub fn new(
        user_id: UserId,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            user_id,
            content: non_empty("journal entry", content)?,
            created_at,
        })
    }
}
