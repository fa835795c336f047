//! Boundaries to the outside world: persistence, text generation and delivery.

use async_trait::async_trait;
use dc_core::{Goal, JournalEntry, Mode, User, UserId};
use thiserror::Error;

use crate::outbound::Outbound;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A collaborator failed.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("storage failure: {0}")]
    Storage(#[source] BoxError),
    #[error("delivery failure: {0}")]
    Delivery(#[source] BoxError),
    #[error("text generation failure: {0}")]
    Generation(#[source] BoxError),
}

impl PortError {
    pub fn storage(err: impl Into<BoxError>) -> Self {
        Self::Storage(err.into())
    }

    pub fn delivery(err: impl Into<BoxError>) -> Self {
        Self::Delivery(err.into())
    }

    pub fn generation(err: impl Into<BoxError>) -> Self {
        Self::Generation(err.into())
    }
}

/// Durable storage of users and their records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Loads a user, creating a default record named `display_name` if absent.
    ///
    /// A known `username` replaces the stored handle when it differs.
    async fn load_user(
        &self,
        id: &UserId,
        display_name: &str,
        username: Option<&str>,
    ) -> Result<User, PortError>;

    /// Persists the whole user aggregate.
    async fn save_user(&self, user: &User) -> Result<(), PortError>;

    /// All users in registration order.
    async fn list_users(&self) -> Result<Vec<User>, PortError>;

    /// Stores a journal entry together with the user it scored for.
    ///
    /// Either both writes land or neither does.
    async fn record_journal(&self, user: &User, entry: &JournalEntry) -> Result<(), PortError>;

    async fn insert_goal(&self, goal: &Goal) -> Result<(), PortError>;

    async fn list_active_goals(&self) -> Result<Vec<Goal>, PortError>;
}

/// Who authored a prompt turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    User,
    Assistant,
}

/// One turn of a generation prompt. The system prompt is the generator's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            content: content.into(),
        }
    }
}

/// Produces coaching text in the tone of a [`Mode`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &[PromptMessage], mode: Mode) -> Result<String, PortError>;
}

/// Delivers messages to users.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, message: &Outbound) -> Result<(), PortError>;
}
