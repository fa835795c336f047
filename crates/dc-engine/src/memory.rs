//! In-process [`UserRepository`] for ephemeral sessions and tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use dc_core::{Goal, GoalStatus, JournalEntry, User, UserId};

use crate::ports::{PortError, UserRepository};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    journal: Vec<JournalEntry>,
    goals: Vec<Goal>,
}

impl State {
    fn upsert(&mut self, user: &User) {
        match self.users.iter_mut().find(|stored| stored.id == user.id) {
            Some(stored) => *stored = user.clone(),
            None => self.users.push(user.clone()),
        }
    }
}

/// Keeps everything in memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with existing users, in registration order.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            state: Mutex::new(State {
                users: users.into_iter().collect(),
                ..State::default()
            }),
        }
    }

    /// Snapshot of one user.
    pub fn user(&self, id: &UserId) -> Option<User> {
        self.state().users.iter().find(|user| &user.id == id).cloned()
    }

    pub fn journal_entries(&self) -> Vec<JournalEntry> {
        self.state().journal.clone()
    }

    pub fn goals(&self) -> Vec<Goal> {
        self.state().goals.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn load_user(
        &self,
        id: &UserId,
        display_name: &str,
        username: Option<&str>,
    ) -> Result<User, PortError> {
        let mut state = self.state();
        if let Some(user) = state.users.iter_mut().find(|user| &user.id == id) {
            if username.is_some() && user.username.as_deref() != username {
                user.username = username.map(str::to_string);
            }
            return Ok(user.clone());
        }
        let mut user = User::new(id.clone(), display_name);
        user.username = username.map(str::to_string);
        state.users.push(user.clone());
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<(), PortError> {
        self.state().upsert(user);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, PortError> {
        Ok(self.state().users.clone())
    }

    async fn record_journal(&self, user: &User, entry: &JournalEntry) -> Result<(), PortError> {
        let mut state = self.state();
        state.upsert(user);
        state.journal.push(entry.clone());
        Ok(())
    }

    async fn insert_goal(&self, goal: &Goal) -> Result<(), PortError> {
        self.state().goals.push(goal.clone());
        Ok(())
    }

    async fn list_active_goals(&self) -> Result<Vec<Goal>, PortError> {
        let mut goals: Vec<Goal> = self
            .state()
            .goals
            .iter()
            .filter(|goal| goal.status == GoalStatus::Active)
            .cloned()
            .collect();
        goals.sort_by_key(|goal| goal.target_date);
        Ok(goals)
    }
}
