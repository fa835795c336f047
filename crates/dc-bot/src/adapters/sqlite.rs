//! [`UserRepository`] backed by the `SQLite` database.

use async_trait::async_trait;
use dc_core::{Goal, JournalEntry, User, UserId};
use dc_db::Database;
use dc_engine::{PortError, UserRepository};
use tokio::sync::Mutex;

/// Serializes access to one database connection.
pub struct SqliteRepository {
    db: Mutex<Database>,
}

impl SqliteRepository {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn load_user(
        &self,
        id: &UserId,
        display_name: &str,
        username: Option<&str>,
    ) -> Result<User, PortError> {
        self.db
            .lock()
            .await
            .load_or_create_user(id, display_name, username)
            .map_err(PortError::storage)
    }

    async fn save_user(&self, user: &User) -> Result<(), PortError> {
        self.db
            .lock()
            .await
            .save_user(user)
            .map_err(PortError::storage)
    }

    async fn list_users(&self) -> Result<Vec<User>, PortError> {
        self.db.lock().await.list_users().map_err(PortError::storage)
    }

    async fn record_journal(&self, user: &User, entry: &JournalEntry) -> Result<(), PortError> {
        self.db
            .lock()
            .await
            .record_journal(user, entry)
            .map_err(PortError::storage)
    }

    async fn insert_goal(&self, goal: &Goal) -> Result<(), PortError> {
        self.db
            .lock()
            .await
            .insert_goal(goal)
            .map_err(PortError::storage)
    }

    async fn list_active_goals(&self) -> Result<Vec<Goal>, PortError> {
        self.db
            .lock()
            .await
            .list_active_goals()
            .map_err(PortError::storage)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use dc_core::HabitKind;

    use super::*;

    fn repository() -> SqliteRepository {
        SqliteRepository::new(Database::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_load_registers_once() {
        let repo = repository();
        let id = UserId::new("1").unwrap();

        let mut user = repo.load_user(&id, "Sami", Some("sami")).await.unwrap();
        user.add_habit("Read", HabitKind::Binary).unwrap();
        repo.save_user(&user).await.unwrap();

        let again = repo.load_user(&id, "Someone else", None).await.unwrap();
        assert_eq!(again, user);
        assert_eq!(again.username.as_deref(), Some("sami"));
        assert_eq!(repo.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_goals_round_trip_through_port() {
        let repo = repository();
        let id = UserId::new("1").unwrap();
        repo.load_user(&id, "Sami", None).await.unwrap();
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let goal = Goal::new(
            id,
            "Run a marathon",
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            created,
        );

        repo.insert_goal(&goal).await.unwrap();

        assert_eq!(repo.list_active_goals().await.unwrap(), vec![goal]);
    }

    #[tokio::test]
    async fn test_journal_scores_with_the_entry() {
        let repo = repository();
        let id = UserId::new("1").unwrap();
        let mut user = repo.load_user(&id, "Sami", None).await.unwrap();
        user.focus_score = 5;
        let entry = JournalEntry::new(id.clone(), "won", Utc::now()).unwrap();

        repo.record_journal(&user, &entry).await.unwrap();

        let stored = repo.load_user(&id, "Sami", None).await.unwrap();
        assert_eq!(stored.focus_score, 5);
    }
}
