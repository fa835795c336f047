//! Storage layer for the discipline bot.
//!
//! Provides persistence for users, their habits and addictions, journal
//! entries and goals using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Share it across tasks behind a mutex.
//!
//! # Schema
//!
//! ## Date Format
//!
//! Calendar days (`last_interaction_day`, `target_date`, `last_clean_day`) are
//! stored as TEXT `YYYY-MM-DD`. Timestamps are stored as TEXT in RFC 3339 format
//! (e.g., `2024-01-15T10:30:00Z`) so lexicographic ordering matches
//! chronological ordering.
//!
//! ## Ordered Collections
//!
//! Habits and addictions carry a `position` column. Saving a user rewrites both
//! collections in one transaction, so positions always match the in-memory order.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use dc_core::{
    Addiction, AddictionId, Goal, GoalId, GoalStatus, Habit, HabitId, HabitKind, JournalEntry,
    User, UserId, ValidationError,
};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored row failed domain validation.
    #[error("invalid {table} record {id}: {source}")]
    InvalidRecord {
        table: &'static str,
        id: String,
        #[source]
        source: ValidationError,
    },
    /// A stored date or timestamp could not be parsed.
    #[error("invalid date in {table} record {id}: {value}")]
    InvalidDate {
        table: &'static str,
        id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Aggregate counts for the admin statistics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserStats {
    pub total_users: usize,
    pub users_with_habits: usize,
    pub users_with_addictions: usize,
}

struct UserRow {
    id: String,
    name: String,
    username: Option<String>,
    mode: String,
    focus_score: i64,
    last_interaction_day: Option<String>,
}

struct HabitRow {
    user_id: String,
    id: String,
    name: String,
    kind: String,
    unit: Option<String>,
    streak: u32,
    progress: u32,
}

struct AddictionRow {
    user_id: String,
    id: String,
    name: String,
    why: String,
    streak: u32,
    last_clean_day: Option<String>,
}

struct GoalRow {
    id: String,
    user_id: String,
    description: String,
    target_date: String,
    created_at: String,
    status: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                username TEXT,
                mode TEXT NOT NULL DEFAULT 'normal',
                focus_score INTEGER NOT NULL DEFAULT 0,
                last_interaction_day TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_users_created ON users(created_at);

            -- kind: 'binary' or 'quantitative'; unit is set iff quantitative
            CREATE TABLE IF NOT EXISTS habits (
                user_id TEXT NOT NULL,
                id TEXT NOT NULL,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                unit TEXT,
                streak INTEGER NOT NULL DEFAULT 0,
                progress INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (user_id, id),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS addictions (
                user_id TEXT NOT NULL,
                id TEXT NOT NULL,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                why TEXT NOT NULL,
                streak INTEGER NOT NULL DEFAULT 0,
                last_clean_day TEXT,
                PRIMARY KEY (user_id, id),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS journal_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_journal_user ON journal_entries(user_id, created_at);

            CREATE TABLE IF NOT EXISTS goals (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                description TEXT NOT NULL,
                target_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_goals_status ON goals(status, target_date);
            ",
        )?;
        Ok(())
    }

    /// Loads a user with their habits and addictions.
    pub fn load_user(&self, id: &UserId) -> Result<Option<User>, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT id, name, username, mode, focus_score, last_interaction_day
                FROM users WHERE id = ?
                ",
                [id.as_str()],
                read_user_row,
            )
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut users = self.assemble_users(vec![row], Some(id))?;
        Ok(users.pop())
    }

    /// Loads a user, creating and storing a default record if absent.
    ///
    /// A known `username` replaces the stored handle when it differs.
    pub fn load_or_create_user(
        &mut self,
        id: &UserId,
        name: &str,
        username: Option<&str>,
    ) -> Result<User, DbError> {
        if let Some(mut user) = self.load_user(id)? {
            if username.is_some() && user.username.as_deref() != username {
                self.conn.execute(
                    "UPDATE users SET username = ? WHERE id = ?",
                    params![username, id.as_str()],
                )?;
                user.username = username.map(str::to_string);
            }
            return Ok(user);
        }
        let mut user = User::new(id.clone(), name);
        user.username = username.map(str::to_string);
        self.save_user(&user)?;
        tracing::info!(user = %id, "registered new user");
        Ok(user)
    }

    /// Stores a user, replacing their habits and addictions.
    pub fn save_user(&mut self, user: &User) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        write_user(&tx, user)?;
        tx.commit()?;
        Ok(())
    }

    /// Stores a user and appends their journal entry in one transaction.
    pub fn record_journal(&mut self, user: &User, entry: &JournalEntry) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        write_user(&tx, user)?;
        tx.execute(
            "INSERT INTO journal_entries (user_id, content, created_at) VALUES (?, ?, ?)",
            params![
                entry.user_id.as_str(),
                entry.content,
                format_timestamp(entry.created_at),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Lists all users in registration order.
    pub fn list_users(&self) -> Result<Vec<User>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, username, mode, focus_score, last_interaction_day
            FROM users
            ORDER BY created_at ASC, rowid ASC
            ",
        )?;
        let rows = stmt.query_map([], read_user_row)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        self.assemble_users(users, None)
    }

    /// Lists the most recently registered users, newest first.
    pub fn recent_users(&self, limit: usize) -> Result<Vec<User>, DbError> {
        let mut users = self.list_users()?;
        users.reverse();
        users.truncate(limit);
        Ok(users)
    }

    /// Counts users overall and by what they track.
    pub fn user_stats(&self) -> Result<UserStats, DbError> {
        let count = |sql: &str| -> Result<usize, DbError> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or_default())
        };
        Ok(UserStats {
            total_users: count("SELECT COUNT(*) FROM users")?,
            users_with_habits: count("SELECT COUNT(DISTINCT user_id) FROM habits")?,
            users_with_addictions: count("SELECT COUNT(DISTINCT user_id) FROM addictions")?,
        })
    }

    /// Stores a new goal.
    pub fn insert_goal(&mut self, goal: &Goal) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO goals (id, user_id, description, target_date, created_at, status)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                goal.id.as_str(),
                goal.user_id.as_str(),
                goal.description,
                format_day(goal.target_date),
                format_timestamp(goal.created_at),
                goal.status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Lists active goals ordered by target date.
    pub fn list_active_goals(&self) -> Result<Vec<Goal>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, user_id, description, target_date, created_at, status
            FROM goals
            WHERE status = 'active'
            ORDER BY target_date ASC, created_at ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(GoalRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                description: row.get(2)?,
                target_date: row.get(3)?,
                created_at: row.get(4)?,
                status: row.get(5)?,
            })
        })?;
        let mut goals = Vec::new();
        for row in rows {
            goals.push(goal_from_row(row?)?);
        }
        Ok(goals)
    }

    /// Attaches habits and addictions to user rows.
    ///
    /// With `only` set, child rows are fetched for that user alone.
    fn assemble_users(
        &self,
        rows: Vec<UserRow>,
        only: Option<&UserId>,
    ) -> Result<Vec<User>, DbError> {
        let filter = only.map(UserId::as_str);
        let mut habits = self.habit_rows(filter)?;
        let mut addictions = self.addiction_rows(filter)?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            let mut user = user_from_row(&row)?;
            for habit in habits.remove(&row.id).unwrap_or_default() {
                user.habits.push(habit_from_row(habit)?);
            }
            for addiction in addictions.remove(&row.id).unwrap_or_default() {
                user.addictions.push(addiction_from_row(addiction)?);
            }
            users.push(user);
        }
        Ok(users)
    }

    fn habit_rows(&self, user_id: Option<&str>) -> Result<HashMap<String, Vec<HabitRow>>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT user_id, id, name, kind, unit, streak, progress
            FROM habits
            WHERE ?1 IS NULL OR user_id = ?1
            ORDER BY user_id ASC, position ASC
            ",
        )?;
        let rows = stmt.query_map([user_id], |row| {
            Ok(HabitRow {
                user_id: row.get(0)?,
                id: row.get(1)?,
                name: row.get(2)?,
                kind: row.get(3)?,
                unit: row.get(4)?,
                streak: row.get(5)?,
                progress: row.get(6)?,
            })
        })?;
        let mut grouped: HashMap<String, Vec<HabitRow>> = HashMap::new();
        for row in rows {
            let row = row?;
            grouped.entry(row.user_id.clone()).or_default().push(row);
        }
        Ok(grouped)
    }

    fn addiction_rows(
        &self,
        user_id: Option<&str>,
    ) -> Result<HashMap<String, Vec<AddictionRow>>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT user_id, id, name, why, streak, last_clean_day
            FROM addictions
            WHERE ?1 IS NULL OR user_id = ?1
            ORDER BY user_id ASC, position ASC
            ",
        )?;
        let rows = stmt.query_map([user_id], |row| {
            Ok(AddictionRow {
                user_id: row.get(0)?,
                id: row.get(1)?,
                name: row.get(2)?,
                why: row.get(3)?,
                streak: row.get(4)?,
                last_clean_day: row.get(5)?,
            })
        })?;
        let mut grouped: HashMap<String, Vec<AddictionRow>> = HashMap::new();
        for row in rows {
            let row = row?;
            grouped.entry(row.user_id.clone()).or_default().push(row);
        }
        Ok(grouped)
    }
}

fn read_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        mode: row.get(3)?,
        focus_score: row.get(4)?,
        last_interaction_day: row.get(5)?,
    })
}

fn user_from_row(row: &UserRow) -> Result<User, DbError> {
    let invalid = |source| DbError::InvalidRecord {
        table: "users",
        id: row.id.clone(),
        source,
    };
    let id = UserId::new(row.id.clone()).map_err(invalid)?;
    let mut user = User::new(id, row.name.clone());
    user.username.clone_from(&row.username);
    user.mode = row.mode.parse().map_err(invalid)?;
    user.focus_score = row.focus_score;
    user.last_interaction_day = row
        .last_interaction_day
        .as_deref()
        .map(|day| parse_day(day, "users", &row.id))
        .transpose()?;
    Ok(user)
}

fn habit_from_row(row: HabitRow) -> Result<Habit, DbError> {
    let invalid = |source| DbError::InvalidRecord {
        table: "habits",
        id: row.id.clone(),
        source,
    };
    Ok(Habit {
        id: HabitId::new(row.id.clone()).map_err(invalid)?,
        kind: HabitKind::from_parts(&row.kind, row.unit.as_deref()).map_err(invalid)?,
        name: row.name,
        streak: row.streak,
        progress: row.progress,
    })
}

fn addiction_from_row(row: AddictionRow) -> Result<Addiction, DbError> {
    let id = AddictionId::new(row.id.clone()).map_err(|source| DbError::InvalidRecord {
        table: "addictions",
        id: row.id.clone(),
        source,
    })?;
    let last_clean_day = row
        .last_clean_day
        .as_deref()
        .map(|day| parse_day(day, "addictions", &row.id))
        .transpose()?;
    Ok(Addiction {
        id,
        name: row.name,
        why: row.why,
        streak: row.streak,
        last_clean_day,
    })
}

fn goal_from_row(row: GoalRow) -> Result<Goal, DbError> {
    let invalid = |source| DbError::InvalidRecord {
        table: "goals",
        id: row.id.clone(),
        source,
    };
    Ok(Goal {
        id: GoalId::new(row.id.clone()).map_err(invalid)?,
        user_id: UserId::new(row.user_id.clone()).map_err(invalid)?,
        status: row.status.parse::<GoalStatus>().map_err(invalid)?,
        target_date: parse_day(&row.target_date, "goals", &row.id)?,
        created_at: parse_timestamp(&row.created_at, "goals", &row.id)?,
        description: row.description,
    })
}

fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

fn parse_day(value: &str, table: &'static str, id: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, DAY_FORMAT).map_err(|source| DbError::InvalidDate {
        table,
        id: id.to_string(),
        value: value.to_string(),
        source,
    })
}

/// Upserts the user row and replaces its habits and addictions.
fn write_user(conn: &Connection, user: &User) -> Result<(), DbError> {
    let created_at = format_timestamp(Utc::now());
    let last_day = user.last_interaction_day.map(format_day);
    conn.execute(
        "
        INSERT INTO users (id, name, username, mode, focus_score, last_interaction_day, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            username = excluded.username,
            mode = excluded.mode,
            focus_score = excluded.focus_score,
            last_interaction_day = excluded.last_interaction_day
        ",
        params![
            user.id.as_str(),
            user.name,
            user.username,
            user.mode.as_str(),
            user.focus_score,
            last_day,
            created_at,
        ],
    )?;
    conn.execute("DELETE FROM habits WHERE user_id = ?", [user.id.as_str()])?;
    conn.execute(
        "DELETE FROM addictions WHERE user_id = ?",
        [user.id.as_str()],
    )?;
    let mut stmt = conn.prepare(
        "
        INSERT INTO habits (user_id, id, position, name, kind, unit, streak, progress)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )?;
    for (position, habit) in user.habits.iter().enumerate() {
        stmt.execute(params![
            user.id.as_str(),
            habit.id.as_str(),
            position,
            habit.name,
            habit.kind.as_str(),
            habit.kind.unit().map(dc_core::Unit::as_str),
            habit.streak,
            habit.progress,
        ])?;
    }
    let mut stmt = conn.prepare(
        "
        INSERT INTO addictions (user_id, id, position, name, why, streak, last_clean_day)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ",
    )?;
    for (position, addiction) in user.addictions.iter().enumerate() {
        stmt.execute(params![
            user.id.as_str(),
            addiction.id.as_str(),
            position,
            addiction.name,
            addiction.why,
            addiction.streak,
            addiction.last_clean_day.map(format_day),
        ])?;
    }
    Ok(())
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(value: &str, table: &'static str, id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|source| DbError::InvalidDate {
            table,
            id: id.to_string(),
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use dc_core::{Mode, Unit};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_user(id: &str) -> User {
        let mut user = User::new(UserId::new(id).unwrap(), "Sami");
        user.add_habit("Read", HabitKind::Binary).unwrap();
        user.add_habit(
            "Run",
            HabitKind::Quantitative {
                unit: Unit::new("km").unwrap(),
            },
        )
        .unwrap();
        user.add_addiction("Sugar", "energy").unwrap();
        user
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .map(Result::unwrap)
            .collect()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().unwrap();
        let tables: HashSet<String> = ["users", "habits", "addictions", "journal_entries", "goals"]
            .iter()
            .filter(|table| !table_columns(&db.conn, table).is_empty())
            .map(ToString::to_string)
            .collect();
        assert_eq!(tables.len(), 5);
        assert_eq!(
            table_columns(&db.conn, "habits"),
            vec![
                "user_id", "id", "position", "name", "kind", "unit", "streak", "progress"
            ]
        );
    }

    #[test]
    fn load_missing_user_returns_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_user(&UserId::new("404").unwrap()).unwrap().is_none());
    }

    #[test]
    fn save_and_load_preserves_user_and_order() {
        let mut db = Database::open_in_memory().unwrap();
        let mut user = sample_user("1");
        user.mode = Mode::Elite;
        user.focus_score = -15;
        user.last_interaction_day = Some(day(2025, 3, 1));
        user.habits[1].streak = 4;
        user.habits[1].progress = 5;
        user.addictions[0].streak = 2;
        user.addictions[0].last_clean_day = Some(day(2025, 2, 28));

        db.save_user(&user).unwrap();
        let loaded = db.load_user(&user.id).unwrap().unwrap();

        assert_eq!(loaded, user);
    }

    #[test]
    fn save_user_replaces_collections() {
        let mut db = Database::open_in_memory().unwrap();
        let mut user = sample_user("1");
        db.save_user(&user).unwrap();

        user.habits.remove(0);
        user.add_habit("Write", HabitKind::Binary).unwrap();
        db.save_user(&user).unwrap();

        let loaded = db.load_user(&user.id).unwrap().unwrap();
        let names: Vec<&str> = loaded.habits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Run", "Write"]);
    }

    #[test]
    fn load_or_create_user_is_idempotent() {
        let mut db = Database::open_in_memory().unwrap();
        let id = UserId::new("9").unwrap();
        let first = db.load_or_create_user(&id, "Ann", None).unwrap();
        let second = db.load_or_create_user(&id, "Other", None).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.name, "Ann");
        assert_eq!(db.list_users().unwrap().len(), 1);
    }

    #[test]
    fn load_or_create_user_tracks_handle_changes() {
        let mut db = Database::open_in_memory().unwrap();
        let id = UserId::new("9").unwrap();

        let created = db.load_or_create_user(&id, "Ann", Some("ann")).unwrap();
        assert_eq!(created.username.as_deref(), Some("ann"));

        db.load_or_create_user(&id, "Ann", None).unwrap();
        let stored = db.load_user(&id).unwrap().unwrap();
        assert_eq!(stored.username.as_deref(), Some("ann"));

        let renamed = db.load_or_create_user(&id, "Ann", Some("ann_b")).unwrap();
        assert_eq!(renamed.username.as_deref(), Some("ann_b"));
        let stored = db.load_user(&id).unwrap().unwrap();
        assert_eq!(stored.username.as_deref(), Some("ann_b"));
    }

    #[test]
    fn list_users_attaches_child_rows_per_user() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_user(&sample_user("1")).unwrap();
        db.save_user(&User::new(UserId::new("2").unwrap(), "Bob"))
            .unwrap();

        let users = db.list_users().unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].habits.len(), 2);
        assert_eq!(users[0].addictions.len(), 1);
        assert!(users[1].habits.is_empty());
        assert_eq!(db.recent_users(1).unwrap()[0].name, "Bob");
    }

    #[test]
    fn user_stats_counts_tracking() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_user(&sample_user("1")).unwrap();
        let mut habit_only = User::new(UserId::new("2").unwrap(), "Bob");
        habit_only.add_habit("Read", HabitKind::Binary).unwrap();
        db.save_user(&habit_only).unwrap();
        db.save_user(&User::new(UserId::new("3").unwrap(), "Cid"))
            .unwrap();

        let stats = db.user_stats().unwrap();

        assert_eq!(
            stats,
            UserStats {
                total_users: 3,
                users_with_habits: 2,
                users_with_addictions: 1,
            }
        );
    }

    fn journal_rows(db: &Database) -> Vec<(String, String)> {
        let mut stmt = db
            .conn
            .prepare("SELECT content, created_at FROM journal_entries ORDER BY id")
            .unwrap();
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .map(Result::unwrap)
            .collect()
    }

    #[test]
    fn record_journal_stores_user_and_entry() {
        let mut db = Database::open_in_memory().unwrap();
        let mut user = sample_user("1");
        db.save_user(&user).unwrap();
        let at = DateTime::parse_from_rfc3339("2025-01-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        user.focus_score += 5;
        let entry = JournalEntry::new(user.id.clone(), "first", at).unwrap();
        db.record_journal(&user, &entry).unwrap();

        assert_eq!(
            journal_rows(&db),
            vec![("first".to_string(), "2025-01-01T10:00:00Z".to_string())]
        );
        let loaded = db.load_user(&user.id).unwrap().unwrap();
        assert_eq!(loaded.focus_score, user.focus_score);
    }

    #[test]
    fn record_journal_rolls_back_the_user_when_the_entry_fails() {
        let mut db = Database::open_in_memory().unwrap();
        let mut user = sample_user("1");
        db.save_user(&user).unwrap();
        let before = user.focus_score;
        db.conn.execute_batch("DROP TABLE journal_entries").unwrap();

        user.focus_score += 5;
        let entry = JournalEntry::new(user.id.clone(), "lost", Utc::now()).unwrap();
        assert!(db.record_journal(&user, &entry).is_err());

        let loaded = db.load_user(&user.id).unwrap().unwrap();
        assert_eq!(loaded.focus_score, before);
    }

    #[test]
    fn list_active_goals_filters_and_orders() {
        let mut db = Database::open_in_memory().unwrap();
        let user = sample_user("1");
        db.save_user(&user).unwrap();
        let now = Utc::now();

        let late = Goal::new(user.id.clone(), "Marathon", day(2025, 9, 1), now);
        let soon = Goal::new(user.id.clone(), "10k", day(2025, 4, 1), now);
        let mut done = Goal::new(user.id.clone(), "5k", day(2025, 2, 1), now);
        done.status = GoalStatus::Completed;
        for goal in [&late, &soon, &done] {
            db.insert_goal(goal).unwrap();
        }

        let goals = db.list_active_goals().unwrap();

        let descriptions: Vec<&str> = goals.iter().map(|g| g.description.as_str()).collect();
        assert_eq!(descriptions, vec!["10k", "Marathon"]);
        assert_eq!(goals[0].target_date, day(2025, 4, 1));
    }

    #[test]
    fn corrupt_mode_is_reported() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_user(&sample_user("1")).unwrap();
        db.conn
            .execute("UPDATE users SET mode = 'loud' WHERE id = '1'", [])
            .unwrap();

        let err = db.load_user(&UserId::new("1").unwrap()).unwrap_err();
        assert!(matches!(err, DbError::InvalidRecord { table: "users", .. }));
    }

    #[test]
    fn database_persists_across_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("discipline.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.save_user(&sample_user("1")).unwrap();
        }
        let db = Database::open(&path).unwrap();
        let user = db.load_user(&UserId::new("1").unwrap()).unwrap().unwrap();
        assert_eq!(user.habits.len(), 2);
    }
}
