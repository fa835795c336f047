//! Per-user dialogue state.
//!
//! A user is in at most one multi-step flow at a time. The flow's position and
//! its accumulated inputs live in [`Stage`], so a stage can never be missing
//! the data it needs. Sessions expire after a configurable idle timeout.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use dc_core::{HabitId, UserId};

/// Default idle timeout, in seconds, before a session is discarded.
pub const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 30 * 60;

/// A check-in in progress: the habits to ask about and the one being asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinQueue {
    habits: Vec<HabitId>,
    cursor: usize,
}

impl CheckinQueue {
    pub const fn new(habits: Vec<HabitId>) -> Self {
        Self { habits, cursor: 0 }
    }

    /// The habit currently being asked about, `None` once finished.
    pub fn current(&self) -> Option<&HabitId> {
        self.habits.get(self.cursor)
    }

    pub const fn advance(&mut self) {
        self.cursor += 1;
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.habits.len()
    }

    /// One-based position of the current habit and the queue length.
    pub fn position(&self) -> (usize, usize) {
        (self.cursor + 1, self.habits.len())
    }
}

/// Where a user is within a multi-step flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    AwaitingHabitName,
    AwaitingHabitType { name: String },
    AwaitingHabitUnit { name: String },
    AwaitingAddictionName,
    AwaitingAddictionReason { name: String },
    AwaitingJournalEntry,
    AwaitingGoalDescription,
    AwaitingGoalDate { description: String },
    AwaitingCheckinBinary(CheckinQueue),
    AwaitingCheckinQuantitative(CheckinQueue),
    AwaitingBroadcast,
}

impl Stage {
    /// Stable name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AwaitingHabitName => "awaiting_habit_name",
            Self::AwaitingHabitType { .. } => "awaiting_habit_type",
            Self::AwaitingHabitUnit { .. } => "awaiting_habit_unit",
            Self::AwaitingAddictionName => "awaiting_addiction_name",
            Self::AwaitingAddictionReason { .. } => "awaiting_addiction_reason",
            Self::AwaitingJournalEntry => "awaiting_journal_entry",
            Self::AwaitingGoalDescription => "awaiting_goal_description",
            Self::AwaitingGoalDate { .. } => "awaiting_goal_date",
            Self::AwaitingCheckinBinary(_) => "awaiting_checkin_binary",
            Self::AwaitingCheckinQuantitative(_) => "awaiting_checkin_quantitative",
            Self::AwaitingBroadcast => "awaiting_broadcast",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub stage: Stage,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub const fn new(stage: Stage, updated_at: DateTime<Utc>) -> Self {
        Self { stage, updated_at }
    }
}

/// Storage for sessions, keyed by user.
///
/// Implementations must treat a session older than their timeout as absent.
pub trait SessionStore: Send + Sync {
    /// The live session for `user` at `now`, if any.
    fn get(&self, user: &UserId, now: DateTime<Utc>) -> Option<Session>;

    /// Like [`SessionStore::get`], but also restarts the idle clock at `now`.
    fn touch(&self, user: &UserId, now: DateTime<Utc>) -> Option<Session>;

    /// Replaces the session for `user`.
    fn set(&self, user: &UserId, session: Session);

    /// Removes and returns the session for `user`.
    fn clear(&self, user: &UserId) -> Option<Session>;
}

/// In-process session store. Expired sessions are dropped on access.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<UserId, Session>>,
    timeout: Duration,
}

impl MemorySessionStore {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Number of stored sessions, including ones not yet found expired.
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_SESSION_TIMEOUT_SECS))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, user: &UserId, now: DateTime<Utc>) -> Option<Session> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let session = sessions.get(user)?;
        if now - session.updated_at > self.timeout {
            tracing::debug!(%user, stage = session.stage.name(), "session expired");
            sessions.remove(user);
            return None;
        }
        Some(session.clone())
    }

    fn touch(&self, user: &UserId, now: DateTime<Utc>) -> Option<Session> {
        let session = self.get(user, now)?;
        let touched = Session::new(session.stage, now);
        self.set(user, touched.clone());
        Some(touched)
    }

    fn set(&self, user: &UserId, session: Session) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.clone(), session);
    }

    fn clear(&self, user: &UserId) -> Option<Session> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(user)
    }
}
