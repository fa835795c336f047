//! Core domain logic for the discipline bot.
//!
//! This crate contains the fundamental types and logic for:
//! - The user aggregate: habits, addictions, mode and focus score
//! - Scoring: per-day focus score transitions
//! - Streaks: habit check-ins, relapses and clean days
//! - Goals and journal entries, including target-date parsing
//! - Leaderboard ranking

pub mod goal;
pub mod journal;
pub mod leaderboard;
pub mod scoring;
pub mod streak;
pub mod types;
pub mod user;

pub use goal::{Goal, GoalStatus, parse_target_date};
pub use journal::JournalEntry;
pub use leaderboard::{LeaderboardEntry, rank};
pub use scoring::{ScoreEvent, apply_score_delta, apply_score_event, score_for_day};
pub use streak::{CheckinOutcome, HabitReport, record_checkin, record_clean_day, record_relapse};
pub use types::{AddictionId, GoalId, HabitId, Mode, Unit, UserId, ValidationError};
pub use user::{Addiction, Habit, HabitKind, User};
