//! Streak transitions for habits and addictions.
//!
//! Streaks only move on explicit reports. A missed check-in leaves a streak
//! alone; only a reported failure resets it.

use chrono::NaiveDate;

use crate::scoring::ScoreEvent;
use crate::user::{Addiction, Habit};

/// A user's answer for one habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitReport {
    /// Binary yes/no.
    Done(bool),
    /// Quantitative count.
    Amount(u32),
}

/// Whether a check-in kept the streak alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinOutcome {
    Kept,
    Missed,
}

impl CheckinOutcome {
    /// The score event this outcome earns.
    #[must_use]
    pub const fn score_event(self) -> ScoreEvent {
        match self {
            Self::Kept => ScoreEvent::CheckinKept,
            Self::Missed => ScoreEvent::CheckinMissed,
        }
    }
}

/// Records a check-in answer on `habit`.
pub fn record_checkin(habit: &mut Habit, report: HabitReport) -> CheckinOutcome {
    let progress = match report {
        HabitReport::Done(true) => 1,
        HabitReport::Done(false) => 0,
        HabitReport::Amount(value) => value,
    };

    if progress > 0 {
        habit.streak = habit.streak.saturating_add(1);
        habit.progress = progress;
        CheckinOutcome::Kept
    } else {
        habit.streak = 0;
        habit.progress = 0;
        CheckinOutcome::Missed
    }
}

/// Resets an addiction's streak after a reported relapse.
pub fn record_relapse(addiction: &mut Addiction) {
    addiction.streak = 0;
}

/// Counts a clean day, at most once per calendar day.
///
/// Returns whether the streak moved.
pub fn record_clean_day(addiction: &mut Addiction, today: NaiveDate) -> bool {
    if addiction.last_clean_day == Some(today) {
        return false;
    }
    addiction.streak = addiction.streak.saturating_add(1);
    addiction.last_clean_day = Some(today);
    true
}
