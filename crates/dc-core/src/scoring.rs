//! Focus score transitions.
//!
//! The score is a per-day counter: the first score-affecting action on a new
//! calendar day resets it to zero before applying its delta. There is no
//! floor, so repeated penalties drive it negative.

use chrono::NaiveDate;

use crate::user::User;

/// Score-affecting actions and their deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEvent {
    HabitCreated,
    AddictionCreated,
    JournalEntry,
    /// Binary "yes" or a quantitative value above zero.
    CheckinKept,
    /// Binary "no" or a quantitative zero.
    CheckinMissed,
    Relapse,
    Motivation,
}

impl ScoreEvent {
    #[must_use]
    pub const fn delta(self) -> i64 {
        match self {
            Self::HabitCreated | Self::AddictionCreated => 2,
            Self::JournalEntry => 5,
            Self::CheckinKept => 10,
            Self::CheckinMissed => -5,
            Self::Relapse => -10,
            Self::Motivation => 1,
        }
    }
}

/// Applies `delta` to the user's focus score as of `today`.
///
/// Each call counts: invoking it twice for one action applies the delta twice.
pub fn apply_score_delta(user: &mut User, delta: i64, today: NaiveDate) -> i64 {
    if user.last_interaction_day != Some(today) {
        user.focus_score = 0;
    }
    user.focus_score += delta;
    user.last_interaction_day = Some(today);
    user.focus_score
}

/// Applies the delta for `event`. Returns the new score.
pub fn apply_score_event(user: &mut User, event: ScoreEvent, today: NaiveDate) -> i64 {
    apply_score_delta(user, event.delta(), today)
}

/// The score as it stands for `today`, without mutating the user.
///
/// A score last touched on an earlier day reads as zero.
pub fn score_for_day(user: &User, today: NaiveDate) -> i64 {
    if user.last_interaction_day == Some(today) {
        user.focus_score
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::UserId;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn user() -> User {
        User::new(UserId::new("1").unwrap(), "Sami")
    }

    #[test]
    fn same_day_deltas_sum() {
        let mut user = user();
        let deltas = [2, 5, 10, -5, 1, -10, 2];
        for delta in deltas {
            apply_score_delta(&mut user, delta, day(1));
        }
        assert_eq!(user.focus_score, deltas.iter().sum::<i64>());
    }

    #[test]
    fn day_boundary_resets_before_delta() {
        let mut user = user();
        user.focus_score = 37;
        user.last_interaction_day = Some(day(1));

        let score = apply_score_event(&mut user, ScoreEvent::HabitCreated, day(2));

        assert_eq!(score, 2);
        assert_eq!(user.last_interaction_day, Some(day(2)));
    }

    #[test]
    fn first_action_ever_starts_from_zero() {
        let mut user = user();
        user.focus_score = 12;
        assert_eq!(apply_score_delta(&mut user, 5, day(4)), 5);
    }

    #[test]
    fn score_is_not_floored() {
        let mut user = user();
        for _ in 0..3 {
            apply_score_event(&mut user, ScoreEvent::Relapse, day(1));
        }
        assert_eq!(user.focus_score, -30);
    }

    #[test]
    fn score_for_day_reads_stale_score_as_zero() {
        let mut user = user();
        apply_score_delta(&mut user, 15, day(1));
        assert_eq!(score_for_day(&user, day(1)), 15);
        assert_eq!(score_for_day(&user, day(2)), 0);
        assert_eq!(user.focus_score, 15);
    }

    #[test]
    fn deltas_match_actions() {
        assert_eq!(ScoreEvent::HabitCreated.delta(), 2);
        assert_eq!(ScoreEvent::AddictionCreated.delta(), 2);
        assert_eq!(ScoreEvent::JournalEntry.delta(), 5);
        assert_eq!(ScoreEvent::CheckinKept.delta(), 10);
        assert_eq!(ScoreEvent::CheckinMissed.delta(), -5);
        assert_eq!(ScoreEvent::Relapse.delta(), -10);
        assert_eq!(ScoreEvent::Motivation.delta(), 1);
    }
}
