//! Ranking users by their best streak.

use crate::user::User;

/// Number of places shown on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 5;

/// One leaderboard place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub streak: u32,
}

/// Ranks users by best streak across habits and addictions.
///
/// Users without a positive streak are left out. Ties are ordered by name.
pub fn rank<'a>(users: impl IntoIterator<Item = &'a User>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = users
        .into_iter()
        .map(|user| LeaderboardEntry {
            name: user.name.clone(),
            streak: user.best_streak(),
        })
        .filter(|entry| entry.streak > 0)
        .collect();
    entries.sort_by(|a, b| b.streak.cmp(&a.streak).then_with(|| a.name.cmp(&b.name)));
    entries.truncate(LEADERBOARD_SIZE);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::UserId;
    use crate::user::HabitKind;

    fn user_with_streak(id: &str, name: &str, streak: u32) -> User {
        let mut user = User::new(UserId::new(id).unwrap(), name);
        let habit = user.add_habit("Read", HabitKind::Binary).unwrap();
        user.habit_mut(&habit).unwrap().streak = streak;
        user
    }

    #[test]
    fn rank_orders_by_streak_and_drops_zero() {
        let users = vec![
            user_with_streak("1", "Ann", 3),
            user_with_streak("2", "Bob", 0),
            user_with_streak("3", "Cid", 9),
            User::new(UserId::new("4").unwrap(), "Dee"),
        ];

        let ranked = rank(&users);

        assert_eq!(
            ranked,
            vec![
                LeaderboardEntry {
                    name: "Cid".to_string(),
                    streak: 9
                },
                LeaderboardEntry {
                    name: "Ann".to_string(),
                    streak: 3
                },
            ]
        );
    }

    #[test]
    fn rank_keeps_top_five_with_name_tiebreak() {
        let users: Vec<User> = ["f", "e", "d", "c", "b", "a"]
            .iter()
            .enumerate()
            .map(|(i, name)| user_with_streak(&i.to_string(), name, 4))
            .collect();

        let names: Vec<String> = rank(&users).into_iter().map(|e| e.name).collect();

        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }
}
