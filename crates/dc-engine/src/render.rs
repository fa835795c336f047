//! Fixed (non-generated) message texts.

use std::fmt::Write as _;

use chrono::NaiveDate;
use dc_core::{Goal, Habit, HabitKind, LeaderboardEntry, User, score_for_day};

pub const HELP: &str = "\
Commands:
/start - take the oath
/motivate - a hit of motivation
/addhabit - commit to a new habit
/addaddiction - name an addiction to quit
/checkin - report on today's habits
/relapse - report a relapse
/journal - write a journal entry
/goal - set a goal with a deadline
/progress - your streaks and today's score
/score - today's focus score
/why - your reasons for quitting
/leaderboard - the top streaks
/toolkit - the main menu
/eliteon, /eliteoff - switch coaching intensity
/cancel - abandon the current step";

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

pub fn progress_report(user: &User, today: NaiveDate) -> String {
    let mut report = String::from("📊 YOUR STATUS REPORT\n\n");
    let _ = writeln!(
        report,
        "🎯 Today's focus score: {}\n",
        score_for_day(user, today)
    );

    report.push_str("HABITS\n");
    if user.habits.is_empty() {
        report.push_str("No habits set. Define your discipline.\n");
    }
    for habit in &user.habits {
        let _ = write!(report, "- {}: {}-day streak 🔥", habit.name, habit.streak);
        if habit.progress > 0 {
            let _ = write!(report, " (last: {})", progress_label(habit));
        }
        report.push('\n');
    }

    report.push_str("\nADDICTIONS\n");
    if user.addictions.is_empty() {
        report.push_str("No addictions logged. Define your enemy.\n");
    }
    for addiction in &user.addictions {
        let _ = writeln!(
            report,
            "- Quitting {}: {} days clean ✅",
            addiction.name, addiction.streak
        );
    }
    report.trim_end().to_string()
}

fn progress_label(habit: &Habit) -> String {
    match &habit.kind {
        HabitKind::Binary => "done".to_string(),
        HabitKind::Quantitative { unit } => format!("{} {unit}", habit.progress),
    }
}

pub fn score(user: &User, today: NaiveDate) -> String {
    format!(
        "🎯 Today's focus score: {}\n\nEvery action counts. Get it up.",
        score_for_day(user, today)
    )
}

pub fn leaderboard(entries: &[LeaderboardEntry]) -> String {
    let mut board = String::from("🏆 LEADERBOARD\n\n");
    if entries.is_empty() {
        board.push_str("The board is empty. Nobody is putting in the work.");
        return board;
    }
    for (index, entry) in entries.iter().enumerate() {
        let medal = MEDALS.get(index).copied().unwrap_or("🔹");
        let _ = writeln!(board, "{medal} {} - {} day streak", entry.name, entry.streak);
    }
    board.trim_end().to_string()
}

pub fn checkin_question(habit: &Habit) -> String {
    match &habit.kind {
        HabitKind::Binary => format!("Did you complete \"{}\" today?", habit.name),
        HabitKind::Quantitative { unit } => format!(
            "How many {unit} did you do for \"{}\" today? Enter a whole number.",
            habit.name
        ),
    }
}

pub fn goal_locked(goal: &Goal, today: NaiveDate) -> String {
    format!(
        "🎯 Goal locked: {}\nDeadline: {} ({} days). No excuses.",
        goal.description,
        goal.target_date,
        goal.days_remaining(today)
    )
}

/// One reminder covering every active goal of a user.
pub fn goal_reminder<'a>(goals: impl IntoIterator<Item = &'a Goal>, today: NaiveDate) -> String {
    let mut text = String::from("🎯 Your goals:\n");
    for goal in goals {
        let days = goal.days_remaining(today);
        let status = match days {
            ..=-1 => "deadline passed".to_string(),
            0 => "due today".to_string(),
            1 => "1 day left".to_string(),
            _ => format!("{days} days left"),
        };
        let _ = writeln!(text, "- {} ({}): {status}", goal.description, goal.target_date);
    }
    text.trim_end().to_string()
}

/// Recent registrations, newest first.
pub fn user_list(users: &[User]) -> String {
    if users.is_empty() {
        return "No users yet.".to_string();
    }
    let mut text = format!("👥 Last {} users:\n", users.len());
    for user in users {
        let handle = user
            .username
            .as_deref()
            .map_or_else(String::new, |name| format!(" @{name}"));
        let _ = writeln!(
            text,
            "- {}{handle} ({}) mode={}",
            user.name, user.id, user.mode
        );
    }
    text.trim_end().to_string()
}

pub fn stats(users: &[User]) -> String {
    let with_habits = users.iter().filter(|user| !user.habits.is_empty()).count();
    let with_addictions = users
        .iter()
        .filter(|user| !user.addictions.is_empty())
        .count();
    format!(
        "📈 Stats\nTotal users: {}\nWith habits: {with_habits}\nWith addictions: {with_addictions}",
        users.len()
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use dc_core::{Mode, Unit, UserId, apply_score_delta};

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn progress_report_lists_streaks_and_todays_score() {
        let mut user = User::new(UserId::new("1").unwrap(), "Sami");
        let read = user.add_habit("Read", HabitKind::Binary).unwrap();
        let run = user
            .add_habit(
                "Run",
                HabitKind::Quantitative {
                    unit: Unit::new("km").unwrap(),
                },
            )
            .unwrap();
        user.add_addiction("Sugar", "energy").unwrap();
        user.habit_mut(&read).unwrap().streak = 3;
        let run = user.habit_mut(&run).unwrap();
        run.streak = 1;
        run.progress = 5;
        apply_score_delta(&mut user, 12, day(1));

        let report = progress_report(&user, day(1));
        assert!(report.contains("Today's focus score: 12"));
        assert!(report.contains("- Read: 3-day streak 🔥\n"));
        assert!(report.contains("- Run: 1-day streak 🔥 (last: 5 km)"));
        assert!(report.contains("- Quitting Sugar: 0 days clean"));

        assert!(progress_report(&user, day(2)).contains("Today's focus score: 0"));
    }

    #[test]
    fn progress_report_for_empty_user() {
        let user = User::new(UserId::new("1").unwrap(), "Sami");
        let report = progress_report(&user, day(1));
        assert!(report.contains("No habits set"));
        assert!(report.ends_with("No addictions logged. Define your enemy."));
    }

    #[test]
    fn leaderboard_uses_medals_then_bullets() {
        let entries: Vec<LeaderboardEntry> = ["A", "B", "C", "D"]
            .iter()
            .zip([9, 7, 5, 2])
            .map(|(name, streak)| LeaderboardEntry {
                name: (*name).to_string(),
                streak,
            })
            .collect();
        let board = leaderboard(&entries);
        assert!(board.contains("🥇 A - 9 day streak"));
        assert!(board.contains("🥉 C - 5 day streak"));
        assert!(board.ends_with("🔹 D - 2 day streak"));
        assert!(leaderboard(&[]).contains("The board is empty"));
    }

    #[test]
    fn goal_reminder_counts_down() {
        let user = UserId::new("1").unwrap();
        let goals = [
            Goal::new(user.clone(), "Ship", day(10), Utc::now()),
            Goal::new(user.clone(), "Fast", day(5), Utc::now()),
            Goal::new(user, "Sleep", day(4), Utc::now()),
        ];
        let text = goal_reminder(&goals, day(5));
        assert!(text.contains("- Ship (2025-03-10): 5 days left"));
        assert!(text.contains("- Fast (2025-03-05): due today"));
        assert!(text.contains("- Sleep (2025-03-04): deadline passed"));
    }

    #[test]
    fn stats_counts_users() {
        let mut a = User::new(UserId::new("1").unwrap(), "A");
        a.add_habit("Read", HabitKind::Binary).unwrap();
        let mut b = User::new(UserId::new("2").unwrap(), "B");
        b.add_addiction("Sugar", "energy").unwrap();
        b.mode = Mode::Elite;
        let c = User::new(UserId::new("3").unwrap(), "C");

        assert_eq!(
            stats(&[a, b, c]),
            "📈 Stats\nTotal users: 3\nWith habits: 1\nWith addictions: 1"
        );
    }

    #[test]
    fn user_list_shows_handles() {
        let mut user = User::new(UserId::new("9").unwrap(), "Sami");
        user.username = Some("sami".to_string());
        assert_eq!(
            user_list(&[user]),
            "👥 Last 1 users:\n- Sami @sami (9) mode=normal"
        );
        assert_eq!(user_list(&[]), "No users yet.");
    }
}
