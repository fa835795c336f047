//! Streak leaderboard.

use std::io::Write;

use anyhow::Result;
use dc_core::rank;
use dc_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let users = db.list_users()?;
    let entries = rank(&users);
    if entries.is_empty() {
        writeln!(writer, "No active streaks.")?;
        return Ok(());
    }
    for (place, entry) in entries.iter().enumerate() {
        let days = if entry.streak == 1 { "day" } else { "days" };
        writeln!(
            writer,
            "{}. {} - {} {days}",
            place + 1,
            entry.name,
            entry.streak
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::commands::testing::seeded_db;

    #[test]
    fn test_leaderboard_ranks_best_streaks() {
        let mut output = Vec::new();
        run(&mut output, &seeded_db()).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        1. Cid - 9 days
        2. Ann - 4 days
        ");
    }

    #[test]
    fn test_empty_leaderboard() {
        let mut output = Vec::new();
        run(&mut output, &Database::open_in_memory().unwrap()).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "No active streaks.\n");
    }
}
