//! List recently registered users.

use std::io::Write;

use anyhow::Result;
use dc_core::{Mode, User, UserId};
use dc_db::Database;
use serde::Serialize;

/// How many users the listing shows.
const RECENT_USERS: usize = 20;

#[derive(Serialize)]
struct UserSummary<'a> {
    id: &'a UserId,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    mode: Mode,
    focus_score: i64,
    habits: usize,
    addictions: usize,
}

impl<'a> From<&'a User> for UserSummary<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: &user.id,
            name: &user.name,
            username: user.username.as_deref(),
            mode: user.mode,
            focus_score: user.focus_score,
            habits: user.habits.len(),
            addictions: user.addictions.len(),
        }
    }
}

pub fn run<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let users = db.recent_users(RECENT_USERS)?;
    let summaries: Vec<UserSummary<'_>> = users.iter().map(UserSummary::from).collect();

    if json {
        serde_json::to_writer_pretty(&mut *writer, &summaries)?;
        writeln!(writer)?;
        return Ok(());
    }

    if summaries.is_empty() {
        writeln!(writer, "No users yet.")?;
        return Ok(());
    }

    for user in &summaries {
        let handle = user
            .username
            .map_or_else(String::new, |name| format!(" @{name}"));
        writeln!(
            writer,
            "{:<12} {}{handle}  mode={} score={} habits={} addictions={}",
            user.id.as_str(),
            user.name,
            user.mode,
            user.focus_score,
            user.habits,
            user.addictions
        )?;
    }
    Ok(())
}
