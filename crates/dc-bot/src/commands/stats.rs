//! User counts.

use std::io::Write;

use anyhow::Result;
use dc_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let stats = db.user_stats()?;
    writeln!(writer, "Total users:      {}", stats.total_users)?;
    writeln!(writer, "With habits:      {}", stats.users_with_habits)?;
    writeln!(writer, "With addictions:  {}", stats.users_with_addictions)?;
    Ok(())
}
