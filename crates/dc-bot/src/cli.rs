//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dc_engine::ProactiveJob;

/// Accountability bot for habits, addictions and goals.
///
/// Runs the conversation engine against a local `SQLite` database, with the
/// console standing in for the chat network.
#[derive(Debug, Parser)]
#[command(name = "discipline", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Talk to the bot as one user over stdin/stdout.
    ///
    /// Lines starting with `/` are commands, lines starting with `!` press
    /// the button with that token, anything else is plain text.
    Chat {
        /// Chat user id to act as.
        #[arg(long)]
        user: String,

        /// Display name used when the user is first registered.
        #[arg(long, default_value = "User")]
        name: String,

        /// Public handle to record for the user.
        #[arg(long)]
        handle: Option<String>,

        /// Also run the proactive jobs at their configured times.
        #[arg(long)]
        schedule: bool,
    },

    /// Run one proactive job now.
    Job {
        /// daily-motivation, evening-checkin or goal-reminder.
        job: ProactiveJob,
    },

    /// List the most recently registered users.
    Users {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show user counts.
    Stats,

    /// Show the streak leaderboard.
    Leaderboard,
}
