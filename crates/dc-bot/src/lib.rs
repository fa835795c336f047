//! Host binary library for the discipline bot.
//!
//! Wires the conversation engine to `SQLite`, the chat-completions client and
//! a console transport, and runs the proactive jobs on a daily schedule.

pub mod adapters;
mod cli;
pub mod commands;
mod config;
pub mod scheduler;

pub use cli::{Cli, Commands};
pub use config::{Config, LlmConfig, ScheduleConfig};
