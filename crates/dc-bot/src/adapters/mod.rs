//! Implementations of the engine's ports for the host binary.

mod console;
mod generator;
mod sqlite;

pub use console::ConsoleTransport;
pub use generator::LlmGenerator;
pub use sqlite::SqliteRepository;
