//! Conversation engine for the discipline bot.
//!
//! The engine turns normalized inbound events into state changes and outbound
//! messages. Storage, text generation and delivery sit behind the traits in
//! [`ports`], so the same engine runs against `SQLite` and a chat network or
//! against in-memory fakes.

pub mod action;
mod engine;
mod error;
mod locks;
pub mod memory;
pub mod outbound;
pub mod ports;
mod prompts;
mod render;
pub mod session;

pub use action::{Action, Command, HabitTypeChoice, Inbound, Input, UnknownAction, UnknownCommand};
pub use engine::{
    BatchReport, Engine, EngineConfig, FAILURE_TEXT, ProactiveJob, UnknownJob,
};
pub use error::EngineError;
pub use memory::MemoryRepository;
pub use outbound::{Button, Delivery, Keyboard, Outbound};
pub use ports::{
    BoxError, PortError, PromptMessage, PromptRole, TextGenerator, Transport, UserRepository,
};
pub use prompts::FALLBACK_TEXT;
pub use session::{
    CheckinQueue, DEFAULT_SESSION_TIMEOUT_SECS, MemorySessionStore, Session, SessionStore, Stage,
};
