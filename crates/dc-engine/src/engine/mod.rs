//! The dialogue engine.
//!
//! Every inbound event is handled under a per-user lock, so one user's state
//! is only ever touched by one handler at a time. A handler that changes the
//! user aggregate persists it before it updates the session and before it
//! replies; if persistence fails, the session is left as it was.

mod admin;
mod checkin;
mod dialogue;
mod jobs;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use dc_core::{Mode, ScoreEvent, User, UserId, apply_score_event, rank};

use crate::action::{Action, Command, Inbound, Input};
use crate::error::EngineError;
use crate::locks::UserLocks;
use crate::outbound::{Delivery, Keyboard, Outbound};
use crate::ports::{PromptMessage, TextGenerator, Transport, UserRepository};
use crate::prompts::{self, FALLBACK_TEXT};
use crate::render;
use crate::session::{Session, SessionStore, Stage};

pub use jobs::{BatchReport, ProactiveJob, UnknownJob};

/// Sent when a handler fails on storage.
pub const FAILURE_TEXT: &str = "Something broke on my side. Try again in a moment.";

/// Engine settings that are not collaborators.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Zone that decides where one day ends and the next begins.
    pub timezone: Tz,
    pub admin: Option<UserId>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            admin: None,
        }
    }
}

/// Routes inbound events to handlers and runs proactive jobs.
pub struct Engine {
    repository: Arc<dyn UserRepository>,
    generator: Arc<dyn TextGenerator>,
    transport: Arc<dyn Transport>,
    sessions: Arc<dyn SessionStore>,
    locks: UserLocks,
    config: EngineConfig,
}

/// The event being handled.
struct Turn<'a> {
    user: &'a UserId,
    display_name: &'a str,
    username: Option<&'a str>,
    now: DateTime<Utc>,
    today: NaiveDate,
}

impl Engine {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        generator: Arc<dyn TextGenerator>,
        transport: Arc<dyn Transport>,
        sessions: Arc<dyn SessionStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            generator,
            transport,
            sessions,
            locks: UserLocks::default(),
            config,
        }
    }

    /// The calendar day `now` falls on in the configured zone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.config.timezone).date_naive()
    }

    pub async fn handle(&self, inbound: Inbound) -> Result<(), EngineError> {
        self.handle_at(inbound, Utc::now()).await
    }

    /// Handles one event as if it arrived at `now`.
    pub async fn handle_at(&self, inbound: Inbound, now: DateTime<Utc>) -> Result<(), EngineError> {
        let _guard = self.locks.lock(&inbound.user).await;
        let turn = Turn {
            user: &inbound.user,
            display_name: &inbound.display_name,
            username: inbound.username.as_deref(),
            now,
            today: self.today(now),
        };

        match &inbound.input {
            Input::Command(command) => self.on_command(&turn, *command).await,
            Input::Button(action) => self.on_button(&turn, action).await,
            Input::Text(text) => self.on_text(&turn, text).await,
            Input::Media(reference) => {
                tracing::debug!(user = %turn.user, %reference, "ignoring media");
                Ok(())
            }
        }
    }

    /// Handles an event and tells the user if it failed.
    pub async fn process(&self, inbound: Inbound) {
        self.process_at(inbound, Utc::now()).await;
    }

    pub async fn process_at(&self, inbound: Inbound, now: DateTime<Utc>) {
        let user = inbound.user.clone();
        if let Err(err) = self.handle_at(inbound, now).await {
            tracing::error!(%user, error = %err, "failed to handle event");
            self.send(Outbound::send(&user, FAILURE_TEXT)).await;
        }
    }

    async fn on_command(&self, turn: &Turn<'_>, command: Command) -> Result<(), EngineError> {
        if command.is_admin_only() && !self.is_admin(turn.user) {
            tracing::debug!(user = %turn.user, %command, "ignoring admin command");
            return Ok(());
        }
        tracing::debug!(user = %turn.user, %command, "handling command");

        match command {
            Command::Start => self.start(turn).await,
            Command::Motivate => self.motivate(turn).await,
            Command::AddHabit => {
                self.begin(
                    turn,
                    Stage::AwaitingHabitName,
                    "🧠 What is the new habit? Be specific, like \"Read 20 pages\".",
                )
                .await
            }
            Command::AddAddiction => {
                self.begin(
                    turn,
                    Stage::AwaitingAddictionName,
                    "🚫 What addiction are you ready to destroy? Name it.",
                )
                .await
            }
            Command::Journal => {
                self.begin(
                    turn,
                    Stage::AwaitingJournalEntry,
                    "✍️ Journal entry. What were your wins and losses today? Be honest.",
                )
                .await
            }
            Command::Goal => {
                self.begin(
                    turn,
                    Stage::AwaitingGoalDescription,
                    "🎯 What is the goal? One sentence.",
                )
                .await
            }
            Command::Progress => {
                let user = self.load(turn).await?;
                let report = render::progress_report(&user, turn.today);
                self.send(Outbound::send(turn.user, report).with_keyboard(Keyboard::toolkit()))
                    .await;
                Ok(())
            }
            Command::Relapse => self.relapse_picker(turn).await,
            Command::Checkin => self.start_checkin(turn).await,
            Command::Why => self.why(turn).await,
            Command::Score => {
                let user = self.load(turn).await?;
                self.reply(turn, render::score(&user, turn.today)).await;
                Ok(())
            }
            Command::Leaderboard => {
                let users = self.list_users().await?;
                self.reply(turn, render::leaderboard(&rank(&users))).await;
                Ok(())
            }
            Command::Toolkit => {
                self.send(
                    Outbound::send(turn.user, "Here is your toolkit:")
                        .with_keyboard(Keyboard::toolkit()),
                )
                .await;
                Ok(())
            }
            Command::Help => {
                self.reply(turn, render::HELP).await;
                Ok(())
            }
            Command::EliteOn => {
                self.set_mode(turn, Mode::Elite, "Elite mode ON. No more games. 😠")
                    .await
            }
            Command::EliteOff => {
                self.set_mode(turn, Mode::Normal, "Elite mode OFF. Standard procedure. 💪")
                    .await
            }
            Command::Cancel => {
                let text = match self.sessions.clear(turn.user) {
                    Some(session) => {
                        tracing::debug!(user = %turn.user, stage = session.stage.name(), "cancelled");
                        "Cancelled."
                    }
                    None => "Nothing to cancel.",
                };
                self.reply(turn, text).await;
                Ok(())
            }
            Command::Users => self.recent_users(turn).await,
            Command::Stats => self.stats(turn).await,
            Command::Broadcast => self.begin_broadcast(turn).await,
        }
    }

    async fn on_button(&self, turn: &Turn<'_>, action: &Action) -> Result<(), EngineError> {
        tracing::debug!(user = %turn.user, %action, "handling button");
        match action {
            Action::SwearOath => self.oath_sworn(turn).await,
            Action::Run(command) => self.on_command(turn, *command).await,
            Action::AdminPanel => self.admin_panel(turn).await,
            Action::HabitType(choice) => self.habit_type_button(turn, *choice).await,
            Action::Checkin { habit, done } => self.checkin_button(turn, habit, *done).await,
            Action::Relapse(addiction) => self.relapse(turn, addiction).await,
            Action::DayVerdict { won } => self.day_verdict(turn, *won).await,
        }
    }

    async fn start(&self, turn: &Turn<'_>) -> Result<(), EngineError> {
        let user = self.load(turn).await?;
        if self.is_admin(turn.user) {
            self.send(
                Outbound::send(turn.user, "Welcome back, admin. How do you want to proceed?")
                    .with_keyboard(Keyboard::admin_or_user()),
            )
            .await;
            return Ok(());
        }

        let text = self.generate(&prompts::oath(), user.mode).await;
        self.send(Outbound::send(turn.user, text).with_keyboard(Keyboard::oath()))
            .await;
        Ok(())
    }

    async fn oath_sworn(&self, turn: &Turn<'_>) -> Result<(), EngineError> {
        let user = self.load(turn).await?;
        let text = self.generate(&prompts::oath_sworn(), user.mode).await;
        self.send(Outbound::edit(turn.user, text)).await;
        self.send(
            Outbound::send(turn.user, "Your toolkit is below. Use it daily.")
                .with_keyboard(Keyboard::toolkit()),
        )
        .await;
        Ok(())
    }

    async fn motivate(&self, turn: &Turn<'_>) -> Result<(), EngineError> {
        let mut user = self.load(turn).await?;
        apply_score_event(&mut user, ScoreEvent::Motivation, turn.today);
        self.save(&user).await?;
        let text = self.generate(&prompts::motivation(), user.mode).await;
        self.reply(turn, text).await;
        Ok(())
    }

    async fn why(&self, turn: &Turn<'_>) -> Result<(), EngineError> {
        let user = self.load(turn).await?;
        if user.addictions.is_empty() {
            self.reply(turn, "You haven't logged an addiction. Use /addaddiction.")
                .await;
            return Ok(());
        }
        let text = self
            .generate(&prompts::reasons(&user.addictions), user.mode)
            .await;
        self.reply(turn, text).await;
        Ok(())
    }

    async fn set_mode(&self, turn: &Turn<'_>, mode: Mode, text: &str) -> Result<(), EngineError> {
        let mut user = self.load(turn).await?;
        user.mode = mode;
        self.save(&user).await?;
        self.reply(turn, text).await;
        Ok(())
    }

    /// Enters the first stage of a flow.
    async fn begin(&self, turn: &Turn<'_>, stage: Stage, prompt: &str) -> Result<(), EngineError> {
        // Registers the user on first contact.
        self.load(turn).await?;
        self.set_stage(turn, stage);
        self.reply(turn, prompt).await;
        Ok(())
    }

    fn is_admin(&self, user: &UserId) -> bool {
        self.config.admin.as_ref() == Some(user)
    }

    async fn load(&self, turn: &Turn<'_>) -> Result<User, EngineError> {
        self.repository
            .load_user(turn.user, turn.display_name, turn.username)
            .await
            .map_err(|source| EngineError::Load {
                user: turn.user.clone(),
                source,
            })
    }

    async fn save(&self, user: &User) -> Result<(), EngineError> {
        self.repository
            .save_user(user)
            .await
            .map_err(|source| EngineError::Save {
                user: user.id.clone(),
                source,
            })
    }

    async fn list_users(&self) -> Result<Vec<User>, EngineError> {
        self.repository
            .list_users()
            .await
            .map_err(EngineError::ListUsers)
    }

    /// The live stage, marking the session active as of this turn.
    fn current_stage(&self, turn: &Turn<'_>) -> Option<Stage> {
        self.sessions
            .touch(turn.user, turn.now)
            .map(|session| session.stage)
    }

    fn set_stage(&self, turn: &Turn<'_>, stage: Stage) {
        tracing::debug!(user = %turn.user, stage = stage.name(), "entering stage");
        self.sessions.set(turn.user, Session::new(stage, turn.now));
    }

    fn clear_stage(&self, turn: &Turn<'_>) {
        self.sessions.clear(turn.user);
    }

    /// Generated text, or the fixed fallback if the generator fails.
    async fn generate(&self, prompt: &[PromptMessage], mode: Mode) -> String {
        match self.generator.generate(prompt, mode).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!("generator returned empty text; using fallback");
                FALLBACK_TEXT.to_string()
            }
            Err(err) => {
                tracing::warn!(error = %err, "generation failed; using fallback");
                FALLBACK_TEXT.to_string()
            }
        }
    }

    /// Delivers a message. Failures are logged, never propagated.
    async fn send(&self, message: Outbound) {
        if let Err(err) = self.transport.deliver(&message).await {
            tracing::warn!(user = %message.user, error = %err, "failed to deliver message");
        }
    }

    async fn reply(&self, turn: &Turn<'_>, text: impl Into<String>) {
        self.send(Outbound::new(turn.user, Delivery::Send, text))
            .await;
    }
}
