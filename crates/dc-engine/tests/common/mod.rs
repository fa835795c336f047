//! Shared fakes for engine integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dc_core::{Goal, JournalEntry, Mode, User, UserId};
use dc_engine::{
    Command, Engine, EngineConfig, Inbound, Input, MemoryRepository, MemorySessionStore, Outbound,
    PortError, PromptMessage, SessionStore, Stage, TextGenerator, Transport, UserRepository,
};

pub fn uid(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

/// Noon UTC on the given day of March 2025.
pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, d, 12, 0, 0).unwrap()
}

/// Records every delivered message; can be told to reject some recipients.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Outbound>>,
    rejected: Mutex<HashSet<UserId>>,
}

impl RecordingTransport {
    pub fn reject(&self, user: &UserId) {
        self.rejected.lock().unwrap().insert(user.clone());
    }

    /// Drains everything sent so far.
    pub fn take(&self) -> Vec<Outbound> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn deliver(&self, message: &Outbound) -> Result<(), PortError> {
        if self.rejected.lock().unwrap().contains(&message.user) {
            return Err(PortError::delivery("recipient blocked the bot"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Echoes the mode so tests can see which tone was requested.
#[derive(Default)]
pub struct ScriptedGenerator {
    down: AtomicBool,
    prompts: Mutex<Vec<(Vec<PromptMessage>, Mode)>>,
}

impl ScriptedGenerator {
    pub fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_mode(&self) -> Option<Mode> {
        self.prompts.lock().unwrap().last().map(|(_, mode)| *mode)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &[PromptMessage], mode: Mode) -> Result<String, PortError> {
        self.prompts.lock().unwrap().push((prompt.to_vec(), mode));
        if self.down.load(Ordering::SeqCst) {
            return Err(PortError::generation("upstream timed out"));
        }
        Ok(format!("[{mode}] generated"))
    }
}

/// Memory repository whose writes can be made to fail.
#[derive(Default)]
pub struct FlakyRepository {
    pub inner: MemoryRepository,
    failing: AtomicBool,
    failing_user_writes: AtomicBool,
}

impl FlakyRepository {
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Fails only writes that store the user row.
    pub fn fail_user_writes(&self, failing: bool) {
        self.failing_user_writes.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), PortError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::storage("disk full"));
        }
        Ok(())
    }

    fn check_user_write(&self) -> Result<(), PortError> {
        self.check()?;
        if self.failing_user_writes.load(Ordering::SeqCst) {
            return Err(PortError::storage("users table locked"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FlakyRepository {
    async fn load_user(
        &self,
        id: &UserId,
        display_name: &str,
        username: Option<&str>,
    ) -> Result<User, PortError> {
        self.inner.load_user(id, display_name, username).await
    }

    async fn save_user(&self, user: &User) -> Result<(), PortError> {
        self.check_user_write()?;
        self.inner.save_user(user).await
    }

    async fn list_users(&self) -> Result<Vec<User>, PortError> {
        self.inner.list_users().await
    }

    async fn record_journal(&self, user: &User, entry: &JournalEntry) -> Result<(), PortError> {
        self.check_user_write()?;
        self.inner.record_journal(user, entry).await
    }

    async fn insert_goal(&self, goal: &Goal) -> Result<(), PortError> {
        self.check()?;
        self.inner.insert_goal(goal).await
    }

    async fn list_active_goals(&self) -> Result<Vec<Goal>, PortError> {
        self.inner.list_active_goals().await
    }
}

pub struct Harness {
    pub engine: Engine,
    pub repo: Arc<FlakyRepository>,
    pub transport: Arc<RecordingTransport>,
    pub generator: Arc<ScriptedGenerator>,
    pub sessions: Arc<MemorySessionStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_admin(admin: &str) -> Self {
        Self::with_config(EngineConfig {
            admin: Some(uid(admin)),
            ..EngineConfig::default()
        })
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::build(FlakyRepository::default(), config)
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self::build(
            FlakyRepository {
                inner: MemoryRepository::with_users(users),
                ..FlakyRepository::default()
            },
            EngineConfig::default(),
        )
    }

    fn build(repo: FlakyRepository, config: EngineConfig) -> Self {
        let repo = Arc::new(repo);
        let transport = Arc::new(RecordingTransport::default());
        let generator = Arc::new(ScriptedGenerator::default());
        let sessions = Arc::new(MemorySessionStore::default());
        let engine = Engine::new(
            repo.clone(),
            generator.clone(),
            transport.clone(),
            sessions.clone(),
            config,
        );
        Self {
            engine,
            repo,
            transport,
            generator,
            sessions,
        }
    }

    pub async fn command(&self, user: &str, command: Command, now: DateTime<Utc>) {
        self.input(user, Input::Command(command), now).await;
    }

    pub async fn text(&self, user: &str, text: &str, now: DateTime<Utc>) {
        self.input(user, Input::Text(text.to_string()), now).await;
    }

    pub async fn tap(&self, user: &str, token: &str, now: DateTime<Utc>) {
        self.input(user, Input::from_token(token).unwrap(), now)
            .await;
    }

    pub async fn input(&self, user: &str, input: Input, now: DateTime<Utc>) {
        self.input_as(user, None, input, now).await;
    }

    /// Sends input from a user the transport knows by `username`.
    pub async fn input_as(
        &self,
        user: &str,
        username: Option<&str>,
        input: Input,
        now: DateTime<Utc>,
    ) {
        let mut inbound = Inbound::new(uid(user), "Tester", input);
        if let Some(username) = username {
            inbound = inbound.with_username(username);
        }
        self.engine.process_at(inbound, now).await;
    }

    pub fn user(&self, id: &str) -> User {
        self.repo.inner.user(&uid(id)).unwrap()
    }

    pub fn stage(&self, id: &str, now: DateTime<Utc>) -> Option<Stage> {
        self.sessions.get(&uid(id), now).map(|session| session.stage)
    }

    /// Texts of everything sent since the last call.
    pub fn texts(&self) -> Vec<String> {
        self.transport
            .take()
            .into_iter()
            .map(|message| message.text)
            .collect()
    }

    /// Creates a binary habit through the dialogue.
    pub async fn add_binary_habit(&self, user: &str, name: &str, now: DateTime<Utc>) {
        self.command(user, Command::AddHabit, now).await;
        self.text(user, name, now).await;
        self.tap(user, "habit_type_binary", now).await;
    }

    pub async fn add_quantitative_habit(
        &self,
        user: &str,
        name: &str,
        unit: &str,
        now: DateTime<Utc>,
    ) {
        self.command(user, Command::AddHabit, now).await;
        self.text(user, name, now).await;
        self.tap(user, "habit_type_quantitative", now).await;
        self.text(user, unit, now).await;
    }

    pub async fn add_addiction(&self, user: &str, name: &str, why: &str, now: DateTime<Utc>) {
        self.command(user, Command::AddAddiction, now).await;
        self.text(user, name, now).await;
        self.text(user, why, now).await;
    }
}
