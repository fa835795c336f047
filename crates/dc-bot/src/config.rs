//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use chrono::NaiveTime;
use chrono_tz::Tz;
use dc_core::UserId;
use dc_engine::{DEFAULT_SESSION_TIMEOUT_SECS, ProactiveJob};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// IANA zone that defines the calendar day and the schedule.
    pub timezone: String,
    /// The single chat user allowed into the admin panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_user_id: Option<String>,
    /// Inactivity after which a pending dialogue is forgotten.
    pub session_timeout_secs: u64,
    pub llm: LlmConfig,
    pub schedule: ScheduleConfig,
}

/// Text generator settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key; without one every generated message is the fallback text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

/// Local `HH:MM` trigger times for the proactive jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub daily_motivation: String,
    pub evening_checkin: String,
    pub goal_reminder: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("timezone", &self.timezone)
            .field("admin_user_id", &self.admin_user_id)
            .field("session_timeout_secs", &self.session_timeout_secs)
            .field("llm", &self.llm)
            .field("schedule", &self.schedule)
            .finish()
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("discipline.db"),
            timezone: host_timezone(),
            admin_user_id: None,
            session_timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS.unsigned_abs(),
            llm: LlmConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: dc_llm::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_motivation: "06:00".to_string(),
            evening_checkin: "21:00".to_string(),
            goal_reminder: "09:00".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations, then `config_path` if given.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> std::result::Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // DC_LLM__API_KEY -> llm.api_key
        figment = figment.merge(Env::prefixed("DC_").split("__"));

        figment.extract()
    }

    /// The configured zone, parsed.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| anyhow!("unknown timezone: {}", self.timezone))
    }

    /// The administrator, if one is configured and the id is non-empty.
    pub fn admin(&self) -> Option<UserId> {
        self.admin_user_id
            .as_deref()
            .and_then(|id| UserId::new(id).ok())
    }
}

impl ScheduleConfig {
    /// Every job paired with its parsed trigger time.
    pub fn entries(&self) -> Result<Vec<(ProactiveJob, NaiveTime)>> {
        ProactiveJob::ALL
            .into_iter()
            .map(|job| {
                let raw = match job {
                    ProactiveJob::DailyMotivation => &self.daily_motivation,
                    ProactiveJob::EveningCheckin => &self.evening_checkin,
                    ProactiveJob::GoalReminder => &self.goal_reminder,
                };
                NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                    .map(|at| (job, at))
                    .map_err(|_| anyhow!("invalid time for {job}: {raw:?} (expected HH:MM)"))
            })
            .collect()
    }
}

/// The host's zone name, or UTC if it cannot be determined.
fn host_timezone() -> String {
    iana_time_zone::get_timezone()
        .ok()
        .filter(|name| name.parse::<Tz>().is_ok())
        .unwrap_or_else(|| "UTC".to_string())
}

/// Returns the platform-specific config directory for discipline.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("discipline"))
}

/// Returns the platform-specific data directory for discipline.
///
/// On Linux: `~/.local/share/discipline`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("discipline"))
}
