//! Normalized inbound events: commands, button actions and text.
//!
//! Transports map their own envelopes onto [`Inbound`]. Button payloads travel
//! as compact tokens (`checkin_yes_<habit>`, `relapse_<addiction>`, ...) and are
//! parsed into the [`Action`] variant here, so dispatch is an exhaustive match.

use std::fmt;
use std::str::FromStr;

use dc_core::{AddictionId, HabitId, UserId};

/// Named entry points, mapped from transport commands or menu buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Motivate,
    AddHabit,
    AddAddiction,
    Progress,
    Journal,
    Goal,
    Relapse,
    Checkin,
    Why,
    Score,
    Leaderboard,
    Toolkit,
    Help,
    EliteOn,
    EliteOff,
    Cancel,
    // Administrator only.
    Users,
    Stats,
    Broadcast,
}

impl Command {
    pub const ALL: [Self; 20] = [
        Self::Start,
        Self::Motivate,
        Self::AddHabit,
        Self::AddAddiction,
        Self::Progress,
        Self::Journal,
        Self::Goal,
        Self::Relapse,
        Self::Checkin,
        Self::Why,
        Self::Score,
        Self::Leaderboard,
        Self::Toolkit,
        Self::Help,
        Self::EliteOn,
        Self::EliteOff,
        Self::Cancel,
        Self::Users,
        Self::Stats,
        Self::Broadcast,
    ];

    /// Canonical command name, without the leading slash.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Motivate => "motivate",
            Self::AddHabit => "addhabit",
            Self::AddAddiction => "addaddiction",
            Self::Progress => "progress",
            Self::Journal => "journal",
            Self::Goal => "goal",
            Self::Relapse => "relapse",
            Self::Checkin => "checkin",
            Self::Why => "why",
            Self::Score => "score",
            Self::Leaderboard => "leaderboard",
            Self::Toolkit => "toolkit",
            Self::Help => "help",
            Self::EliteOn => "eliteon",
            Self::EliteOff => "eliteoff",
            Self::Cancel => "cancel",
            Self::Users => "users",
            Self::Stats => "stats",
            Self::Broadcast => "broadcast",
        }
    }

    /// Whether only the designated administrator may run this command.
    #[must_use]
    pub const fn is_admin_only(&self) -> bool {
        matches!(self, Self::Users | Self::Stats | Self::Broadcast)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.as_str())
    }
}

/// Error type for unknown command names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command: {}", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

impl FromStr for Command {
    type Err = UnknownCommand;

    /// Accepts `start`, `/start` and `/start@some_bot`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('/');
        let name = name.split('@').next().unwrap_or(name).to_lowercase();
        let name = match name.as_str() {
            "add_habit" => "addhabit",
            "add_addiction" => "addaddiction",
            "check_in" => "checkin",
            "elite_on" => "eliteon",
            "elite_off" => "eliteoff",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|command| command.as_str() == name)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

/// How a new habit is tracked, as chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HabitTypeChoice {
    Binary,
    Quantitative,
}

impl HabitTypeChoice {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Quantitative => "quantitative",
        }
    }

    /// Parses a typed keyword.
    pub fn from_keyword(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "binary" | "done" | "yes/no" => Some(Self::Binary),
            "quantitative" | "number" => Some(Self::Quantitative),
            _ => None,
        }
    }
}

/// A button press.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// New user swears the oath.
    SwearOath,
    /// Menu shortcut for a command.
    Run(Command),
    /// Administrator panel.
    AdminPanel,
    /// Tracking type for the habit being created.
    HabitType(HabitTypeChoice),
    /// Binary check-in answer for one habit.
    Checkin { habit: HabitId, done: bool },
    /// Relapse on one addiction.
    Relapse(AddictionId),
    /// Evening verdict on the whole day.
    DayVerdict { won: bool },
}

/// Error type for unparseable button tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action: {}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SwearOath => write!(f, "swear"),
            Self::Run(command) => write!(f, "cmd_{}", command.as_str()),
            Self::AdminPanel => write!(f, "admin_panel"),
            Self::HabitType(choice) => write!(f, "habit_type_{}", choice.as_str()),
            Self::Checkin { habit, done: true } => write!(f, "checkin_yes_{habit}"),
            Self::Checkin { habit, done: false } => write!(f, "checkin_no_{habit}"),
            Self::Relapse(addiction) => write!(f, "relapse_{addiction}"),
            Self::DayVerdict { won: true } => write!(f, "verdict_won"),
            Self::DayVerdict { won: false } => write!(f, "verdict_lost"),
        }
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownAction(s.to_string());
        match s {
            "swear" => return Ok(Self::SwearOath),
            "admin_panel" => return Ok(Self::AdminPanel),
            "habit_type_binary" => return Ok(Self::HabitType(HabitTypeChoice::Binary)),
            "habit_type_quantitative" => {
                return Ok(Self::HabitType(HabitTypeChoice::Quantitative));
            }
            "verdict_won" => return Ok(Self::DayVerdict { won: true }),
            "verdict_lost" => return Ok(Self::DayVerdict { won: false }),
            _ => {}
        }

        if let Some(name) = s.strip_prefix("cmd_") {
            return name.parse().map(Self::Run).map_err(|_| unknown());
        }
        if let Some(id) = s.strip_prefix("checkin_yes_") {
            let habit = HabitId::new(id).map_err(|_| unknown())?;
            return Ok(Self::Checkin { habit, done: true });
        }
        if let Some(id) = s.strip_prefix("checkin_no_") {
            let habit = HabitId::new(id).map_err(|_| unknown())?;
            return Ok(Self::Checkin { habit, done: false });
        }
        if let Some(id) = s.strip_prefix("relapse_") {
            return AddictionId::new(id)
                .map(Self::Relapse)
                .map_err(|_| unknown());
        }
        Err(unknown())
    }
}

/// What the user sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Command(Command),
    Button(Action),
    /// Media reference; only meaningful to administrative media flows.
    Media(String),
}

impl Input {
    /// Interprets a line of chat text: known `/commands` become commands.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with('/') {
            let head = trimmed.split_whitespace().next().unwrap_or(trimmed);
            if let Ok(command) = head.parse() {
                return Self::Command(command);
            }
        }
        Self::Text(text.to_string())
    }

    /// Parses a button token.
    pub fn from_token(token: &str) -> Result<Self, UnknownAction> {
        token.trim().parse().map(Self::Button)
    }
}

/// One inbound event from one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub user: UserId,
    /// Name shown by the transport; used when registering a new user.
    pub display_name: String,
    /// Public handle, when the transport knows one.
    pub username: Option<String>,
    pub input: Input,
}

impl Inbound {
    pub fn new(user: UserId, display_name: impl Into<String>, input: Input) -> Self {
        Self {
            user,
            display_name: display_name.into(),
            username: None,
            input,
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}
