//! Goals and target-date parsing.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{GoalId, UserId, ValidationError};

/// Pre-compiled regex for relative target dates ("in 3 weeks", "10 days").
static RELATIVE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:in\s+)?(\d{1,4})\s*(day|week|month)s?$").unwrap()
});

/// Absolute formats accepted for a target date.
const ABSOLUTE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Lifecycle of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
}

impl GoalStatus {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(ValidationError::InvalidGoalStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// A goal with a target date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub description: String,
    pub target_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub status: GoalStatus,
}

impl Goal {
    /// Creates an active goal.
    pub fn new(
        user_id: UserId,
        description: impl Into<String>,
        target_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: GoalId::generate(),
            user_id,
            description: description.into(),
            target_date,
            created_at,
            status: GoalStatus::Active,
        }
    }

    /// Days from `today` until the target date; negative once it has passed.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.target_date - today).num_days()
    }
}

/// Parses a target date relative to `today`.
///
/// Supports:
/// - Keywords: "today", "tomorrow", "next week", "next month"
/// - Relative: "in 3 days", "2 weeks", "in 6 months"
/// - Absolute: "2026-01-15", "15.01.2026", "15/01/2026", "January 15 2026", "15 Jan 2026"
///
/// Dates before `today` are rejected.
pub fn parse_target_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let normalized = text.trim().to_lowercase();
    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return None;
    }

    let date = match normalized.as_str() {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "next week" => today.checked_add_days(Days::new(7)),
        "next month" => today.checked_add_months(Months::new(1)),
        _ => parse_relative(&normalized, today).or_else(|| parse_absolute(&normalized)),
    }?;

    (date >= today).then_some(date)
}

fn parse_relative(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = RELATIVE_DATE_RE.captures(text)?;
    let n: u32 = caps[1].parse().ok()?;
    match &caps[2] {
        "day" => today.checked_add_days(Days::new(u64::from(n))),
        "week" => today.checked_add_days(Days::new(u64::from(n) * 7)),
        "month" => today.checked_add_months(Months::new(n)),
        _ => None,
    }
}

fn parse_absolute(text: &str) -> Option<NaiveDate> {
    ABSOLUTE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}
