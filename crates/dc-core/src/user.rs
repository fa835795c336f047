//! The user aggregate and the records it owns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{AddictionId, HabitId, Mode, Unit, UserId, ValidationError, non_empty};

/// How a habit is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HabitKind {
    /// Done or not done.
    Binary,
    /// A daily count in some unit.
    Quantitative { unit: Unit },
}

impl HabitKind {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Quantitative { .. } => "quantitative",
        }
    }

    /// Rebuilds a kind from its stored tag and optional unit.
    pub fn from_parts(kind: &str, unit: Option<&str>) -> Result<Self, ValidationError> {
        match kind {
            "binary" => Ok(Self::Binary),
            "quantitative" => Ok(Self::Quantitative {
                unit: Unit::new(unit.unwrap_or_default())?,
            }),
            _ => Err(ValidationError::InvalidHabitKind {
                value: kind.to_string(),
            }),
        }
    }

    /// The unit, if quantitative.
    pub const fn unit(&self) -> Option<&Unit> {
        match self {
            Self::Binary => None,
            Self::Quantitative { unit } => Some(unit),
        }
    }
}

/// A tracked habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub kind: HabitKind,
    pub streak: u32,
    /// Last reported value: 1 for a binary "yes", the count for quantitative, else 0.
    pub progress: u32,
}

/// An addiction the user is quitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addiction {
    pub id: AddictionId,
    pub name: String,
    /// The user's stated reason for quitting.
    pub why: String,
    pub streak: u32,
    /// Day of the last counted clean day, so a day is counted at most once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_clean_day: Option<NaiveDate>,
}

/// A bot user and everything they track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub focus_score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_interaction_day: Option<NaiveDate>,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub addictions: Vec<Addiction>,
}

impl User {
    /// Creates a user with default settings and nothing tracked.
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            "User".to_string()
        } else {
            name.trim().to_string()
        };
        Self {
            id,
            name,
            username: None,
            mode: Mode::Normal,
            focus_score: 0,
            last_interaction_day: None,
            habits: Vec::new(),
            addictions: Vec::new(),
        }
    }

    /// Appends a habit and returns its freshly assigned ID.
    pub fn add_habit(&mut self, name: &str, kind: HabitKind) -> Result<HabitId, ValidationError> {
        let name = non_empty("habit name", name)?;
        let mut id = HabitId::generate();
        while self.habit(&id).is_some() {
            id = HabitId::generate();
        }
        self.habits.push(Habit {
            id: id.clone(),
            name,
            kind,
            streak: 0,
            progress: 0,
        });
        Ok(id)
    }

    /// Appends an addiction and returns its freshly assigned ID.
    pub fn add_addiction(&mut self, name: &str, why: &str) -> Result<AddictionId, ValidationError> {
        let name = non_empty("addiction name", name)?;
        let why = non_empty("reason", why)?;
        let mut id = AddictionId::generate();
        while self.addiction(&id).is_some() {
            id = AddictionId::generate();
        }
        self.addictions.push(Addiction {
            id: id.clone(),
            name,
            why,
            streak: 0,
            last_clean_day: None,
        });
        Ok(id)
    }

    pub fn habit(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| &habit.id == id)
    }

    pub fn habit_mut(&mut self, id: &HabitId) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|habit| &habit.id == id)
    }

    pub fn addiction(&self, id: &AddictionId) -> Option<&Addiction> {
        self.addictions.iter().find(|addiction| &addiction.id == id)
    }

    pub fn addiction_mut(&mut self, id: &AddictionId) -> Option<&mut Addiction> {
        self.addictions
            .iter_mut()
            .find(|addiction| &addiction.id == id)
    }

    /// Habit IDs in their stable input order.
    pub fn habit_ids(&self) -> Vec<HabitId> {
        self.habits.iter().map(|habit| habit.id.clone()).collect()
    }

    /// Whether the user tracks anything at all.
    pub fn tracks_anything(&self) -> bool {
        !self.habits.is_empty() || !self.addictions.is_empty()
    }

    /// Highest streak across habits and addictions, 0 if none.
    pub fn best_streak(&self) -> u32 {
        self.habits
            .iter()
            .map(|habit| habit.streak)
            .chain(self.addictions.iter().map(|addiction| addiction.streak))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(UserId::new("1").unwrap(), "Sami")
    }

    #[test]
    fn new_user_has_defaults() {
        let user = User::new(UserId::new("7").unwrap(), "  ");
        assert_eq!(user.name, "User");
        assert_eq!(user.mode, Mode::Normal);
        assert_eq!(user.focus_score, 0);
        assert!(user.last_interaction_day.is_none());
        assert!(!user.tracks_anything());
    }

    #[test]
    fn add_habit_assigns_unique_ids() {
        let mut user = user();
        let a = user.add_habit("Read", HabitKind::Binary).unwrap();
        let b = user.add_habit("Run", HabitKind::Binary).unwrap();
        assert_ne!(a, b);
        assert_eq!(user.habit(&a).unwrap().name, "Read");
        assert_eq!(user.habit_ids(), vec![a, b]);
    }

    #[test]
    fn add_habit_rejects_blank_name() {
        let mut user = user();
        assert!(user.add_habit("   ", HabitKind::Binary).is_err());
        assert!(user.habits.is_empty());
    }

    #[test]
    fn add_addiction_requires_reason() {
        let mut user = user();
        assert!(user.add_addiction("Sugar", " ").is_err());
        let id = user.add_addiction("Sugar", "energy").unwrap();
        assert_eq!(user.addiction(&id).unwrap().why, "energy");
    }

    #[test]
    fn habit_kind_from_parts_requires_unit() {
        assert_eq!(
            HabitKind::from_parts("binary", None).unwrap(),
            HabitKind::Binary
        );
        assert!(HabitKind::from_parts("quantitative", Some("")).is_err());
        assert_eq!(
            HabitKind::from_parts("quantitative", Some("km"))
                .unwrap()
                .unit()
                .map(Unit::as_str),
            Some("km")
        );
        assert!(HabitKind::from_parts("sometimes", None).is_err());
    }

    #[test]
    fn best_streak_spans_habits_and_addictions() {
        let mut user = user();
        assert_eq!(user.best_streak(), 0);
        let habit = user.add_habit("Read", HabitKind::Binary).unwrap();
        let addiction = user.add_addiction("Sugar", "energy").unwrap();
        user.habit_mut(&habit).unwrap().streak = 3;
        user.addiction_mut(&addiction).unwrap().streak = 9;
        assert_eq!(user.best_streak(), 9);
    }
}
