//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Length of generated habit and addiction identifiers.
const SHORT_ID_LEN: usize = 8;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty or whitespace-only.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Invalid mode value.
    #[error("invalid mode: {value}")]
    InvalidMode { value: String },

    /// Invalid habit kind value.
    #[error("invalid habit kind: {value}")]
    InvalidHabitKind { value: String },

    /// Invalid goal status value.
    #[error("invalid goal status: {value}")]
    InvalidGoalStatus { value: String },
}

/// Trims `value` and rejects it if nothing is left.
pub fn non_empty(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_string())
}

/// Tone of generated text for a user.
///
/// Only affects the text generator's system prompt, never dialogue behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Normal,
    Elite,
}

impl Mode {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Elite => "elite",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "elite" => Ok(Self::Elite),
            _ => Err(ValidationError::InvalidMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

define_string_id!(
    /// A validated user identifier.
    ///
    /// Opaque and stable; assigned by the messaging transport.
    UserId, "user ID"
);

define_string_id!(
    /// A validated habit identifier, unique within its owning user.
    HabitId, "habit ID"
);

define_string_id!(
    /// A validated addiction identifier, unique within its owning user.
    AddictionId, "addiction ID"
);

define_string_id!(
    /// A validated goal identifier.
    GoalId, "goal ID"
);

define_string_id!(
    /// A validated unit of measurement for a quantitative habit (e.g. "km").
    Unit, "unit"
);

/// Returns a short random identifier suitable for button tokens.
pub(crate) fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}

impl HabitId {
    /// Generates a fresh random habit ID.
    pub fn generate() -> Self {
        Self(short_id())
    }
}

impl AddictionId {
    /// Generates a fresh random addiction ID.
    pub fn generate() -> Self {
        Self(short_id())
    }
}

impl GoalId {
    /// Generates a fresh random goal ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
