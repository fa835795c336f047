//! Outbound messages and the keyboards attached to them.

use dc_core::{Addiction, Habit, UserId};

use crate::action::{Action, Command, HabitTypeChoice};

/// A tappable button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Rows of buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub const fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    /// Oath acceptance after `/start`.
    pub fn oath() -> Self {
        Self::new(vec![vec![Button::new("⚔️ I swear", Action::SwearOath)]])
    }

    /// Administrator chooses a persona after `/start`.
    pub fn admin_or_user() -> Self {
        Self::new(vec![vec![
            Button::new("👑 Admin panel", Action::AdminPanel),
            Button::new("👤 Continue as user", Action::SwearOath),
        ]])
    }

    /// The main menu.
    pub fn toolkit() -> Self {
        let run = |label: &str, command| Button::new(label, Action::Run(command));
        Self::new(vec![
            vec![
                run("🔥 Motivate", Command::Motivate),
                run("📊 Progress", Command::Progress),
            ],
            vec![
                run("➕ Add habit", Command::AddHabit),
                run("🚫 Add addiction", Command::AddAddiction),
            ],
            vec![
                run("✅ Check-in", Command::Checkin),
                run("💔 Relapse", Command::Relapse),
            ],
            vec![
                run("📝 Journal", Command::Journal),
                run("🎯 Goal", Command::Goal),
            ],
            vec![
                run("🏆 Leaderboard", Command::Leaderboard),
                run("🎯 Score", Command::Score),
            ],
        ])
    }

    pub fn admin_panel() -> Self {
        let run = |label: &str, command| Button::new(label, Action::Run(command));
        Self::new(vec![
            vec![run("👥 Users", Command::Users), run("📈 Stats", Command::Stats)],
            vec![run("📣 Broadcast", Command::Broadcast)],
        ])
    }

    pub fn habit_type() -> Self {
        Self::new(vec![vec![
            Button::new(
                "✅ Done / not done",
                Action::HabitType(HabitTypeChoice::Binary),
            ),
            Button::new(
                "🔢 Number",
                Action::HabitType(HabitTypeChoice::Quantitative),
            ),
        ]])
    }

    /// Yes/no answer for one binary habit.
    pub fn checkin(habit: &Habit) -> Self {
        Self::new(vec![vec![
            Button::new(
                "✅ Done",
                Action::Checkin {
                    habit: habit.id.clone(),
                    done: true,
                },
            ),
            Button::new(
                "❌ Missed",
                Action::Checkin {
                    habit: habit.id.clone(),
                    done: false,
                },
            ),
        ]])
    }

    /// One row per addiction.
    pub fn relapse_picker(addictions: &[Addiction]) -> Self {
        Self::new(
            addictions
                .iter()
                .map(|addiction| {
                    vec![Button::new(
                        addiction.name.clone(),
                        Action::Relapse(addiction.id.clone()),
                    )]
                })
                .collect(),
        )
    }

    /// Evening verdict on the day.
    pub fn day_verdict() -> Self {
        Self::new(vec![vec![
            Button::new("🏆 I won", Action::DayVerdict { won: true }),
            Button::new("💀 I lost", Action::DayVerdict { won: false }),
        ]])
    }

    /// Every action on the keyboard, row by row.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.rows.iter().flatten().map(|button| &button.action)
    }
}

/// Whether a message is new or replaces the one carrying the tapped button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Send,
    Edit,
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub user: UserId,
    pub delivery: Delivery,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Outbound {
    pub fn new(user: &UserId, delivery: Delivery, text: impl Into<String>) -> Self {
        Self {
            user: user.clone(),
            delivery,
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn send(user: &UserId, text: impl Into<String>) -> Self {
        Self::new(user, Delivery::Send, text)
    }

    pub fn edit(user: &UserId, text: impl Into<String>) -> Self {
        Self::new(user, Delivery::Edit, text)
    }

    #[must_use]
    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}
