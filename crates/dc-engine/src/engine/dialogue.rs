//! Free-text steps of the multi-step flows.

use dc_core::types::non_empty;
use dc_core::{
    Goal, HabitKind, JournalEntry, ScoreEvent, Unit, apply_score_event, parse_target_date,
};

use super::{Engine, Turn};
use crate::action::HabitTypeChoice;
use crate::error::EngineError;
use crate::outbound::{Delivery, Keyboard, Outbound};
use crate::prompts;
use crate::render;
use crate::session::Stage;

const EMPTY_INPUT: &str = "That can't be empty. Try again, or /cancel.";

impl Engine {
    pub(super) async fn on_text(&self, turn: &Turn<'_>, text: &str) -> Result<(), EngineError> {
        let Some(stage) = self.current_stage(turn) else {
            tracing::debug!(user = %turn.user, "ignoring text outside a flow");
            return Ok(());
        };
        tracing::debug!(user = %turn.user, stage = stage.name(), "handling text");

        match stage {
            Stage::AwaitingHabitName => {
                let Ok(name) = non_empty("habit name", text) else {
                    self.reply(turn, EMPTY_INPUT).await;
                    return Ok(());
                };
                let prompt = format!("How do you track \"{name}\"?");
                self.set_stage(turn, Stage::AwaitingHabitType { name });
                self.send(Outbound::send(turn.user, prompt).with_keyboard(Keyboard::habit_type()))
                    .await;
                Ok(())
            }
            Stage::AwaitingHabitType { name } => {
                let Some(choice) = HabitTypeChoice::from_keyword(text) else {
                    self.send(
                        Outbound::send(turn.user, "Pick one: done/not done, or a number.")
                            .with_keyboard(Keyboard::habit_type()),
                    )
                    .await;
                    return Ok(());
                };
                self.apply_habit_type(turn, name, choice, Delivery::Send)
                    .await
            }
            Stage::AwaitingHabitUnit { name } => {
                let Ok(unit) = Unit::new(text.trim()) else {
                    self.reply(turn, EMPTY_INPUT).await;
                    return Ok(());
                };
                self.create_habit(turn, &name, HabitKind::Quantitative { unit }, Delivery::Send)
                    .await
            }
            Stage::AwaitingAddictionName => {
                let Ok(name) = non_empty("addiction name", text) else {
                    self.reply(turn, EMPTY_INPUT).await;
                    return Ok(());
                };
                let prompt = format!("Why are you quitting \"{name}\"? This is your anchor.");
                self.set_stage(turn, Stage::AwaitingAddictionReason { name });
                self.reply(turn, prompt).await;
                Ok(())
            }
            Stage::AwaitingAddictionReason { name } => self.create_addiction(turn, &name, text).await,
            Stage::AwaitingJournalEntry => self.record_journal(turn, text).await,
            Stage::AwaitingGoalDescription => {
                let Ok(description) = non_empty("goal", text) else {
                    self.reply(turn, EMPTY_INPUT).await;
                    return Ok(());
                };
                self.set_stage(turn, Stage::AwaitingGoalDate { description });
                self.reply(
                    turn,
                    "📅 Deadline? For example 2025-12-31, 31.12.2025, \"in 3 weeks\" or \"next month\".",
                )
                .await;
                Ok(())
            }
            Stage::AwaitingGoalDate { description } => {
                self.create_goal(turn, &description, text).await
            }
            Stage::AwaitingCheckinBinary(_) => {
                self.reply(turn, "Answer with the ✅ / ❌ buttons above.")
                    .await;
                Ok(())
            }
            Stage::AwaitingCheckinQuantitative(queue) => {
                self.checkin_amount(turn, queue, text).await
            }
            Stage::AwaitingBroadcast => self.broadcast(turn, text).await,
        }
    }

    pub(super) async fn habit_type_button(
        &self,
        turn: &Turn<'_>,
        choice: HabitTypeChoice,
    ) -> Result<(), EngineError> {
        let Some(Stage::AwaitingHabitType { name }) = self.current_stage(turn) else {
            tracing::debug!(user = %turn.user, "ignoring stale habit type button");
            return Ok(());
        };
        self.apply_habit_type(turn, name, choice, Delivery::Edit)
            .await
    }

    async fn apply_habit_type(
        &self,
        turn: &Turn<'_>,
        name: String,
        choice: HabitTypeChoice,
        delivery: Delivery,
    ) -> Result<(), EngineError> {
        match choice {
            HabitTypeChoice::Binary => {
                self.create_habit(turn, &name, HabitKind::Binary, delivery)
                    .await
            }
            HabitTypeChoice::Quantitative => {
                let prompt =
                    format!("What unit is \"{name}\" measured in? (pages, km, minutes...)");
                self.set_stage(turn, Stage::AwaitingHabitUnit { name });
                self.send(Outbound::new(turn.user, delivery, prompt)).await;
                Ok(())
            }
        }
    }

    async fn create_habit(
        &self,
        turn: &Turn<'_>,
        name: &str,
        kind: HabitKind,
        delivery: Delivery,
    ) -> Result<(), EngineError> {
        let mut user = self.load(turn).await?;
        if let Err(err) = user.add_habit(name, kind.clone()) {
            tracing::warn!(user = %turn.user, error = %err, "rejected habit");
            self.clear_stage(turn);
            return Ok(());
        }
        apply_score_event(&mut user, ScoreEvent::HabitCreated, turn.today);
        self.save(&user).await?;
        self.clear_stage(turn);

        let text = match &kind {
            HabitKind::Binary => {
                format!("✅ Habit \"{name}\" set, tracked as done or not done. Now execute.")
            }
            HabitKind::Quantitative { unit } => {
                self.generate(&prompts::habit_created(name, unit), user.mode)
                    .await
            }
        };
        self.send(Outbound::new(turn.user, delivery, text).with_keyboard(Keyboard::toolkit()))
            .await;
        Ok(())
    }

    async fn create_addiction(
        &self,
        turn: &Turn<'_>,
        name: &str,
        why: &str,
    ) -> Result<(), EngineError> {
        let mut user = self.load(turn).await?;
        if user.add_addiction(name, why).is_err() {
            self.reply(turn, EMPTY_INPUT).await;
            return Ok(());
        }
        apply_score_event(&mut user, ScoreEvent::AddictionCreated, turn.today);
        self.save(&user).await?;
        self.clear_stage(turn);

        let text = self
            .generate(&prompts::addiction_created(name, why.trim()), user.mode)
            .await;
        self.send(Outbound::send(turn.user, text).with_keyboard(Keyboard::toolkit()))
            .await;
        Ok(())
    }

    async fn record_journal(&self, turn: &Turn<'_>, text: &str) -> Result<(), EngineError> {
        let Ok(entry) = JournalEntry::new(turn.user.clone(), text, turn.now) else {
            self.reply(turn, EMPTY_INPUT).await;
            return Ok(());
        };
        let mut user = self.load(turn).await?;
        apply_score_event(&mut user, ScoreEvent::JournalEntry, turn.today);
        self.repository
            .record_journal(&user, &entry)
            .await
            .map_err(|source| EngineError::Journal {
                user: turn.user.clone(),
                source,
            })?;
        self.clear_stage(turn);

        self.reply(turn, "📝 Entry saved. Reviewing it...").await;
        let review = self
            .generate(&prompts::journal_review(&entry.content), user.mode)
            .await;
        self.send(Outbound::send(turn.user, review).with_keyboard(Keyboard::toolkit()))
            .await;
        Ok(())
    }

    async fn create_goal(
        &self,
        turn: &Turn<'_>,
        description: &str,
        text: &str,
    ) -> Result<(), EngineError> {
        let Some(target_date) = parse_target_date(text, turn.today) else {
            self.reply(
                turn,
                "I can't read that date, or it's in the past. Try 2025-12-31 or \"in 2 weeks\".",
            )
            .await;
            return Ok(());
        };
        // Registers the user before the goal references them.
        self.load(turn).await?;
        let goal = Goal::new(turn.user.clone(), description, target_date, turn.now);
        self.repository
            .insert_goal(&goal)
            .await
            .map_err(|source| EngineError::Goal {
                user: turn.user.clone(),
                source,
            })?;
        self.clear_stage(turn);
        self.reply(turn, render::goal_locked(&goal, turn.today))
            .await;
        Ok(())
    }
}
