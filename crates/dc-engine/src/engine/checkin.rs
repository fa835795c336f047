//! Check-in sequencing, relapses and the evening verdict.
//!
//! A check-in walks the user's habits one at a time in their stored order.
//! Only an answer for the habit at the cursor is accepted; anything else is a
//! stale button and changes nothing.

use dc_core::{
    AddictionId, CheckinOutcome, Habit, HabitId, HabitKind, HabitReport, ScoreEvent, User,
    apply_score_event, record_checkin, record_clean_day, record_relapse, score_for_day,
};

use super::{Engine, Turn};
use crate::error::EngineError;
use crate::outbound::{Delivery, Keyboard, Outbound};
use crate::prompts;
use crate::render;
use crate::session::{CheckinQueue, Stage};

impl Engine {
    pub(super) async fn start_checkin(&self, turn: &Turn<'_>) -> Result<(), EngineError> {
        let user = self.load(turn).await?;
        self.begin_checkin(turn, &user).await;
        Ok(())
    }

    async fn begin_checkin(&self, turn: &Turn<'_>, user: &User) {
        if user.habits.is_empty() {
            self.reply(turn, "You have no habits to check in on. Add one with /addhabit.")
                .await;
            return;
        }
        self.reply(turn, "Time to report. Answer honestly.").await;
        self.ask_next(turn, user, CheckinQueue::new(user.habit_ids()))
            .await;
    }

    /// Asks about the habit at the cursor, skipping habits that no longer
    /// exist. Ends the check-in once the queue is exhausted.
    async fn ask_next(&self, turn: &Turn<'_>, user: &User, mut queue: CheckinQueue) {
        let habit = loop {
            let Some(id) = queue.current() else {
                self.clear_stage(turn);
                let score = score_for_day(user, turn.today);
                self.reply(
                    turn,
                    format!("Check-in complete. Today's focus score: {score}."),
                )
                .await;
                return;
            };
            if let Some(habit) = user.habit(id) {
                break habit;
            }
            tracing::debug!(user = %turn.user, habit = %id, "skipping missing habit");
            queue.advance();
        };

        let (position, total) = queue.position();
        let text = format!("[{position}/{total}] {}", render::checkin_question(habit));
        let message = match habit.kind {
            HabitKind::Binary => {
                self.set_stage(turn, Stage::AwaitingCheckinBinary(queue));
                Outbound::send(turn.user, text).with_keyboard(Keyboard::checkin(habit))
            }
            HabitKind::Quantitative { .. } => {
                self.set_stage(turn, Stage::AwaitingCheckinQuantitative(queue));
                Outbound::send(turn.user, text)
            }
        };
        self.send(message).await;
    }

    pub(super) async fn checkin_button(
        &self,
        turn: &Turn<'_>,
        habit: &HabitId,
        done: bool,
    ) -> Result<(), EngineError> {
        let queue = match self.current_stage(turn) {
            Some(Stage::AwaitingCheckinBinary(queue)) if queue.current() == Some(habit) => queue,
            _ => {
                tracing::debug!(user = %turn.user, %habit, "ignoring stale check-in answer");
                return Ok(());
            }
        };
        self.record_answer(turn, queue, HabitReport::Done(done), Delivery::Edit)
            .await
    }

    pub(super) async fn checkin_amount(
        &self,
        turn: &Turn<'_>,
        queue: CheckinQueue,
        text: &str,
    ) -> Result<(), EngineError> {
        let Ok(amount) = text.trim().parse::<u32>() else {
            self.reply(turn, "That's not a valid number. Enter a whole number, 0 or more.")
                .await;
            return Ok(());
        };
        self.record_answer(turn, queue, HabitReport::Amount(amount), Delivery::Send)
            .await
    }

    async fn record_answer(
        &self,
        turn: &Turn<'_>,
        mut queue: CheckinQueue,
        report: HabitReport,
        delivery: Delivery,
    ) -> Result<(), EngineError> {
        let mut user = self.load(turn).await?;
        let Some(id) = queue.current().cloned() else {
            self.clear_stage(turn);
            return Ok(());
        };

        let acknowledgement = match user.habit_mut(&id) {
            Some(habit) => {
                let outcome = record_checkin(habit, report);
                let text = acknowledgement(habit, outcome);
                apply_score_event(&mut user, outcome.score_event(), turn.today);
                self.save(&user).await?;
                Some(text)
            }
            None => {
                tracing::debug!(user = %turn.user, habit = %id, "habit removed mid check-in");
                None
            }
        };

        queue.advance();
        if let Some(text) = acknowledgement {
            self.send(Outbound::new(turn.user, delivery, text)).await;
        }
        self.ask_next(turn, &user, queue).await;
        Ok(())
    }

    pub(super) async fn relapse_picker(&self, turn: &Turn<'_>) -> Result<(), EngineError> {
        let user = self.load(turn).await?;
        self.offer_relapse_picker(turn, &user).await;
        Ok(())
    }

    async fn offer_relapse_picker(&self, turn: &Turn<'_>, user: &User) {
        if user.addictions.is_empty() {
            self.reply(turn, "You have no addictions logged. Focus.")
                .await;
            return;
        }
        self.send(
            Outbound::send(turn.user, "Which one got you? Report it.")
                .with_keyboard(Keyboard::relapse_picker(&user.addictions)),
        )
        .await;
    }

    pub(super) async fn relapse(
        &self,
        turn: &Turn<'_>,
        id: &AddictionId,
    ) -> Result<(), EngineError> {
        let mut user = self.load(turn).await?;
        let Some(addiction) = user.addiction_mut(id) else {
            tracing::debug!(user = %turn.user, addiction = %id, "ignoring relapse on unknown addiction");
            return Ok(());
        };
        record_relapse(addiction);
        let addiction = addiction.clone();
        apply_score_event(&mut user, ScoreEvent::Relapse, turn.today);
        self.save(&user).await?;

        let logged = format!("💔 Relapse on \"{}\" logged. Streak reset to 0.", addiction.name);
        self.send(Outbound::edit(turn.user, logged.as_str())).await;
        let text = self
            .generate(&prompts::relapse(&addiction, &logged), user.mode)
            .await;
        self.reply(turn, text).await;
        Ok(())
    }

    /// Answer to the evening "did you win today?" prompt.
    pub(super) async fn day_verdict(&self, turn: &Turn<'_>, won: bool) -> Result<(), EngineError> {
        let mut user = self.load(turn).await?;

        if won {
            let mut counted = 0_usize;
            for addiction in &mut user.addictions {
                if record_clean_day(addiction, turn.today) {
                    counted += 1;
                }
            }
            if counted > 0 {
                self.save(&user).await?;
            }
            let text = if user.addictions.is_empty() {
                "🏆 Good. Hold that standard.".to_string()
            } else if counted == 0 {
                "🏆 Today's clean day is already on the books.".to_string()
            } else {
                format!("🏆 Clean day logged for {counted} addiction(s). Keep going.")
            };
            self.send(Outbound::edit(turn.user, text)).await;
        } else {
            self.send(Outbound::edit(turn.user, "💀 Own it. Report what happened."))
                .await;
            self.offer_relapse_picker(turn, &user).await;
        }

        if !user.habits.is_empty() {
            self.begin_checkin(turn, &user).await;
        }
        Ok(())
    }
}

fn acknowledgement(habit: &Habit, outcome: CheckinOutcome) -> String {
    match (outcome, &habit.kind) {
        (CheckinOutcome::Kept, HabitKind::Binary) => {
            format!("✅ \"{}\" done. Streak: {} days.", habit.name, habit.streak)
        }
        (CheckinOutcome::Kept, HabitKind::Quantitative { unit }) => format!(
            "✅ \"{}\": {} {unit} logged. Streak: {} days.",
            habit.name, habit.progress, habit.streak
        ),
        (CheckinOutcome::Missed, _) => format!(
            "❌ \"{}\" missed. Streak reset. Do better tomorrow.",
            habit.name
        ),
    }
}
