//! Scheduled, engine-initiated messages.
//!
//! Jobs are best-effort batches: a failed delivery to one user is logged and
//! the batch moves on. Only failing to read the recipient list aborts a job.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use dc_core::{Goal, UserId};

use super::Engine;
use crate::error::EngineError;
use crate::outbound::{Keyboard, Outbound};
use crate::prompts;
use crate::render;

/// A scheduled broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProactiveJob {
    /// Morning motivation for every user.
    DailyMotivation,
    /// Evening "did you win today?" prompt for users who track something.
    EveningCheckin,
    /// Countdown for every active goal.
    GoalReminder,
}

impl ProactiveJob {
    pub const ALL: [Self; 3] = [
        Self::DailyMotivation,
        Self::EveningCheckin,
        Self::GoalReminder,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DailyMotivation => "daily-motivation",
            Self::EveningCheckin => "evening-checkin",
            Self::GoalReminder => "goal-reminder",
        }
    }
}

impl fmt::Display for ProactiveJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for unknown job names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownJob(String);

impl fmt::Display for UnknownJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown job: {}", self.0)
    }
}

impl std::error::Error for UnknownJob {}

impl FromStr for ProactiveJob {
    type Err = UnknownJob;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|job| job.as_str() == name)
            .ok_or_else(|| UnknownJob(s.to_string()))
    }
}

/// Delivery tally of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl Engine {
    pub async fn run_job(&self, job: ProactiveJob) -> Result<BatchReport, EngineError> {
        self.run_job_at(job, Utc::now()).await
    }

    /// Runs `job` as if triggered at `now`.
    pub async fn run_job_at(
        &self,
        job: ProactiveJob,
        now: DateTime<Utc>,
    ) -> Result<BatchReport, EngineError> {
        let today = self.today(now);
        let messages = match job {
            ProactiveJob::DailyMotivation => {
                let users = self.list_users().await?;
                let mut messages = Vec::with_capacity(users.len());
                for user in &users {
                    let text = self
                        .generate(&prompts::morning_motivation(), user.mode)
                        .await;
                    messages.push(Outbound::send(&user.id, format!("☀️ {text}")));
                }
                messages
            }
            ProactiveJob::EveningCheckin => self
                .list_users()
                .await?
                .iter()
                .filter(|user| user.tracks_anything())
                .map(|user| {
                    Outbound::send(&user.id, "🌙 The day is over. Did you win or lose?")
                        .with_keyboard(Keyboard::day_verdict())
                })
                .collect(),
            ProactiveJob::GoalReminder => {
                let goals = self
                    .repository
                    .list_active_goals()
                    .await
                    .map_err(EngineError::ListGoals)?;
                let mut by_user: BTreeMap<&UserId, Vec<&Goal>> = BTreeMap::new();
                for goal in &goals {
                    by_user.entry(&goal.user_id).or_default().push(goal);
                }
                by_user
                    .into_iter()
                    .map(|(user, goals)| Outbound::send(user, render::goal_reminder(goals, today)))
                    .collect()
            }
        };

        let report = self.deliver_batch(&messages).await;
        tracing::info!(
            %job,
            recipients = report.recipients,
            delivered = report.delivered,
            failed = report.failed,
            "proactive job finished"
        );
        Ok(report)
    }

    pub(super) async fn deliver_batch(&self, messages: &[Outbound]) -> BatchReport {
        let mut report = BatchReport {
            recipients: messages.len(),
            ..BatchReport::default()
        };
        for message in messages {
            match self.transport.deliver(message).await {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(user = %message.user, error = %err, "batch delivery failed");
                }
            }
        }
        report
    }
}
