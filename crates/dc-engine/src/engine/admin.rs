//! Handlers behind the admin commands.

use dc_core::User;
use dc_core::types::non_empty;

use super::{Engine, Turn};
use crate::error::EngineError;
use crate::outbound::{Keyboard, Outbound};
use crate::render;
use crate::session::Stage;

/// How many of the most recent registrations `/users` shows.
const RECENT_USERS: usize = 20;

impl Engine {
    pub(super) async fn admin_panel(&self, turn: &Turn<'_>) -> Result<(), EngineError> {
        if !self.is_admin(turn.user) {
            tracing::debug!(user = %turn.user, "ignoring admin panel request");
            return Ok(());
        }
        self.send(Outbound::edit(turn.user, "👑 Admin panel").with_keyboard(Keyboard::admin_panel()))
            .await;
        Ok(())
    }

    pub(super) async fn recent_users(&self, turn: &Turn<'_>) -> Result<(), EngineError> {
        let recent: Vec<User> = self
            .list_users()
            .await?
            .into_iter()
            .rev()
            .take(RECENT_USERS)
            .collect();
        self.reply(turn, render::user_list(&recent)).await;
        Ok(())
    }

    pub(super) async fn stats(&self, turn: &Turn<'_>) -> Result<(), EngineError> {
        let users = self.list_users().await?;
        self.reply(turn, render::stats(&users)).await;
        Ok(())
    }

    pub(super) async fn begin_broadcast(&self, turn: &Turn<'_>) -> Result<(), EngineError> {
        self.set_stage(turn, Stage::AwaitingBroadcast);
        self.reply(turn, "📣 Send the message to broadcast to every user, or /cancel.")
            .await;
        Ok(())
    }

    /// Sends `text` to every registered user and reports the tally.
    pub(super) async fn broadcast(&self, turn: &Turn<'_>, text: &str) -> Result<(), EngineError> {
        if !self.is_admin(turn.user) {
            self.clear_stage(turn);
            return Ok(());
        }
        let Ok(text) = non_empty("broadcast", text) else {
            self.reply(turn, "Nothing to send. Type the message, or /cancel.")
                .await;
            return Ok(());
        };
        self.clear_stage(turn);

        let users = self.list_users().await?;
        let messages: Vec<Outbound> = users
            .iter()
            .map(|user| Outbound::send(&user.id, text.clone()))
            .collect();
        let report = self.deliver_batch(&messages).await;
        tracing::info!(
            recipients = report.recipients,
            delivered = report.delivered,
            failed = report.failed,
            "broadcast finished"
        );
        self.reply(
            turn,
            format!(
                "📣 Broadcast sent to {}/{} users.",
                report.delivered, report.recipients
            ),
        )
        .await;
        Ok(())
    }
}
