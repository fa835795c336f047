//! Interactive console session for one user.

use std::io::Write;

use anyhow::{Context, Result};
use dc_core::UserId;
use dc_engine::{Engine, Inbound, Input, UnknownAction};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Turns one console line into an engine input.
///
/// Blank lines are skipped. `!token` presses a button, `/command` runs a
/// known command, anything else is text.
pub fn parse_line(line: &str) -> Result<Option<Input>, UnknownAction> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Some(token) = trimmed.strip_prefix('!') {
        return Input::from_token(token).map(Some);
    }
    Ok(Some(Input::from_text(trimmed)))
}

/// The user a console session speaks as.
#[derive(Debug, Clone)]
pub struct Speaker {
    pub user: UserId,
    /// Display name used when the user is first registered.
    pub name: String,
    pub handle: Option<String>,
}

impl Speaker {
    fn inbound(&self, input: Input) -> Inbound {
        let inbound = Inbound::new(self.user.clone(), &self.name, input);
        match &self.handle {
            Some(handle) => inbound.with_username(handle),
            None => inbound,
        }
    }
}

/// Feeds `input` line by line to the engine as `speaker` until end of input.
///
/// Replies go through the engine's transport; local notices such as an
/// unknown button token are written to `writer`.
pub async fn run<R, W>(engine: &Engine, speaker: &Speaker, input: R, writer: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        match parse_line(&line) {
            Ok(Some(input)) => engine.process(speaker.inbound(input)).await,
            Ok(None) => {}
            Err(err) => writeln!(writer, "{err}")?,
        }
    }
    tracing::debug!(user = %speaker.user, "console input closed");
    Ok(())
}
