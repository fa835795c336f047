//! [`Transport`] that prints messages to a writer.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use dc_engine::{Delivery, Outbound, PortError, Transport};

/// Prints each message as `[user] text`, followed by one line per keyboard
/// row. Buttons show the `!token` to type to press them.
pub struct ConsoleTransport<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> ConsoleTransport<W> {
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Takes everything written so far, leaving an empty writer behind.
    pub fn take(&self) -> W
    where
        W: Default,
    {
        std::mem::take(&mut *self.writer.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Renders a message the way it appears on the console.
pub fn render(message: &Outbound) -> String {
    let marker = match message.delivery {
        Delivery::Send => "",
        Delivery::Edit => " (edited)",
    };
    let mut out = format!("[{}]{marker} {}\n", message.user, message.text);
    if let Some(keyboard) = &message.keyboard {
        for row in &keyboard.rows {
            let buttons: Vec<String> = row
                .iter()
                .map(|button| format!("[{}] !{}", button.label, button.action))
                .collect();
            out.push_str("    ");
            out.push_str(&buttons.join("  "));
            out.push('\n');
        }
    }
    out
}

#[async_trait]
impl<W: Write + Send> Transport for ConsoleTransport<W> {
    async fn deliver(&self, message: &Outbound) -> Result<(), PortError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer
            .write_all(render(message).as_bytes())
            .and_then(|()| writer.flush())
            .map_err(PortError::delivery)
    }
}

#[cfg(test)]
mod tests {
    use dc_core::UserId;
    use dc_engine::Keyboard;
    use insta::assert_snapshot;

    use super::*;

    #[tokio::test]
    async fn test_prints_text_and_buttons() {
        let transport = ConsoleTransport::new(Vec::new());
        let user = UserId::new("7").unwrap();

        transport
            .deliver(&Outbound::send(&user, "Ready?").with_keyboard(Keyboard::day_verdict()))
            .await
            .unwrap();
        transport
            .deliver(&Outbound::edit(&user, "Logged."))
            .await
            .unwrap();

        let output = String::from_utf8(transport.take()).unwrap();
        assert_snapshot!(output, @r"
        [7] Ready?
            [🏆 I won] !verdict_won  [💀 I lost] !verdict_lost
        [7] (edited) Logged.
        ");
    }
}
