use anyhow::Result;
use crossterm::style::Color;

use crate::tui::{Component, terminal_buffer::TerminalBuffer};

/// Bottom line of the dialog: key hints, or the last message.
pub struct StatusComponent {
    message: String,
}

impl StatusComponent {
    pub fn new(message: impl Into<String>) -> Self {
        StatusComponent {
            message: message.into(),
        }
    }
}

impl Component for StatusComponent {
    fn render(&self, buffer: &mut TerminalBuffer) -> Result<()> {
        let width = buffer.width();
        buffer
            .set_background(Color::Black)
            .set_foreground(Color::Yellow)
            .write_padded(&self.message, width);
        Ok(())
    }
}
