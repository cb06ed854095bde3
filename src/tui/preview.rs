use anyhow::Result;
use crossterm::style::Color;
use unicode_width::UnicodeWidthStr;

use crate::demo::Game;
use crate::tui::{Component, terminal_buffer::TerminalBuffer};

/// Right-hand pane describing the selected game.
pub struct PreviewComponent {
    game: Option<&'static Game>,
}

impl PreviewComponent {
    pub fn new(game: Option<&'static Game>) -> Self {
        Self { game }
    }
}

/// Greedy word wrap to `width` columns.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.width() + 1 + word.width() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

impl Component for PreviewComponent {
    fn render(&self, buffer: &mut TerminalBuffer) -> Result<()> {
        let width = buffer.width();
        let Some(game) = self.game else {
            buffer
                .set_foreground(Color::DarkGrey)
                .write_padded("No game selected", width)
                .newline();
            return Ok(());
        };

        let decks = match game.decks {
            1 => "1 deck".to_string(),
            n => format!("{n} decks"),
        };
        buffer
            .set_foreground(Color::Cyan)
            .write_padded(game.name, width)
            .newline()
            .set_foreground(Color::DarkGrey)
            .write_padded(&format!("{} - {}", game.kind.label(), decks), width)
            .newline()
            .newline()
            .set_foreground(Color::Reset);
        for line in wrap(game.description, width as usize) {
            buffer.write_padded(&line, width).newline();
        }
        Ok(())
    }
}
