use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::tree::widget::ClickKind;

/// Terminal input, reduced to what the game dialog reacts to.
#[derive(Debug, Clone)]
pub enum DialogEvent {
    Key(KeyEvent),
    /// Left button press at a screen cell `(column, row)`.
    Click(ClickKind, u16, u16),
    /// Wheel movement in rows, positive is down.
    Scroll(i32),
    Resize(u16, u16),
}

/// Terminals only report presses, so double clicks are recognised here:
/// a second press on the same cell within `interval` is a double click.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    interval: Duration,
    last: Option<(Instant, u16, u16)>,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(400))
    }
}

impl ClickTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn press(&mut self, column: u16, row: u16, now: Instant) -> ClickKind {
        match self.last.take() {
            Some((at, last_column, last_row))
                if last_column == column
                    && last_row == row
                    && now.saturating_duration_since(at) <= self.interval =>
            {
                // A third press starts over as a single click.
                ClickKind::Double
            }
            _ => {
                self.last = Some((now, column, row));
                ClickKind::Single
            }
        }
    }
}

pub fn translate(event: Event, clicks: &mut ClickTracker, now: Instant) -> Option<DialogEvent> {
    match event {
        Event::Key(key_event) => Some(DialogEvent::Key(key_event)),
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: _,
        }) => match kind {
            MouseEventKind::Down(MouseButton::Left) => Some(DialogEvent::Click(
                clicks.press(column, row, now),
                column,
                row,
            )),
            MouseEventKind::ScrollUp => Some(DialogEvent::Scroll(-1)),
            MouseEventKind::ScrollDown => Some(DialogEvent::Scroll(1)),
            _ => None,
        },
        Event::Resize(x, y) => Some(DialogEvent::Resize(x, y)),
        Event::FocusGained | Event::FocusLost | Event::Paste(_) => None,
    }
}
