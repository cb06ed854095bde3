use std::io::Write;

use anyhow::Result;
use crossterm::ExecutableCommand;
use crossterm::cursor::MoveTo;
use crossterm::style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor};

use crate::tree::canvas::Point;
use crate::tui::terminal_buffer::{TerminalBuffer, TerminalCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Translate a screen cell into coordinates relative to this rect.
    pub fn local(&self, column: u16, row: u16) -> Option<Point> {
        let inside = column >= self.x
            && row >= self.y
            && column < self.x + self.width
            && row < self.y + self.height;
        inside.then(|| Point::new((column - self.x) as i32, (row - self.y) as i32))
    }
}

/// Where each pane of the game dialog goes on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogLayout {
    pub tree: Rect,
    pub preview: Rect,
    pub status: Rect,
}

impl DialogLayout {
    /// Tree on the left, preview on the right, status line at the bottom.
    /// `tree_rows` caps the height of the tree pane.
    pub fn new(width: u16, height: u16, tree_width: u16, tree_rows: u16) -> Self {
        let body = height.saturating_sub(1);
        let tree_width = tree_width.clamp(1, width.max(1));
        Self {
            tree: Rect::new(0, 0, tree_width, body.min(tree_rows.max(1))),
            preview: Rect::new(tree_width + 1, 0, width.saturating_sub(tree_width + 1), body),
            status: Rect::new(0, body, width, 1),
        }
    }
}

/// Copy a buffer onto the terminal at `rect`, hiding anything that
/// overflows and blanking the unused remainder.
pub fn composite<W: Write>(out: &mut W, buffer: &TerminalBuffer, rect: Rect) -> Result<()> {
    let mut x = 0u16;
    let mut y = 0u16;

    out.execute(ResetColor)?;
    for cmd in buffer.commands() {
        // Early exit if we've exceeded vertical bounds
        if y >= rect.height {
            break;
        }

        match cmd {
            TerminalCommand::Print(ch) => {
                if x >= rect.width {
                    // Skip this character (hide overflow)
                    continue;
                }

                // Move to position and print
                out.execute(MoveTo(rect.x + x, rect.y + y))?;
                out.execute(Print(ch))?;
                x += 1;
            }
            TerminalCommand::Newline => {
                // Pad the rest of the line with spaces
                while x < rect.width {
                    out.execute(MoveTo(rect.x + x, rect.y + y))?;
                    out.execute(Print(' '))?;
                    x += 1;
                }
                x = 0;
                y += 1;
            }
            TerminalCommand::SetForeground(color) => {
                out.execute(SetForegroundColor(*color))?;
            }
            TerminalCommand::SetBackground(color) => {
                out.execute(SetBackgroundColor(*color))?;
            }
        }
    }
    out.execute(ResetColor)?;

    // Clear any remaining rows beyond what was rendered
    while y < rect.height {
        while x < rect.width {
            out.execute(MoveTo(rect.x + x, rect.y + y))?;
            out.execute(Print(' '))?;
            x += 1;
        }
        x = 0;
        y += 1;
    }

    Ok(())
}
