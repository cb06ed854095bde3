use anyhow::Result;

use crate::tui::terminal_buffer::TerminalBuffer;

pub mod canvas;
pub mod preview;
pub mod screen;
pub mod status;
pub mod terminal_buffer;

/// A pane of the dialog that can draw itself into a [`TerminalBuffer`].
pub trait Component {
    fn render(&self, buffer: &mut TerminalBuffer) -> Result<()>;
}
