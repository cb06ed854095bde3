use crossterm::style::Color;
use unicode_width::UnicodeWidthChar;

#[derive(Clone, Debug, PartialEq)]
pub enum TerminalCommand {
    Print(char),
    Newline,
    SetForeground(Color),
    SetBackground(Color),
}

/// A virtual buffer for rendering to a bounded rectangular area
/// Panes render into this instead of directly to stdout
pub struct TerminalBuffer {
    buffer: Vec<TerminalCommand>,
    width: u16,
    height: u16,
}

impl TerminalBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Vec::new(),
            width,
            height,
        }
    }

    pub fn writeln(&mut self, text: &str) -> &mut Self {
        self.write(text);
        self.newline()
    }

    pub fn write(&mut self, text: &str) -> &mut Self {
        for ch in text.chars() {
            self.buffer.push(TerminalCommand::Print(ch));
        }
        self
    }

    /// Write `text` cut or padded with spaces to exactly `width` columns.
    pub fn write_padded(&mut self, text: &str, width: u16) -> &mut Self {
        let mut used = 0usize;
        for ch in text.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if used + ch_width > width as usize {
                break;
            }
            self.buffer.push(TerminalCommand::Print(ch));
            used += ch_width;
        }
        for _ in used..width as usize {
            self.buffer.push(TerminalCommand::Print(' '));
        }
        self
    }

    pub fn newline(&mut self) -> &mut Self {
        self.buffer.push(TerminalCommand::Newline);
        self
    }

    pub fn set_foreground(&mut self, color: Color) -> &mut Self {
        self.buffer.push(TerminalCommand::SetForeground(color));
        self
    }

    pub fn set_background(&mut self, color: Color) -> &mut Self {
        self.buffer.push(TerminalCommand::SetBackground(color));
        self
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn commands(&self) -> &[TerminalCommand] {
        &self.buffer
    }

    /// The printed characters, one string per line. Handy in tests.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = vec![String::new()];
        for cmd in &self.buffer {
            match cmd {
                TerminalCommand::Print(ch) => {
                    if let Some(line) = lines.last_mut() {
                        line.push(*ch);
                    }
                }
                TerminalCommand::Newline => lines.push(String::new()),
                _ => {}
            }
        }
        if lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines
    }
}
