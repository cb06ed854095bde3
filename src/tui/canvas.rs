//! A [`Canvas`] made of terminal cells.

use std::collections::BTreeMap;

use anyhow::Result;
use crossterm::style::Color;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tree::canvas::{Canvas, GlyphHandle, Point, SymbolVariant};
use crate::tui::Component;
use crate::tui::terminal_buffer::TerminalBuffer;

#[derive(Debug, Clone)]
enum GlyphKind {
    Symbol { variant: SymbolVariant, glyph: String },
    Label { text: String, selected: bool },
}

#[derive(Debug, Clone)]
struct Glyph {
    at: Point,
    kind: GlyphKind,
}

impl Glyph {
    fn text(&self) -> &str {
        match &self.kind {
            GlyphKind::Symbol { glyph, .. } => glyph,
            GlyphKind::Label { text, .. } => text,
        }
    }

    fn width(&self) -> i32 {
        self.text().width().max(1) as i32
    }

    fn colors(&self, colors: bool) -> (Color, Color) {
        if !colors {
            return (Color::Reset, Color::Reset);
        }
        match &self.kind {
            GlyphKind::Symbol { variant, .. } => match variant {
                SymbolVariant::Collapsed | SymbolVariant::Expanded => (Color::Yellow, Color::Reset),
                SymbolVariant::Leaf => (Color::Green, Color::Reset),
                SymbolVariant::Placeholder => (Color::DarkGrey, Color::Reset),
            },
            GlyphKind::Label { selected: true, .. } => (Color::White, Color::DarkBlue),
            GlyphKind::Label { selected: false, .. } => (Color::Reset, Color::Reset),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

const BLANK: Cell = Cell {
    ch: ' ',
    fg: Color::Reset,
    bg: Color::Reset,
};

/// Glyphs positioned on a grid of cells, viewed through a scrollable
/// `width` x `height` window.
pub struct TerminalCanvas {
    glyphs: BTreeMap<GlyphHandle, Glyph>,
    next_handle: u64,
    width: u16,
    height: u16,
    region: (u32, u32),
    offset_x: u32,
    offset_y: u32,
    colors: bool,
}

impl TerminalCanvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            glyphs: BTreeMap::new(),
            next_handle: 1,
            width,
            height,
            region: (0, 0),
            offset_x: 0,
            offset_y: 0,
            colors: false,
        }
    }

    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn contains(&self, handle: GlyphHandle) -> bool {
        self.glyphs.contains_key(&handle)
    }

    pub fn position(&self, handle: GlyphHandle) -> Option<Point> {
        self.glyphs.get(&handle).map(|glyph| glyph.at)
    }

    pub fn symbol_variant(&self, handle: GlyphHandle) -> Option<SymbolVariant> {
        match &self.glyphs.get(&handle)?.kind {
            GlyphKind::Symbol { variant, .. } => Some(*variant),
            GlyphKind::Label { .. } => None,
        }
    }

    pub fn label_selected(&self, handle: GlyphHandle) -> Option<bool> {
        match &self.glyphs.get(&handle)?.kind {
            GlyphKind::Label { selected, .. } => Some(*selected),
            GlyphKind::Symbol { .. } => None,
        }
    }

    /// Scroll offset in cells, `(x, y)`.
    pub fn offset(&self) -> (u32, u32) {
        (self.offset_x, self.offset_y)
    }

    /// Scroll by whole cells, clamped to the scroll region.
    pub fn scroll_by(&mut self, dx: i32, dy: i32) {
        self.offset_x = clamp_offset(self.offset_x as i64 + dx as i64, self.width, self.region.0);
        self.offset_y = clamp_offset(self.offset_y as i64 + dy as i64, self.height, self.region.1);
    }

    fn allocate(&mut self, glyph: Glyph) -> GlyphHandle {
        let handle = GlyphHandle(self.next_handle);
        self.next_handle += 1;
        self.glyphs.insert(handle, glyph);
        handle
    }

    fn paint_row(&self, row: u16) -> Vec<Cell> {
        let mut cells = vec![BLANK; self.width as usize];
        let canvas_y = row as i64 + self.offset_y as i64;
        // Handles grow monotonically, so later glyphs paint over earlier ones.
        for glyph in self.glyphs.values() {
            if glyph.at.y as i64 != canvas_y {
                continue;
            }
            let (fg, bg) = glyph.colors(self.colors);
            let mut column = glyph.at.x as i64 - self.offset_x as i64;
            for ch in glyph.text().chars() {
                let ch_width = ch.width().unwrap_or(0) as i64;
                if ch_width == 0 {
                    continue;
                }
                if column >= 0 && column + ch_width <= self.width as i64 {
                    cells[column as usize] = Cell { ch, fg, bg };
                    // Cover the second half of wide characters.
                    for extra in 1..ch_width {
                        cells[(column + extra) as usize] = Cell { ch: '\0', fg, bg };
                    }
                }
                column += ch_width;
            }
        }
        cells
    }
}

fn clamp_offset(wanted: i64, visible: u16, total: u32) -> u32 {
    let max = total.saturating_sub(visible as u32) as i64;
    wanted.clamp(0, max) as u32
}

fn view(offset: u32, visible: u16, total: u32) -> (f64, f64) {
    if total <= visible as u32 {
        return (0.0, 1.0);
    }
    let total = total as f64;
    let first = offset as f64 / total;
    let last = ((offset + visible as u32) as f64 / total).min(1.0);
    (first, last)
}

impl Canvas for TerminalCanvas {
    fn create_symbol(&mut self, at: Point, variant: SymbolVariant, glyph: &str) -> GlyphHandle {
        self.allocate(Glyph {
            at,
            kind: GlyphKind::Symbol {
                variant,
                glyph: glyph.to_string(),
            },
        })
    }

    fn create_label(&mut self, at: Point, text: &str, selected: bool) -> GlyphHandle {
        let text = if selected && !self.colors {
            format!("[{text}]")
        } else {
            text.to_string()
        };
        self.allocate(Glyph {
            at,
            kind: GlyphKind::Label { text, selected },
        })
    }

    fn delete(&mut self, handle: GlyphHandle) {
        self.glyphs.remove(&handle);
    }

    fn move_glyph(&mut self, handle: GlyphHandle, dx: i32, dy: i32) {
        if let Some(glyph) = self.glyphs.get_mut(&handle) {
            glyph.at.x += dx;
            glyph.at.y += dy;
        }
    }

    fn glyph_at(&self, at: Point) -> Option<GlyphHandle> {
        if at.x < 0 || at.y < 0 || at.x >= self.width as i32 || at.y >= self.height as i32 {
            return None;
        }
        let x = at.x + self.offset_x as i32;
        let y = at.y + self.offset_y as i32;
        self.glyphs
            .iter()
            .rev()
            .find(|(_, glyph)| glyph.at.y == y && x >= glyph.at.x && x < glyph.at.x + glyph.width())
            .map(|(handle, _)| *handle)
    }

    fn text_width(&self, text: &str) -> u32 {
        text.width() as u32
    }

    fn set_scroll_region(&mut self, width: u32, height: u32) {
        self.region = (width, height);
        self.offset_x = clamp_offset(self.offset_x as i64, self.width, width);
        self.offset_y = clamp_offset(self.offset_y as i64, self.height, height);
    }

    fn xview(&self) -> (f64, f64) {
        view(self.offset_x, self.width, self.region.0)
    }

    fn yview(&self) -> (f64, f64) {
        view(self.offset_y, self.height, self.region.1)
    }

    fn xview_moveto(&mut self, fraction: f64) {
        let wanted = (fraction.clamp(0.0, 1.0) * self.region.0 as f64).round() as i64;
        self.offset_x = clamp_offset(wanted, self.width, self.region.0);
    }

    fn yview_moveto(&mut self, fraction: f64) {
        let wanted = (fraction.clamp(0.0, 1.0) * self.region.1 as f64).round() as i64;
        self.offset_y = clamp_offset(wanted, self.height, self.region.1);
    }
}

impl Component for TerminalCanvas {
    fn render(&self, buffer: &mut TerminalBuffer) -> Result<()> {
        for row in 0..self.height.min(buffer.height()) {
            let mut current = BLANK;
            buffer
                .set_foreground(current.fg)
                .set_background(current.bg);
            for cell in self.paint_row(row) {
                if cell.ch == '\0' {
                    continue;
                }
                if cell.fg != current.fg {
                    buffer.set_foreground(cell.fg);
                }
                if cell.bg != current.bg {
                    buffer.set_background(cell.bg);
                }
                current = cell;
                buffer.write(&cell.ch.to_string());
            }
            buffer.set_foreground(Color::Reset).set_background(Color::Reset);
            buffer.newline();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_applies_scroll_offset() {
        let mut canvas = TerminalCanvas::new(10, 3);
        let label = canvas.create_label(Point::new(2, 5), "Golf", false);
        canvas.set_scroll_region(10, 8);

        assert_eq!(canvas.glyph_at(Point::new(3, 5)), None);
        canvas.yview_moveto(1.0);
        assert_eq!(canvas.offset(), (0, 5));
        assert_eq!(canvas.glyph_at(Point::new(3, 0)), Some(label));
        assert_eq!(canvas.glyph_at(Point::new(6, 0)), None);
    }

    #[test]
    fn later_glyphs_win_hit_tests() {
        let mut canvas = TerminalCanvas::new(10, 3);
        canvas.create_symbol(Point::new(0, 0), SymbolVariant::Leaf, "*");
        let top = canvas.create_label(Point::new(0, 0), "Yukon", false);

        assert_eq!(canvas.glyph_at(Point::new(0, 0)), Some(top));
    }

    #[test]
    fn views_are_fractions_of_the_region() {
        let mut canvas = TerminalCanvas::new(10, 4);
        canvas.set_scroll_region(40, 4);
        assert_eq!(canvas.yview(), (0.0, 1.0));
        assert_eq!(canvas.xview(), (0.0, 0.25));

        canvas.xview_moveto(0.5);
        assert_eq!(canvas.xview(), (0.5, 0.75));

        // Clamped so the window stays inside the region.
        canvas.xview_moveto(0.9);
        assert_eq!(canvas.xview(), (0.75, 1.0));
    }

    #[test]
    fn shrinking_region_clamps_offset() {
        let mut canvas = TerminalCanvas::new(5, 2);
        canvas.set_scroll_region(5, 10);
        canvas.scroll_by(0, 100);
        assert_eq!(canvas.offset(), (0, 8));

        canvas.set_scroll_region(5, 4);
        assert_eq!(canvas.offset(), (0, 2));
    }

    #[test]
    fn move_and_delete() {
        let mut canvas = TerminalCanvas::new(10, 10);
        let handle = canvas.create_symbol(Point::new(1, 1), SymbolVariant::Collapsed, "+");
        canvas.move_glyph(handle, 0, 3);
        assert_eq!(canvas.position(handle), Some(Point::new(1, 4)));

        canvas.delete(handle);
        canvas.delete(handle);
        assert!(canvas.is_empty());
    }

    #[test]
    fn renders_visible_rows() {
        let mut canvas = TerminalCanvas::new(8, 2);
        canvas.create_symbol(Point::new(0, 0), SymbolVariant::Expanded, "-");
        canvas.create_label(Point::new(2, 0), "Spider", false);
        canvas.create_symbol(Point::new(2, 1), SymbolVariant::Leaf, "*");
        canvas.create_label(Point::new(4, 1), "Scorpion", true);

        let mut buffer = TerminalBuffer::new(8, 2);
        canvas.render(&mut buffer).unwrap();
        assert_eq!(buffer.text_lines(), vec!["- Spider", "  * [Sco"]);
    }
}
