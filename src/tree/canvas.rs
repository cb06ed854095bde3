//! The drawing surface the tree renders onto.

use std::fmt;

/// Opaque reference to a glyph drawn on a [`Canvas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphHandle(pub u64);

impl fmt::Display for GlyphHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "glyph#{}", self.0)
    }
}

/// Position in canvas coordinates (before scrolling is applied).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Which of the four node symbols to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolVariant {
    Collapsed,
    Expanded,
    Leaf,
    /// Leaf without a key: the "no selection" entry.
    Placeholder,
}

/// A scrollable surface that hands out glyph handles.
///
/// Coordinates passed to the `create_*` and `move_glyph` methods are canvas
/// coordinates. [`Canvas::glyph_at`] takes device coordinates, i.e. relative
/// to the visible viewport, and is responsible for applying the scroll offset.
pub trait Canvas {
    fn create_symbol(&mut self, at: Point, variant: SymbolVariant, glyph: &str) -> GlyphHandle;

    fn create_label(&mut self, at: Point, text: &str, selected: bool) -> GlyphHandle;

    /// Deleting an unknown handle is a no-op.
    fn delete(&mut self, handle: GlyphHandle);

    fn move_glyph(&mut self, handle: GlyphHandle, dx: i32, dy: i32);

    /// Topmost glyph under a device coordinate.
    fn glyph_at(&self, at: Point) -> Option<GlyphHandle>;

    /// Width of `text` in canvas units, used to size the scroll region.
    fn text_width(&self, text: &str) -> u32;

    fn set_scroll_region(&mut self, width: u32, height: u32);

    /// Visible horizontal fraction of the scroll region, `(first, last)`.
    fn xview(&self) -> (f64, f64);

    /// Visible vertical fraction of the scroll region, `(first, last)`.
    fn yview(&self) -> (f64, f64);

    fn xview_moveto(&mut self, fraction: f64);

    fn yview_moveto(&mut self, fraction: f64);
}
