//! Sizing and symbol configuration handed to the tree by its host.

use crate::tree::canvas::SymbolVariant;

/// Geometry of one tree row, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStyle {
    /// Indentation per depth level.
    pub distx: i32,
    /// Row height when no font line space is known.
    pub disty: i32,
    pub symbol_width: i32,
    pub symbol_height: i32,
    /// Space around the whole tree.
    pub margin: i32,
    /// Space between a symbol and its label.
    pub label_gap: i32,
}

impl Default for TreeStyle {
    fn default() -> Self {
        Self {
            distx: 20,
            disty: 16,
            symbol_width: 16,
            symbol_height: 14,
            margin: 2,
            label_gap: 4,
        }
    }
}

impl TreeStyle {
    /// One terminal cell per symbol, two cells of indentation.
    pub fn cells() -> Self {
        Self {
            distx: 2,
            disty: 1,
            symbol_width: 1,
            symbol_height: 1,
            margin: 0,
            label_gap: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    pub width: u32,
    /// Explicit viewport height. When absent it is derived from `breakpoints`.
    pub height: Option<u32>,
    /// Ordered `(min_screen_height, rows)` pairs; the last one whose minimum
    /// fits the screen wins.
    pub breakpoints: Vec<(u32, u32)>,
    pub screen_height: Option<u32>,
    /// Horizontal scrolling available.
    pub hbar: bool,
    /// Vertical scrolling available.
    pub vbar: bool,
    pub style: TreeStyle,
    /// Measured line space of the label font, if the host has one.
    pub line_space: Option<i32>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: None,
            breakpoints: vec![(0, 20), (600, 25), (800, 30)],
            screen_height: None,
            hbar: true,
            vbar: true,
            style: TreeStyle::default(),
            line_space: None,
        }
    }
}

impl ViewportConfig {
    /// Height of a row once the label font is taken into account.
    pub fn row_height(&self) -> i32 {
        match self.line_space {
            Some(line_space) => self.style.symbol_width.max(line_space).max(1),
            None => self.style.disty.max(1),
        }
    }

    pub fn rows_for_screen(&self, screen_height: u32) -> u32 {
        self.breakpoints
            .iter()
            .filter(|(min_height, _)| *min_height <= screen_height)
            .last()
            .map(|(_, rows)| *rows)
            .unwrap_or(0)
    }

    pub fn viewport_height(&self) -> u32 {
        self.height.unwrap_or_else(|| {
            let rows = self.rows_for_screen(self.screen_height.unwrap_or(0));
            rows * self.style.disty.max(1) as u32
        })
    }

    pub fn visible_rows(&self) -> u32 {
        self.viewport_height() / self.row_height() as u32
    }
}

/// The glyph drawn for each [`SymbolVariant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSet {
    pub collapsed: String,
    pub expanded: String,
    pub leaf: String,
    pub placeholder: String,
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::ascii()
    }
}

impl SymbolSet {
    pub fn ascii() -> Self {
        Self {
            collapsed: "+".to_string(),
            expanded: "-".to_string(),
            leaf: "*".to_string(),
            placeholder: "o".to_string(),
        }
    }

    pub fn unicode() -> Self {
        Self {
            collapsed: "▸".to_string(),
            expanded: "▾".to_string(),
            leaf: "•".to_string(),
            placeholder: "◦".to_string(),
        }
    }

    pub fn glyph(&self, variant: SymbolVariant) -> &str {
        match variant {
            SymbolVariant::Collapsed => &self.collapsed,
            SymbolVariant::Expanded => &self.expanded,
            SymbolVariant::Leaf => &self.leaf,
            SymbolVariant::Placeholder => &self.placeholder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoints_pick_last_fitting_entry() {
        let config = ViewportConfig::default();
        assert_eq!(config.rows_for_screen(480), 20);
        assert_eq!(config.rows_for_screen(600), 25);
        assert_eq!(config.rows_for_screen(1080), 30);
    }

    #[test]
    fn viewport_height_follows_screen_size() {
        let config = ViewportConfig {
            screen_height: Some(768),
            ..Default::default()
        };
        assert_eq!(config.viewport_height(), 25 * 16);
        assert_eq!(config.visible_rows(), 25);
    }

    #[test]
    fn explicit_height_wins() {
        let config = ViewportConfig {
            height: Some(160),
            screen_height: Some(1200),
            ..Default::default()
        };
        assert_eq!(config.visible_rows(), 10);
    }

    #[test]
    fn line_space_grows_rows_but_never_below_symbol_width() {
        let mut config = ViewportConfig {
            height: Some(400),
            line_space: Some(20),
            ..Default::default()
        };
        assert_eq!(config.row_height(), 20);
        assert_eq!(config.visible_rows(), 20);

        config.line_space = Some(9);
        assert_eq!(config.row_height(), 16);
    }

    #[test]
    fn custom_breakpoint_table() {
        let config = ViewportConfig {
            breakpoints: vec![(0, 5), (30, 12)],
            screen_height: Some(40),
            style: TreeStyle::cells(),
            ..Default::default()
        };
        assert_eq!(config.visible_rows(), 12);
    }
}
