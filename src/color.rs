use supports_color::Stream;

use crate::config::SymbolSet;

/// Detect the level of color support
pub fn color_level() -> ColorLevel {
    match supports_color::on(Stream::Stdout) {
        Some(level) => match level.has_16m {
            true => ColorLevel::TrueColor,
            false => match level.has_256 {
                true => ColorLevel::Color256,
                false => ColorLevel::Color16,
            },
        },
        None => ColorLevel::None,
    }
}

/// Terminals without color support get plain ASCII tree symbols.
pub fn symbol_set(level: ColorLevel) -> SymbolSet {
    match level {
        ColorLevel::None => SymbolSet::ascii(),
        _ => SymbolSet::unicode(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLevel {
    /// No color support
    None,
    /// 16 basic colors
    Color16,
    /// 256 ANSI colors
    Color256,
    /// True color (24-bit RGB)
    TrueColor,
}
