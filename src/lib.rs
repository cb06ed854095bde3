pub mod color;
pub mod config;
pub mod demo;
pub mod error;
pub mod event;
pub mod tree;
pub mod tui;

pub use config::{SymbolSet, TreeStyle, ViewportConfig};
pub use error::TreeError;
