//! Selection tree core: node model, glyph registry, view state and the
//! interaction controller.

pub mod arena;
pub mod canvas;
pub mod node;
pub mod registry;
pub mod view_state;
pub mod widget;

pub use arena::{NodeArena, Row};
pub use canvas::{Canvas, GlyphHandle, Point, SymbolVariant};
pub use node::{Contents, Node, NodeId, NodeKind, NodeSpec};
pub use registry::{GlyphRole, NodeGlyphs, SymbolRegistry};
pub use view_state::{TreeData, TreeViewState};
pub use widget::{ClickKind, DialogHost, SelectTree, SelectTreeOptions, Transition};
