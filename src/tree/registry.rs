//! Glyph handle to node mapping used for hit-testing.

use std::collections::HashMap;

use tracing::debug;

use crate::tree::canvas::GlyphHandle;
use crate::tree::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphRole {
    Symbol,
    Label,
}

/// The glyphs currently drawn for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeGlyphs {
    pub symbol: Option<GlyphHandle>,
    pub label: Option<GlyphHandle>,
}

impl NodeGlyphs {
    fn slot(&mut self, role: GlyphRole) -> &mut Option<GlyphHandle> {
        match role {
            GlyphRole::Symbol => &mut self.symbol,
            GlyphRole::Label => &mut self.label,
        }
    }

    pub fn handles(&self) -> impl Iterator<Item = GlyphHandle> {
        self.symbol.into_iter().chain(self.label)
    }
}

/// Both directions are kept in step: every handle in `owners` is the current
/// glyph of its node in `glyphs`, and vice versa.
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    owners: HashMap<GlyphHandle, NodeId>,
    glyphs: HashMap<NodeId, NodeGlyphs>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `handle` as the `role` glyph of `node`.
    ///
    /// Returns the handle it replaces, which is no longer registered and
    /// should be deleted from the canvas by the caller.
    pub fn record(&mut self, node: NodeId, role: GlyphRole, handle: GlyphHandle) -> Option<GlyphHandle> {
        if let Some(previous_owner) = self.owners.insert(handle, node)
            && previous_owner != node
        {
            // The canvas reused a handle we still had on file.
            debug!("registry: {} moved from node {} to {}", handle, previous_owner, node);
            if let Some(glyphs) = self.glyphs.get_mut(&previous_owner) {
                for slot in [&mut glyphs.symbol, &mut glyphs.label] {
                    if *slot == Some(handle) {
                        *slot = None;
                    }
                }
            }
        }
        let replaced = self.glyphs.entry(node).or_default().slot(role).replace(handle);
        match replaced {
            Some(old) if old != handle => {
                self.owners.remove(&old);
                Some(old)
            }
            _ => None,
        }
    }

    pub fn resolve(&self, handle: GlyphHandle) -> Option<NodeId> {
        self.owners.get(&handle).copied()
    }

    pub fn glyphs(&self, node: NodeId) -> NodeGlyphs {
        self.glyphs.get(&node).copied().unwrap_or_default()
    }

    /// Whether `node` has a `role` glyph that still maps back to it.
    pub fn owns(&self, node: NodeId, role: GlyphRole) -> bool {
        let mut glyphs = self.glyphs(node);
        glyphs
            .slot(role)
            .and_then(|handle| self.resolve(handle))
            .is_some_and(|owner| owner == node)
    }

    /// Forget one glyph of `node`, returning its handle.
    pub fn evict_role(&mut self, node: NodeId, role: GlyphRole) -> Option<GlyphHandle> {
        let handle = self.glyphs.get_mut(&node)?.slot(role).take()?;
        self.owners.remove(&handle);
        Some(handle)
    }

    /// Forget every glyph of `node`.
    pub fn evict(&mut self, node: NodeId) -> NodeGlyphs {
        let glyphs = self.glyphs.remove(&node).unwrap_or_default();
        for handle in glyphs.handles() {
            self.owners.remove(&handle);
        }
        glyphs
    }

    /// Forget everything, returning the handles that were registered.
    pub fn drain(&mut self) -> Vec<GlyphHandle> {
        self.glyphs.clear();
        self.owners.drain().map(|(handle, _)| handle).collect()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
