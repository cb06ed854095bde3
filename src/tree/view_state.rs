use crate::tree::arena::NodeArena;
use crate::tree::node::NodeSpec;

/// Scroll position of a tree, as `(first, last)` visible fractions per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeViewState {
    pub xview: (f64, f64),
    pub yview: (f64, f64),
}

impl Default for TreeViewState {
    fn default() -> Self {
        Self {
            xview: (0.0, 1.0),
            yview: (0.0, 1.0),
        }
    }
}

/// Everything about a tree that survives between dialog sessions: the nodes
/// (with their expansion and selection flags) and the last scroll position.
///
/// A [`SelectTree`](crate::tree::widget::SelectTree) borrows this mutably for
/// as long as it is alive, so only one widget can drive a tree at a time.
#[derive(Debug)]
pub struct TreeData<K> {
    pub view: TreeViewState,
    arena: NodeArena<K>,
}

impl<K> TreeData<K> {
    pub fn new(roots: Vec<NodeSpec<K>>) -> Self {
        Self {
            view: TreeViewState::default(),
            arena: NodeArena::new(roots),
        }
    }

    pub fn with_view(mut self, view: TreeViewState) -> Self {
        self.view = view;
        self
    }

    pub fn arena(&self) -> &NodeArena<K> {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut NodeArena<K> {
        &mut self.arena
    }
}
