use tracing::{debug, error};

use crate::error::{Result, TreeError};
use crate::tree::node::{Contents, Node, NodeId, NodeKind, NodeSpec, run_hook};

/// A node as it appears on screen: which node, and how deep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub node: NodeId,
    pub depth: u16,
}

/// Owns every node that has been materialized so far.
///
/// Roots are inserted up front; a branch's children are appended the first
/// time [`NodeArena::contents`] asks for them, so ids only ever grow.
#[derive(Debug)]
pub struct NodeArena<K> {
    nodes: Vec<Node<K>>,
    /// Same length as `nodes`; `None` for roots.
    parent: Vec<Option<NodeId>>,
    roots: Vec<NodeId>,
}

impl<K> NodeArena<K> {
    pub fn new(roots: Vec<NodeSpec<K>>) -> Self {
        let mut arena = Self {
            nodes: Vec::new(),
            parent: Vec::new(),
            roots: Vec::new(),
        };
        for spec in roots {
            let id = arena.insert(None, spec);
            arena.roots.push(id);
        }
        arena
    }

    fn insert(&mut self, parent: Option<NodeId>, spec: NodeSpec<K>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::from_spec(spec));
        self.parent.push(parent);
        id
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<K>> {
        self.nodes.get(id)
    }

    /// Like [`NodeArena::get`], but an unknown id is a contract violation.
    pub fn node(&self, id: NodeId) -> Result<&Node<K>> {
        self.nodes
            .get(id)
            .ok_or_else(|| TreeError::ContractViolation(format!("node {id} does not exist")))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<K>> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::ContractViolation(format!("node {id} does not exist")))
    }

    /// `None` for an unknown id, `Some(None)` for a root.
    pub fn parent(&self, id: NodeId) -> Option<Option<NodeId>> {
        self.parent.get(id).copied()
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id).flatten();
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent).flatten();
        }
        depth
    }

    /// Children of a branch, computing and caching them on first access.
    ///
    /// Fixed contents are materialized as given, a lazy hook runs exactly
    /// once and background contents are awaited here. Every later call
    /// returns the same cached slice.
    pub fn contents(&mut self, id: NodeId) -> Result<&[NodeId]> {
        let node = self.node_mut(id)?;
        let source = match &mut node.kind {
            NodeKind::Leaf { .. } => {
                return Err(TreeError::ContractViolation(format!(
                    "contents requested for leaf {:?}",
                    node.text
                )));
            }
            NodeKind::Branch {
                children: Some(_), ..
            } => None,
            NodeKind::Branch { source, .. } => Some(std::mem::take(source)),
        };

        if let Some(source) = source {
            let specs = self.load(id, source);
            let children: Vec<NodeId> = specs
                .into_iter()
                .map(|spec| self.insert(Some(id), spec))
                .collect();
            debug!("contents: node={} loaded {} children", id, children.len());
            if let NodeKind::Branch { children: slot, .. } = &mut self.node_mut(id)?.kind {
                *slot = Some(children);
            }
        }

        match &self.node(id)?.kind {
            NodeKind::Branch {
                children: Some(children),
                ..
            } => Ok(children),
            _ => Err(TreeError::ContractViolation(format!(
                "node {id} lost its children"
            ))),
        }
    }

    /// The hook is spent either way, so a failed load leaves an empty branch.
    fn load(&self, id: NodeId, source: Contents<K>) -> Vec<NodeSpec<K>> {
        let loaded = match source {
            Contents::Empty => Ok(Vec::new()),
            Contents::Fixed(children) => Ok(children),
            Contents::Lazy(hook) => run_hook(hook),
            Contents::Background(task) => smol::block_on(task),
        };
        loaded.unwrap_or_else(|message| {
            let err = TreeError::ContentLoad(message);
            error!("node {id}: {err}; treating branch as empty");
            Vec::new()
        })
    }

    /// Children if they were computed already; never triggers a load.
    pub fn cached_children(&self, id: NodeId) -> Option<&[NodeId]> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Branch {
                children: Some(children),
                ..
            } => Some(children),
            _ => None,
        }
    }

    /// Whether `contents(id)` would return without waiting.
    pub fn is_ready(&self, id: NodeId) -> bool {
        match self.nodes.get(id).map(|node| &node.kind) {
            Some(NodeKind::Branch {
                children: None,
                source: Contents::Background(task),
                ..
            }) => task.is_finished(),
            _ => true,
        }
    }

    pub fn set_expanded(&mut self, id: NodeId, value: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        match &mut node.kind {
            NodeKind::Branch { expanded, .. } => {
                *expanded = value;
                Ok(())
            }
            NodeKind::Leaf { .. } => Err(TreeError::ContractViolation(format!(
                "cannot expand leaf {:?}",
                node.text
            ))),
        }
    }

    /// Mark a leaf selected or not. Placeholders refuse to be selected.
    pub fn set_selected(&mut self, id: NodeId, value: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        match &mut node.kind {
            NodeKind::Leaf { key: None, .. } if value => Err(TreeError::ContractViolation(
                format!("placeholder {:?} cannot be selected", node.text),
            )),
            NodeKind::Leaf { selected, .. } => {
                *selected = value;
                Ok(())
            }
            NodeKind::Branch { .. } => Err(TreeError::ContractViolation(format!(
                "cannot select branch {:?}",
                node.text
            ))),
        }
    }

    /// Rows for `ids` and, recursively, the children of every expanded
    /// branch among them.
    pub fn flatten(&mut self, ids: &[NodeId], depth: u16) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        self.flatten_into(ids, depth, &mut rows)?;
        Ok(rows)
    }

    fn flatten_into(&mut self, ids: &[NodeId], depth: u16, rows: &mut Vec<Row>) -> Result<()> {
        for &id in ids {
            rows.push(Row { node: id, depth });
            if self.node(id)?.is_expanded() {
                let children = self.contents(id)?.to_vec();
                self.flatten_into(&children, depth + 1, rows)?;
            }
        }
        Ok(())
    }

    /// All nodes currently marked selected.
    pub fn selected(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_selected())
            .map(|(id, _)| id)
            .collect()
    }
}
