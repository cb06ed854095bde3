//! Node variants and the detached specs they are built from.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::tree::canvas::SymbolVariant;

pub type NodeId = usize;

type ContentHook<K> = Box<dyn FnOnce() -> Vec<NodeSpec<K>> + Send>;

/// Where a branch gets its children from the first time they are needed.
pub enum Contents<K> {
    Empty,
    /// Preconfigured children, used as given.
    Fixed(Vec<NodeSpec<K>>),
    /// Called exactly once, on first access.
    Lazy(ContentHook<K>),
    /// Already running on the blocking pool.
    Background(smol::Task<Result<Vec<NodeSpec<K>>, String>>),
}

impl<K> Default for Contents<K> {
    fn default() -> Self {
        Contents::Empty
    }
}

impl<K> Contents<K> {
    pub fn fixed(children: Vec<NodeSpec<K>>) -> Self {
        Contents::Fixed(children)
    }

    pub fn lazy<F>(hook: F) -> Self
    where
        F: FnOnce() -> Vec<NodeSpec<K>> + Send + 'static,
    {
        Contents::Lazy(Box::new(hook))
    }
}

impl<K: Send + 'static> Contents<K> {
    /// Start generating the children off the UI thread right away.
    ///
    /// A panic inside `hook` is caught and surfaces as an empty branch.
    pub fn background<F>(hook: F) -> Self
    where
        F: FnOnce() -> Vec<NodeSpec<K>> + Send + 'static,
    {
        Contents::Background(smol::unblock(move || run_hook(hook)))
    }
}

/// Run a content hook, turning a panic into its message.
pub(crate) fn run_hook<K, F>(hook: F) -> Result<Vec<NodeSpec<K>>, String>
where
    F: FnOnce() -> Vec<NodeSpec<K>>,
{
    catch_unwind(AssertUnwindSafe(hook)).map_err(|payload| {
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "content hook panicked".to_string())
    })
}

impl<K> fmt::Debug for Contents<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contents::Empty => write!(f, "Empty"),
            Contents::Fixed(children) => write!(f, "Fixed({} nodes)", children.len()),
            Contents::Lazy(_) => write!(f, "Lazy"),
            Contents::Background(task) => {
                write!(f, "Background(finished: {})", task.is_finished())
            }
        }
    }
}

#[derive(Debug)]
pub(crate) enum SpecKind<K> {
    Leaf { key: Option<K> },
    Branch { expanded: bool, contents: Contents<K> },
}

/// A node that is not yet part of any arena.
#[derive(Debug)]
pub struct NodeSpec<K> {
    pub(crate) text: String,
    pub(crate) kind: SpecKind<K>,
}

impl<K> NodeSpec<K> {
    pub fn leaf(key: K, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: SpecKind::Leaf { key: Some(key) },
        }
    }

    /// A leaf without a key. It is drawn but can never be selected.
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: SpecKind::Leaf { key: None },
        }
    }

    pub fn branch(text: impl Into<String>, contents: Contents<K>) -> Self {
        Self {
            text: text.into(),
            kind: SpecKind::Branch {
                expanded: false,
                contents,
            },
        }
    }

    /// Initial expansion state; ignored for leaves.
    pub fn expanded(mut self, value: bool) -> Self {
        if let SpecKind::Branch { expanded, .. } = &mut self.kind {
            *expanded = value;
        }
        self
    }
}

#[derive(Debug)]
pub enum NodeKind<K> {
    Leaf {
        key: Option<K>,
        selected: bool,
    },
    Branch {
        expanded: bool,
        /// `None` until the contents were requested once.
        children: Option<Vec<NodeId>>,
        source: Contents<K>,
    },
}

/// A node living in a [`NodeArena`](crate::tree::arena::NodeArena).
#[derive(Debug)]
pub struct Node<K> {
    pub text: String,
    pub kind: NodeKind<K>,
}

impl<K> Node<K> {
    pub(crate) fn from_spec(spec: NodeSpec<K>) -> Self {
        let kind = match spec.kind {
            SpecKind::Leaf { key } => NodeKind::Leaf {
                key,
                selected: false,
            },
            SpecKind::Branch { expanded, contents } => NodeKind::Branch {
                expanded,
                children: None,
                source: contents,
            },
        };
        Self {
            text: spec.text,
            kind,
        }
    }

    pub fn key(&self) -> Option<&K> {
        match &self.kind {
            NodeKind::Leaf { key, .. } => key.as_ref(),
            NodeKind::Branch { .. } => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.kind, NodeKind::Branch { expanded: true, .. })
    }

    pub fn is_selected(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { selected: true, .. })
    }

    pub fn variant(&self) -> SymbolVariant {
        match &self.kind {
            NodeKind::Leaf { key: Some(_), .. } => SymbolVariant::Leaf,
            NodeKind::Leaf { key: None, .. } => SymbolVariant::Placeholder,
            NodeKind::Branch { expanded: true, .. } => SymbolVariant::Expanded,
            NodeKind::Branch { expanded: false, .. } => SymbolVariant::Collapsed,
        }
    }
}
