//! The selection tree widget.
//!
//! A [`SelectTree`] draws a [`TreeData`] onto a [`Canvas`], resolves pointer
//! events to nodes through its [`SymbolRegistry`] and turns them into the
//! transitions below:
//!
//! | click  | target                 | transition                      |
//! |--------|------------------------|---------------------------------|
//! | any    | branch                 | toggle expansion, partial redraw |
//! | double | branch just toggled by a single click | absorbed         |
//! | any    | leaf without key       | absorbed                        |
//! | single | leaf already selected  | absorbed                        |
//! | single | other leaf             | select, update preview          |
//! | double | leaf with key          | select, commit                  |
//!
//! Every pointer event is consumed by the widget, whatever the outcome.

use tracing::{debug, error, info, warn};

use crate::config::{SymbolSet, ViewportConfig};
use crate::error::{Result, TreeError};
use crate::tree::arena::{NodeArena, Row};
use crate::tree::canvas::{Canvas, Point};
use crate::tree::node::{NodeId, NodeKind};
use crate::tree::registry::{GlyphRole, SymbolRegistry};
use crate::tree::view_state::{TreeData, TreeViewState};

/// The dialog hosting the tree.
pub trait DialogHost<K> {
    /// The selected leaf changed.
    fn update_preview(&mut self, key: &K);

    /// A leaf was confirmed by double-click; finish the dialog with `default`.
    fn commit(&mut self, default: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Single,
    Double,
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing usable under the pointer, or the event failed.
    Ignored,
    /// Placeholder leaf, single click on the selected leaf, or the double
    /// click that follows a single click which toggled the same branch.
    Absorbed(NodeId),
    Selected(NodeId),
    Committed(NodeId),
    Expanded(NodeId),
    Collapsed(NodeId),
}

#[derive(Debug, Clone)]
pub struct SelectTreeOptions<K> {
    pub config: ViewportConfig,
    pub symbols: SymbolSet,
    /// Key of the leaf to select initially.
    pub selection: Option<K>,
    /// Passed to [`DialogHost::commit`].
    pub default_button: usize,
}

impl<K> Default for SelectTreeOptions<K> {
    fn default() -> Self {
        Self {
            config: ViewportConfig::default(),
            symbols: SymbolSet::default(),
            selection: None,
            default_button: 0,
        }
    }
}

/// One live session of a selection tree.
///
/// Creating it draws the tree and restores the stored scroll position;
/// dropping it writes the scroll position back, but only when a branch was
/// toggled during the session.
pub struct SelectTree<'a, K, C: Canvas> {
    data: &'a mut TreeData<K>,
    canvas: &'a mut C,
    config: ViewportConfig,
    symbols: SymbolSet,
    registry: SymbolRegistry,
    /// Visible rows, top to bottom.
    rows: Vec<Row>,
    selected: Option<NodeId>,
    /// Key to select as soon as a matching leaf is drawn.
    pending: Option<K>,
    default_button: usize,
    selections: usize,
    expansions: usize,
    /// Branch toggled by the previous click, if it was a single click.
    toggled_by_single: Option<NodeId>,
}

impl<'a, K, C> SelectTree<'a, K, C>
where
    K: PartialEq,
    C: Canvas,
{
    pub fn new(
        data: &'a mut TreeData<K>,
        canvas: &'a mut C,
        options: SelectTreeOptions<K>,
    ) -> Result<Self> {
        let mut tree = Self {
            data,
            canvas,
            config: options.config,
            symbols: options.symbols,
            registry: SymbolRegistry::new(),
            rows: Vec::new(),
            selected: None,
            pending: None,
            default_button: options.default_button,
            selections: 0,
            expansions: 0,
            toggled_by_single: None,
        };

        // Selection flags left over from an earlier session.
        for id in tree.data.arena().selected() {
            tree.data.arena_mut().set_selected(id, false)?;
        }

        tree.draw()?;
        if let Some(key) = options.selection {
            tree.select_key(key)?;
        }

        let view = tree.data.view;
        if tree.config.hbar {
            tree.canvas.xview_moveto(view.xview.0);
        }
        if tree.config.vbar {
            tree.canvas.yview_moveto(view.yview.0);
        }

        info!(
            "select tree opened: {} rows visible of {} nodes, view {:?}",
            tree.rows.len(),
            tree.data.arena().len(),
            view
        );
        Ok(tree)
    }

    pub fn single_click(&mut self, at: Point, host: &mut dyn DialogHost<K>) -> Transition {
        self.click(ClickKind::Single, at, host)
    }

    pub fn double_click(&mut self, at: Point, host: &mut dyn DialogHost<K>) -> Transition {
        self.click(ClickKind::Double, at, host)
    }

    /// Handle a click at a device coordinate.
    ///
    /// Failures are logged and reported as [`Transition::Ignored`]; the tree
    /// is left as it was before the click.
    ///
    /// A double click arrives after the single click of the same gesture. If
    /// that single click toggled the branch now double-clicked, the double
    /// click is absorbed so the gesture toggles once.
    pub fn click(&mut self, kind: ClickKind, at: Point, host: &mut dyn DialogHost<K>) -> Transition {
        let toggled = self.toggled_by_single.take();
        let node = match self.find_node(at) {
            Ok(Some(node)) => node,
            Ok(None) => return Transition::Ignored,
            Err(err @ TreeError::StaleGlyph(_)) => {
                warn!("{:?} click at {:?} ignored: {}", kind, at, err);
                return Transition::Ignored;
            }
            Err(err) => {
                error!("{:?} click at {:?} aborted: {}", kind, at, err);
                return Transition::Ignored;
            }
        };

        let outcome = self
            .plan(kind, node, toggled)
            .and_then(|transition| self.apply(transition, host).map(|()| transition));
        match outcome {
            Ok(transition) => {
                if kind == ClickKind::Single
                    && matches!(transition, Transition::Expanded(_) | Transition::Collapsed(_))
                {
                    self.toggled_by_single = Some(node);
                }
                debug!("{:?} click on node {}: {:?}", kind, node, transition);
                transition
            }
            Err(err) => {
                error!("{:?} click on node {} aborted: {}", kind, node, err);
                Transition::Ignored
            }
        }
    }

    /// Node owning the glyph under a device coordinate.
    pub fn find_node(&self, at: Point) -> Result<Option<NodeId>> {
        let Some(handle) = self.canvas.glyph_at(at) else {
            return Ok(None);
        };
        match self.registry.resolve(handle) {
            Some(node) if self.row_index(node).is_some() => Ok(Some(node)),
            _ => Err(TreeError::StaleGlyph(handle)),
        }
    }

    fn plan(&self, kind: ClickKind, node: NodeId, toggled: Option<NodeId>) -> Result<Transition> {
        let target = self.data.arena().node(node)?;
        let transition = match (kind, &target.kind) {
            (ClickKind::Double, NodeKind::Branch { .. }) if toggled == Some(node) => {
                Transition::Absorbed(node)
            }
            (_, NodeKind::Branch { expanded: true, .. }) => Transition::Collapsed(node),
            (_, NodeKind::Branch { expanded: false, .. }) => Transition::Expanded(node),
            (_, NodeKind::Leaf { key: None, .. }) => Transition::Absorbed(node),
            (ClickKind::Single, NodeKind::Leaf { selected: true, .. }) => {
                Transition::Absorbed(node)
            }
            (ClickKind::Single, NodeKind::Leaf { .. }) => Transition::Selected(node),
            (ClickKind::Double, NodeKind::Leaf { .. }) => Transition::Committed(node),
        };
        Ok(transition)
    }

    fn apply(&mut self, transition: Transition, host: &mut dyn DialogHost<K>) -> Result<()> {
        match transition {
            Transition::Ignored | Transition::Absorbed(_) => {}
            Transition::Selected(node) => {
                self.set_selection(node)?;
                self.selections += 1;
                if let Some(key) = self.selection_key() {
                    host.update_preview(key);
                }
            }
            Transition::Committed(node) => {
                self.set_selection(node)?;
                self.selections += 1;
                host.commit(self.default_button);
            }
            Transition::Expanded(node) | Transition::Collapsed(node) => {
                self.toggle(node)?;
                self.expansions += 1;
            }
        }
        Ok(())
    }

    /// Flip a visible branch and redraw what it affects.
    ///
    /// The branch symbol and its descendants are redrawn; rows below the
    /// subtree keep their glyphs and are moved by the row delta.
    pub fn toggle(&mut self, node: NodeId) -> Result<()> {
        let index = self.row_index(node).ok_or_else(|| {
            TreeError::ContractViolation(format!("node {node} is not visible"))
        })?;
        let depth = self.rows[index].depth;
        let expand = !self.data.arena().node(node)?.is_expanded();

        // Compute the new rows before touching anything, so a failure here
        // leaves the tree as it was.
        let arena = self.data.arena_mut();
        let fresh = if expand {
            let children = arena.contents(node)?.to_vec();
            arena.flatten(&children, depth + 1)?
        } else {
            Vec::new()
        };
        arena.set_expanded(node, expand)?;

        let end = index + 1 + self.subtree_len(index);
        let removed: Vec<Row> = self
            .rows
            .splice(index + 1..end, fresh.iter().copied())
            .collect();
        for row in &removed {
            for handle in self.registry.evict(row.node).handles() {
                self.canvas.delete(handle);
            }
        }

        let delta = (fresh.len() as i32 - removed.len() as i32) * self.config.row_height();
        if delta != 0 {
            for row in &self.rows[index + 1 + fresh.len()..] {
                for handle in self.registry.glyphs(row.node).handles() {
                    self.canvas.move_glyph(handle, 0, delta);
                }
            }
        }

        if let Some(handle) = self.registry.evict_role(node, GlyphRole::Symbol) {
            self.canvas.delete(handle);
        }
        self.draw_symbol(node, self.position(index, depth))?;
        for offset in 1..=fresh.len() {
            self.draw_row(index + offset)?;
        }
        self.update_scroll_region();

        debug!(
            "toggle: node={} expanded={} removed={} added={}",
            node,
            expand,
            removed.len(),
            fresh.len()
        );
        Ok(())
    }

    /// Select the first visible leaf with `key`, or remember the key until
    /// such a leaf is drawn.
    pub fn select_key(&mut self, key: K) -> Result<()> {
        let found = self.rows.iter().map(|row| row.node).find(|&id| {
            self.data
                .arena()
                .get(id)
                .and_then(|node| node.key())
                .is_some_and(|candidate| *candidate == key)
        });
        match found {
            Some(node) => self.set_selection(node),
            None => {
                self.clear_selection()?;
                self.pending = Some(key);
                Ok(())
            }
        }
    }

    pub fn clear_selection(&mut self) -> Result<()> {
        self.pending = None;
        if let Some(old) = self.selected.take() {
            self.data.arena_mut().set_selected(old, false)?;
            self.redraw_label(old)?;
        }
        Ok(())
    }

    fn set_selection(&mut self, node: NodeId) -> Result<()> {
        if self.selected == Some(node) {
            return Ok(());
        }
        // Refuses placeholders before the old selection is touched.
        self.data.arena_mut().set_selected(node, true)?;
        self.pending = None;
        if let Some(old) = self.selected.replace(node) {
            self.data.arena_mut().set_selected(old, false)?;
            self.redraw_label(old)?;
        }
        self.redraw_label(node)
    }

    fn adopt_pending(&mut self, node: NodeId) -> Result<()> {
        if self.selected.is_some() {
            return Ok(());
        }
        let Some(pending) = &self.pending else {
            return Ok(());
        };
        if self.data.arena().node(node)?.key() == Some(pending) {
            self.data.arena_mut().set_selected(node, true)?;
            self.selected = Some(node);
            self.pending = None;
            debug!("selection: pending key adopted by node {}", node);
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let roots = self.data.arena().roots().to_vec();
        self.rows = self.data.arena_mut().flatten(&roots, 0)?;
        for index in 0..self.rows.len() {
            self.draw_row(index)?;
        }
        self.update_scroll_region();
        Ok(())
    }

    fn draw_row(&mut self, index: usize) -> Result<()> {
        let row = self.rows[index];
        let at = self.position(index, row.depth);
        self.adopt_pending(row.node)?;
        self.draw_symbol(row.node, at)?;
        self.draw_label(row.node, at)
    }

    /// Draw the symbol of `node` at `at`, unless it already has one.
    pub fn draw_symbol(&mut self, node: NodeId, at: Point) -> Result<()> {
        if self.registry.owns(node, GlyphRole::Symbol) {
            return Ok(());
        }
        let variant = self.data.arena().node(node)?.variant();
        let handle = self
            .canvas
            .create_symbol(at, variant, self.symbols.glyph(variant));
        if let Some(stale) = self.registry.record(node, GlyphRole::Symbol, handle) {
            self.canvas.delete(stale);
        }
        Ok(())
    }

    fn draw_label(&mut self, node: NodeId, symbol_at: Point) -> Result<()> {
        if self.registry.owns(node, GlyphRole::Label) {
            return Ok(());
        }
        let style = self.config.style;
        let at = Point::new(
            symbol_at.x + style.symbol_width + style.label_gap,
            symbol_at.y,
        );
        let target = self.data.arena().node(node)?;
        let handle = self
            .canvas
            .create_label(at, &target.text, target.is_selected());
        if let Some(stale) = self.registry.record(node, GlyphRole::Label, handle) {
            self.canvas.delete(stale);
        }
        Ok(())
    }

    fn redraw_label(&mut self, node: NodeId) -> Result<()> {
        let Some(index) = self.row_index(node) else {
            return Ok(());
        };
        if let Some(handle) = self.registry.evict_role(node, GlyphRole::Label) {
            self.canvas.delete(handle);
        }
        let at = self.position(index, self.rows[index].depth);
        self.draw_label(node, at)
    }

    fn update_scroll_region(&mut self) {
        let style = self.config.style;
        let mut width = 0;
        for (index, row) in self.rows.iter().enumerate() {
            let text = self
                .data
                .arena()
                .get(row.node)
                .map(|node| node.text.as_str())
                .unwrap_or_default();
            let right = self.position(index, row.depth).x
                + style.symbol_width
                + style.label_gap
                + self.canvas.text_width(text) as i32;
            width = width.max(right);
        }
        let height = style.margin * 2 + self.rows.len() as i32 * self.config.row_height();
        self.canvas
            .set_scroll_region((width + style.margin).max(0) as u32, height.max(0) as u32);
    }

    /// Canvas position of the symbol in row `index`.
    fn position(&self, index: usize, depth: u16) -> Point {
        let style = &self.config.style;
        Point::new(
            style.margin + depth as i32 * style.distx,
            style.margin + index as i32 * self.config.row_height(),
        )
    }

    /// Number of rows below `index` that belong to its subtree.
    fn subtree_len(&self, index: usize) -> usize {
        let depth = self.rows[index].depth;
        self.rows[index + 1..]
            .iter()
            .take_while(|row| row.depth > depth)
            .count()
    }

    fn row_index(&self, node: NodeId) -> Option<usize> {
        self.rows.iter().position(|row| row.node == node)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Whether a visible branch is still waiting on a background load.
    pub fn is_loading(&self) -> bool {
        let arena = self.data.arena();
        self.rows.iter().any(|row| !arena.is_ready(row.node))
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.row_index(node).is_some()
    }

    /// Canvas position of the symbol of a visible node.
    pub fn position_of(&self, node: NodeId) -> Option<Point> {
        let index = self.row_index(node)?;
        Some(self.position(index, self.rows[index].depth))
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Key of the selected leaf, or the key still waiting for its leaf.
    pub fn selection_key(&self) -> Option<&K> {
        match self.selected {
            Some(node) => self.data.arena().get(node).and_then(|node| node.key()),
            None => self.pending.as_ref(),
        }
    }

    pub fn selections(&self) -> usize {
        self.selections
    }

    pub fn expansions(&self) -> usize {
        self.expansions
    }

    pub fn visible_rows(&self) -> u32 {
        self.config.visible_rows()
    }

    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    pub fn arena(&self) -> &NodeArena<K> {
        self.data.arena()
    }

    pub fn canvas(&self) -> &C {
        self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        self.canvas
    }
}

impl<K, C: Canvas> Drop for SelectTree<'_, K, C> {
    fn drop(&mut self) {
        if self.expansions > 0 {
            self.data.view = TreeViewState {
                xview: self.canvas.xview(),
                yview: self.canvas.yview(),
            };
            debug!("select tree: saved view {:?}", self.data.view);
        }
        for handle in self.registry.drain() {
            self.canvas.delete(handle);
        }
        info!(
            "select tree closed: {} selections, {} expansions",
            self.selections, self.expansions
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeStyle;
    use crate::tree::canvas::SymbolVariant;
    use crate::tree::node::{Contents, NodeSpec};
    use crate::tui::canvas::TerminalCanvas;

    #[derive(Default)]
    struct Recorder {
        previews: Vec<&'static str>,
        commits: Vec<usize>,
    }

    impl DialogHost<&'static str> for Recorder {
        fn update_preview(&mut self, key: &&'static str) {
            self.previews.push(*key);
        }

        fn commit(&mut self, default: usize) {
            self.commits.push(default);
        }
    }

    fn options() -> SelectTreeOptions<&'static str> {
        SelectTreeOptions {
            config: ViewportConfig {
                height: Some(10),
                style: TreeStyle::cells(),
                ..Default::default()
            },
            default_button: 1,
            ..Default::default()
        }
    }

    fn games() -> TreeData<&'static str> {
        TreeData::new(vec![
            NodeSpec::branch(
                "Klondike type",
                Contents::fixed(vec![
                    NodeSpec::leaf("klondike", "Klondike"),
                    NodeSpec::leaf("whitehead", "Whitehead"),
                ]),
            ),
            NodeSpec::branch(
                "Spider type",
                Contents::fixed(vec![NodeSpec::leaf("spider", "Spider")]),
            ),
            NodeSpec::placeholder("(no game)"),
        ])
    }

    fn node_by_text<C: Canvas>(tree: &SelectTree<'_, &'static str, C>, text: &str) -> NodeId {
        tree.rows()
            .iter()
            .map(|row| row.node)
            .find(|id| tree.arena().get(*id).unwrap().text == text)
            .unwrap_or_else(|| panic!("{text} is not visible"))
    }

    fn at<C: Canvas>(tree: &SelectTree<'_, &'static str, C>, text: &str) -> Point {
        tree.position_of(node_by_text(tree, text)).unwrap()
    }

    #[test]
    fn toggle_moves_rows_below_instead_of_redrawing_them() {
        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        let spider = node_by_text(&tree, "Spider type");
        let before = tree.registry().glyphs(spider);

        let klondike = at(&tree, "Klondike type");
        assert_eq!(
            tree.single_click(klondike, &mut host),
            Transition::Expanded(node_by_text(&tree, "Klondike type"))
        );

        assert_eq!(tree.registry().glyphs(spider), before);
        assert_eq!(tree.position_of(spider), Some(Point::new(0, 3)));
        assert_eq!(tree.canvas().glyph_at(Point::new(0, 3)), before.symbol);
        let branch = tree.registry().glyphs(node_by_text(&tree, "Klondike type"));
        assert_eq!(
            tree.canvas().symbol_variant(branch.symbol.unwrap()),
            Some(SymbolVariant::Expanded)
        );
    }

    #[test]
    fn collapse_removes_descendant_glyphs() {
        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        let branch = at(&tree, "Klondike type");
        tree.single_click(branch, &mut host);
        let whitehead = node_by_text(&tree, "Whitehead");
        let glyphs = tree.registry().glyphs(whitehead);
        assert_eq!(tree.registry().len(), 2 * 5);

        tree.single_click(branch, &mut host);
        assert!(!tree.is_visible(whitehead));
        for handle in glyphs.handles() {
            assert_eq!(tree.registry().resolve(handle), None);
            assert!(!tree.canvas().contains(handle));
        }
        assert_eq!(tree.registry().len(), 2 * 3);
        let placeholder = node_by_text(&tree, "(no game)");
        assert_eq!(tree.position_of(placeholder), Some(Point::new(0, 2)));
    }

    #[test]
    fn draw_symbol_is_idempotent() {
        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        let node = node_by_text(&tree, "Spider type");
        let glyphs = tree.registry().glyphs(node);
        let count = tree.canvas().len();

        tree.draw_symbol(node, Point::new(5, 5)).unwrap();
        assert_eq!(tree.registry().glyphs(node), glyphs);
        assert_eq!(tree.canvas().len(), count);
    }

    #[test]
    fn selection_redraws_labels_of_old_and_new_leaf() {
        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        tree.single_click(at(&tree, "Klondike type"), &mut host);
        tree.single_click(at(&tree, "Klondike"), &mut host);
        tree.single_click(at(&tree, "Whitehead"), &mut host);

        let klondike = node_by_text(&tree, "Klondike");
        let whitehead = node_by_text(&tree, "Whitehead");
        let label = |node| tree.registry().glyphs(node).label.unwrap();
        assert_eq!(tree.canvas().label_selected(label(klondike)), Some(false));
        assert_eq!(tree.canvas().label_selected(label(whitehead)), Some(true));
        assert_eq!(host.previews, vec!["klondike", "whitehead"]);
        assert_eq!(tree.arena().selected(), vec![whitehead]);
    }

    #[test]
    fn clicking_a_label_resolves_to_its_node() {
        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        let symbol = at(&tree, "Spider type");
        let label = Point::new(symbol.x + 4, symbol.y);
        assert!(matches!(
            tree.single_click(label, &mut host),
            Transition::Expanded(_)
        ));
    }

    #[test]
    fn empty_space_and_stale_glyphs_are_ignored() {
        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        assert_eq!(
            tree.single_click(Point::new(30, 9), &mut host),
            Transition::Ignored
        );

        // A glyph the registry knows nothing about.
        let stray = tree
            .canvas_mut()
            .create_symbol(Point::new(20, 8), SymbolVariant::Leaf, "*");
        assert_eq!(tree.find_node(Point::new(20, 8)), Err(TreeError::StaleGlyph(stray)));
        assert_eq!(
            tree.double_click(Point::new(20, 8), &mut host),
            Transition::Ignored
        );
        assert!(host.previews.is_empty());
        assert!(host.commits.is_empty());
        assert_eq!(tree.expansions(), 0);
    }

    #[test]
    fn toggling_a_leaf_is_rejected_without_side_effects() {
        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        let placeholder = node_by_text(&tree, "(no game)");
        let rows = tree.rows().to_vec();
        assert!(matches!(
            tree.toggle(placeholder),
            Err(TreeError::ContractViolation(_))
        ));
        assert_eq!(tree.rows(), rows.as_slice());
    }

    #[test]
    fn pending_selection_is_adopted_when_leaf_appears() {
        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(
            &mut data,
            &mut canvas,
            SelectTreeOptions {
                selection: Some("spider"),
                ..options()
            },
        )
        .unwrap();

        assert_eq!(tree.selected(), None);
        assert_eq!(tree.selection_key(), Some(&"spider"));

        tree.single_click(at(&tree, "Spider type"), &mut host);
        let spider = node_by_text(&tree, "Spider");
        assert_eq!(tree.selected(), Some(spider));
        assert!(tree.arena().get(spider).unwrap().is_selected());
        assert!(host.previews.is_empty());
    }

    #[test]
    fn teardown_deletes_every_glyph() {
        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        {
            let tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();
            assert_eq!(tree.canvas().len(), 6);
        }
        assert_eq!(canvas.len(), 0);
    }

    fn keyed() -> TreeData<&'static str> {
        TreeData::new(vec![NodeSpec::branch(
            "R",
            Contents::fixed(vec![
                NodeSpec::leaf("a", "L1"),
                NodeSpec::placeholder("no selection"),
            ]),
        )])
    }

    #[test]
    fn select_then_confirm_a_leaf() {
        let mut data = keyed();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        let root = node_by_text(&tree, "R");
        assert_eq!(tree.single_click(at(&tree, "R"), &mut host), Transition::Expanded(root));
        assert!(tree.arena().get(root).unwrap().is_expanded());

        let empty = node_by_text(&tree, "no selection");
        assert_eq!(
            tree.single_click(at(&tree, "no selection"), &mut host),
            Transition::Absorbed(empty)
        );
        assert_eq!(tree.selected(), None);
        assert!(host.previews.is_empty());

        let leaf = node_by_text(&tree, "L1");
        assert_eq!(tree.single_click(at(&tree, "L1"), &mut host), Transition::Selected(leaf));
        assert_eq!(
            tree.double_click(at(&tree, "L1"), &mut host),
            Transition::Committed(leaf)
        );
        assert_eq!(host.previews, vec!["a"]);
        assert_eq!(host.commits, vec![1]);
        assert_eq!(tree.selected(), Some(leaf));
        assert_eq!(tree.selections(), 2);
        assert_eq!(tree.expansions(), 1);
    }

    #[test]
    fn second_single_click_on_selected_leaf_is_absorbed() {
        let mut data = keyed();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        tree.single_click(at(&tree, "R"), &mut host);
        let leaf = node_by_text(&tree, "L1");
        tree.single_click(at(&tree, "L1"), &mut host);
        assert_eq!(tree.single_click(at(&tree, "L1"), &mut host), Transition::Absorbed(leaf));
        assert_eq!(host.previews, vec!["a"]);
        assert_eq!(tree.selections(), 1);
    }

    #[test]
    fn at_most_one_leaf_is_selected() {
        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        tree.single_click(at(&tree, "Klondike type"), &mut host);
        tree.single_click(at(&tree, "Spider type"), &mut host);
        for name in ["Klondike", "Spider", "Whitehead", "Spider", "Klondike"] {
            tree.single_click(at(&tree, name), &mut host);
            assert_eq!(tree.arena().selected().len(), 1);
        }
        assert_eq!(tree.selected(), Some(node_by_text(&tree, "Klondike")));
        assert_eq!(host.previews.len(), 5);
    }

    #[test]
    fn double_click_on_placeholder_never_commits() {
        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        let placeholder = node_by_text(&tree, "(no game)");
        assert_eq!(
            tree.double_click(at(&tree, "(no game)"), &mut host),
            Transition::Absorbed(placeholder)
        );
        assert!(host.commits.is_empty());
        assert_eq!(tree.selected(), None);
    }

    #[test]
    fn each_click_on_a_branch_toggles_once() {
        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        let branch = node_by_text(&tree, "Spider type");
        let point = at(&tree, "Spider type");
        assert_eq!(tree.single_click(point, &mut host), Transition::Expanded(branch));
        // Second half of the same gesture.
        assert_eq!(tree.double_click(point, &mut host), Transition::Absorbed(branch));
        assert_eq!(tree.expansions(), 1);
        // A double click on its own still toggles.
        assert_eq!(tree.double_click(point, &mut host), Transition::Collapsed(branch));
        assert_eq!(tree.double_click(point, &mut host), Transition::Expanded(branch));
        assert_eq!(tree.expansions(), 3);
        assert!(host.commits.is_empty());
    }

    fn long_tree() -> TreeData<&'static str> {
        const NAMES: [&str; 12] = [
            "g0", "g1", "g2", "g3", "g4", "g5", "g6", "g7", "g8", "g9", "g10", "g11",
        ];
        TreeData::new(vec![
            NodeSpec::branch(
                "Games",
                Contents::fixed(NAMES.iter().map(|name| NodeSpec::leaf(*name, *name)).collect()),
            )
            .expanded(true),
            NodeSpec::branch("More", Contents::fixed(vec![NodeSpec::leaf("more", "more")])),
        ])
    }

    #[test]
    fn view_is_kept_when_nothing_was_expanded() {
        let prior = TreeViewState {
            xview: (0.0, 1.0),
            yview: (0.25, 0.75),
        };
        let mut data = long_tree().with_view(prior);
        let mut canvas = TerminalCanvas::new(40, 5);
        {
            let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();
            tree.canvas_mut().scroll_by(0, 3);
            let mut host = Recorder::default();
            // Offset 7 puts g6 on the first visible row.
            tree.single_click(Point::new(2, 0), &mut host);
            assert_eq!(host.previews, vec!["g6"]);
        }
        assert_eq!(data.view, prior);
    }

    #[test]
    fn stored_vertical_position_is_restored() {
        let mut data = keyed().with_view(TreeViewState {
            xview: (0.2, 1.0),
            yview: (0.0, 0.5),
        });
        let mut canvas = TerminalCanvas::new(40, 10);
        let tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        assert_eq!(tree.canvas().yview().0, 0.0);
        assert_eq!(tree.canvas().offset().1, 0);
    }

    #[test]
    fn expansion_writes_view_back_for_the_next_session() {
        let mut data = long_tree();
        let mut canvas = TerminalCanvas::new(40, 5);
        let mut host = Recorder::default();
        {
            let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();
            tree.canvas_mut().scroll_by(0, 10);
            let more = node_by_text(&tree, "More");
            // Scrolled to the bottom, "More" sits on the last visible row.
            assert_eq!(tree.single_click(Point::new(0, 4), &mut host), Transition::Expanded(more));
        }
        let saved = data.view;
        assert!(saved.yview.0 > 0.0);
        assert_eq!(saved.xview, (0.0, 1.0));

        let mut canvas = TerminalCanvas::new(40, 5);
        let tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();
        assert_eq!(tree.canvas().yview(), saved.yview);
        assert!(tree.is_visible(node_by_text(&tree, "more")));
    }

    #[test]
    fn lazy_contents_are_loaded_once_across_sessions() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut data = TreeData::new(vec![NodeSpec::branch(
            "All games",
            Contents::lazy(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                vec![NodeSpec::leaf("klondike", "Klondike")]
            }),
        )]);
        let mut host = Recorder::default();

        for _ in 0..2 {
            let mut canvas = TerminalCanvas::new(40, 10);
            let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();
            let point = at(&tree, "All games");
            tree.single_click(point, &mut host);
            tree.single_click(point, &mut host);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn selection_survives_reopening_through_options() {
        let mut data = games();
        let mut host = Recorder::default();
        let key = {
            let mut canvas = TerminalCanvas::new(40, 10);
            let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();
            tree.single_click(at(&tree, "Klondike type"), &mut host);
            tree.single_click(at(&tree, "Whitehead"), &mut host);
            tree.selection_key().copied()
        };

        let mut canvas = TerminalCanvas::new(40, 10);
        let tree = SelectTree::new(
            &mut data,
            &mut canvas,
            SelectTreeOptions {
                selection: key,
                ..options()
            },
        )
        .unwrap();
        let whitehead = node_by_text(&tree, "Whitehead");
        assert_eq!(tree.selected(), Some(whitehead));
        assert_eq!(tree.arena().selected(), vec![whitehead]);
    }

    #[test]
    fn terminal_double_click_on_branch_toggles_once() {
        use std::time::{Duration, Instant};

        use crossterm::event::{Event, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

        use crate::event::{ClickTracker, DialogEvent, translate};

        let mut data = games();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        let branch = node_by_text(&tree, "Klondike type");
        let point = at(&tree, "Klondike type");
        let press = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: point.x as u16,
            row: point.y as u16,
            modifiers: KeyModifiers::NONE,
        });
        let mut clicks = ClickTracker::default();
        let start = Instant::now();

        let mut transitions = Vec::new();
        for now in [start, start + Duration::from_millis(150)] {
            if let Some(DialogEvent::Click(kind, column, row)) =
                translate(press.clone(), &mut clicks, now)
            {
                let at = Point::new(column as i32, row as i32);
                transitions.push(tree.click(kind, at, &mut host));
            }
        }

        assert_eq!(
            transitions,
            vec![Transition::Expanded(branch), Transition::Absorbed(branch)]
        );
        assert!(tree.arena().get(branch).unwrap().is_expanded());
        assert_eq!(tree.expansions(), 1);
    }

    #[test]
    fn double_click_on_unselected_leaf_commits_without_preview() {
        let mut data = keyed();
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        tree.single_click(at(&tree, "R"), &mut host);
        let leaf = node_by_text(&tree, "L1");
        assert_eq!(
            tree.double_click(at(&tree, "L1"), &mut host),
            Transition::Committed(leaf)
        );

        assert!(host.previews.is_empty());
        assert_eq!(host.commits, vec![1]);
        assert_eq!(tree.selected(), Some(leaf));
        assert_eq!(tree.selections(), 1);
        assert_eq!(tree.arena().selected(), vec![leaf]);
    }

    #[test]
    fn panicking_lazy_branch_does_not_unwind_into_the_host() {
        let mut data = TreeData::new(vec![
            NodeSpec::branch("Broken", Contents::lazy(|| panic!("catalog missing"))),
            NodeSpec::leaf("golf", "Golf"),
        ]);
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        let broken = node_by_text(&tree, "Broken");
        assert_eq!(
            tree.single_click(at(&tree, "Broken"), &mut host),
            Transition::Expanded(broken)
        );
        assert_eq!(tree.rows().len(), 2);
        assert_eq!(tree.position_of(node_by_text(&tree, "Golf")), Some(Point::new(0, 1)));
    }

    #[test]
    fn nested_background_branch_reports_loading() {
        use std::sync::mpsc;

        let (release, gate) = mpsc::channel::<()>();
        let mut data = TreeData::new(vec![
            NodeSpec::branch(
                "Games",
                Contents::fixed(vec![NodeSpec::branch(
                    "Recently played",
                    Contents::background(move || {
                        gate.recv().ok();
                        vec![NodeSpec::leaf("golf", "Golf")]
                    }),
                )]),
            )
            .expanded(true),
        ]);
        let mut canvas = TerminalCanvas::new(40, 10);
        let mut host = Recorder::default();
        let mut tree = SelectTree::new(&mut data, &mut canvas, options()).unwrap();

        assert!(tree.is_loading());

        release.send(()).unwrap();
        let recent = node_by_text(&tree, "Recently played");
        assert_eq!(
            tree.single_click(at(&tree, "Recently played"), &mut host),
            Transition::Expanded(recent)
        );
        assert!(!tree.is_loading());
        assert!(tree.is_visible(node_by_text(&tree, "Golf")));
    }
}
