//! A layout engine arranging windows in a tree of weighted splits.
//!
//! The engine is a value. Every operation returns a new engine built from
//! the old one by path copying; nodes off the changed path are shared. When
//! an operation does not apply, the returned engine is a clone that
//! [`TreeLayoutEngine::ptr_eq`]s the original.

mod helpers;
mod node;
mod resize;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use self::helpers::{Path, WindowIndex};
pub use self::node::{LeafKind, LeafNode, Node, NodeRef, SplitNode};
use crate::common::config::TreeLayoutSettings;
use crate::layout_engine::{
    Direction, LayoutEngine, LayoutEngineAction, LayoutEngineIdentity, LayoutError,
    TreeLayoutContext, WindowSize, WindowState,
};
use crate::model::{Monitor, WindowId, WindowRef};
use crate::sys::geometry::{Point, Rect, Rectangle};

#[derive(Clone)]
pub struct TreeLayoutEngine {
    identity: LayoutEngineIdentity,
    context: Arc<dyn TreeLayoutContext>,
    settings: Arc<TreeLayoutSettings>,
    root: Option<NodeRef>,
    windows: WindowIndex,
    minimized: Arc<Vec<LeafNode>>,
}

impl fmt::Debug for TreeLayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeLayoutEngine")
            .field("identity", &self.identity)
            .field("name", &self.settings.name)
            .field("windows", &self.windows.len())
            .field("minimized", &self.minimized.len())
            .finish()
    }
}

impl TreeLayoutEngine {
    pub fn new(context: Arc<dyn TreeLayoutContext>, settings: TreeLayoutSettings) -> Self {
        TreeLayoutEngine {
            identity: LayoutEngineIdentity::new(),
            context,
            settings: Arc::new(settings),
            root: None,
            windows: WindowIndex::default(),
            minimized: Arc::default(),
        }
    }

    pub fn settings(&self) -> &TreeLayoutSettings { &self.settings }

    pub fn root(&self) -> Option<&NodeRef> { self.root.as_ref() }

    /// Whether `other` is this engine unchanged, sharing all of its state.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        let same_root = match (&self.root, &other.root) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.identity == other.identity
            && same_root
            && self.windows.ptr_eq(&other.windows)
            && Arc::ptr_eq(&self.minimized, &other.minimized)
    }

    pub fn is_minimized(&self, window: WindowId) -> bool {
        self.minimized.iter().any(|leaf| leaf.id() == window)
    }

    pub fn draw_tree(&self) -> String {
        let Some(root) = &self.root else {
            return "(empty)\n".to_string();
        };
        let mut out = String::new();
        match ascii_tree::write_tree(&mut out, &ascii(root, 1.0)) {
            Ok(()) => out,
            Err(err) => {
                warn!(%err, "failed to draw tree");
                String::new()
            }
        }
    }

    fn with_root(&self, root: Option<NodeRef>) -> Self {
        let mut windows = self.windows.clone();
        helpers::reindex_windows(&mut windows, self.root.as_ref(), root.as_ref());
        TreeLayoutEngine { root, windows, ..self.clone() }
    }

    fn with_minimized(&self, minimized: Vec<LeafNode>) -> Self {
        TreeLayoutEngine { minimized: Arc::new(minimized), ..self.clone() }
    }

    fn path_of(&self, window: WindowId) -> Option<&Path> { self.windows.get(&window) }

    fn leaf(&self, path: &[usize]) -> Option<&LeafNode> {
        helpers::leaf_at_path(self.root.as_ref()?, path)
    }

    /// The kind `window` is held as, in the tree or among the minimized.
    fn held_kind(&self, window: WindowId) -> Option<LeafKind> {
        if let Some(path) = self.path_of(window) {
            return self.leaf(path).map(|leaf| leaf.kind);
        }
        self.minimized.iter().find(|leaf| leaf.id() == window).map(|leaf| leaf.kind)
    }

    fn add_direction(&self) -> Direction {
        let direction = self.context.add_window_direction(self.identity);
        if direction.is_cardinal() {
            return direction;
        }
        warn!(%direction, "add direction must be cardinal, using the configured default");
        if self.settings.default_add_direction.is_cardinal() {
            self.settings.default_add_direction
        } else {
            Direction::RIGHT
        }
    }

    /// Inserts a new leaf next to the last focused window.
    fn insert(&self, window: WindowRef, kind: LeafKind) -> Self {
        let direction = self.add_direction();
        let anchor = self
            .context
            .last_focused_window(self.identity)
            .and_then(|focused| self.path_of(focused))
            .cloned();
        trace!(?anchor, %direction, "inserting");
        let node = Node::leaf(window, kind);
        let root = helpers::insert_beside(self.root.as_ref(), anchor.as_deref(), node, direction);
        self.with_root(Some(root))
    }

    /// Inserts `window` beside the leaf under `point`. `None` if the point
    /// is not over any leaf.
    fn insert_at_point(&self, window: WindowRef, kind: LeafKind, point: Point) -> Option<Self> {
        let node = Node::leaf(window, kind);
        let Some(root) = &self.root else {
            return Some(self.with_root(Some(node)));
        };
        let (anchor, rect) = match &**root {
            Node::Leaf(_) => (Vec::new(), Rect::unit()),
            Node::Split(_) => helpers::leaf_at_point(root, point)?,
        };
        let direction = helpers::direction_from_point(rect.to_local(point));
        trace!(?anchor, %direction, "inserting at point");
        let root = helpers::insert_beside(Some(root), Some(anchor.as_slice()), node, direction);
        Some(self.with_root(Some(root)))
    }

    fn remove_from_tree(&self, path: &[usize]) -> Self {
        let root = self.root.as_ref().and_then(|root| helpers::remove_at_path(root, path));
        self.with_root(root)
    }

    fn without_minimized(&self, window: WindowId) -> Self {
        let minimized =
            self.minimized.iter().filter(|leaf| leaf.id() != window).cloned().collect();
        self.with_minimized(minimized)
    }

    fn neighbour(&self, direction: Direction, window: WindowId) -> Option<(Path, Path)> {
        let root = self.root.as_ref()?;
        let source = self.path_of(window)?;
        let target = helpers::adjacent_leaf(root, source, direction)?;
        Some((source.clone(), target))
    }
}

fn ascii(node: &NodeRef, weight: f64) -> ascii_tree::Tree {
    match &**node {
        Node::Leaf(leaf) => {
            let phantom = if leaf.is_phantom() { " (phantom)" } else { "" };
            ascii_tree::Tree::Leaf(vec![format!("{} [{weight}]{phantom}", leaf.id())])
        }
        Node::Split(split) => {
            let children = split
                .children()
                .zip(split.weights())
                .map(|(child, weight)| ascii(child, weight))
                .collect();
            ascii_tree::Tree::Node(format!("{:?} [{weight}]", split.orientation()), children)
        }
    }
}

impl LayoutEngine for TreeLayoutEngine {
    fn identity(&self) -> LayoutEngineIdentity { self.identity }

    fn name(&self) -> &str { &self.settings.name }

    fn count(&self) -> usize { self.windows.len() + self.minimized.len() }

    fn contains(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window) || self.is_minimized(window)
    }

    fn add(&self, window: WindowRef) -> Self {
        let wid = window.id();
        debug!(%wid, "add");
        if self.is_minimized(wid) {
            return self.minimize_window_end(window);
        }
        if self.windows.contains_key(&wid) {
            debug!(%wid, "window already in layout");
            return self.clone();
        }
        self.insert(window, LeafKind::Window)
    }

    fn remove(&self, window: WindowId) -> Self {
        debug!(%window, "remove");
        if let Some(path) = self.path_of(window) {
            return self.remove_from_tree(path);
        }
        if self.is_minimized(window) {
            return self.without_minimized(window);
        }
        debug!(%window, "window not in layout");
        self.clone()
    }

    fn get_first_window(&self) -> Option<WindowRef> {
        let root = self.root.as_ref()?;
        helpers::leaves(root)
            .into_iter()
            .find(|(_, leaf)| !leaf.is_phantom())
            .map(|(_, leaf)| leaf.window.clone())
    }

    fn focus_window_in_direction(&self, direction: Direction, window: WindowId) -> Self {
        debug!(%direction, %window, "focus in direction");
        let Some((_, target)) = self.neighbour(direction, window) else {
            return self.clone();
        };
        match self.leaf(&target) {
            Some(leaf) if !leaf.is_phantom() => leaf.window.focus(),
            _ => debug!("neighbour is a phantom window"),
        }
        self.clone()
    }

    fn swap_window_in_direction(&self, direction: Direction, window: WindowId) -> Self {
        debug!(%direction, %window, "swap in direction");
        let (Some(root), Some((source, target))) = (&self.root, self.neighbour(direction, window))
        else {
            return self.clone();
        };
        let (Some(from), Some(to)) = (self.leaf(&source), self.leaf(&target)) else {
            return self.clone();
        };
        if to.is_phantom() || from.is_phantom() {
            debug!("not swapping with a phantom window");
            return self.clone();
        }
        let from: NodeRef = Arc::new(Node::Leaf(from.clone()));
        let to: NodeRef = Arc::new(Node::Leaf(to.clone()));
        let root = helpers::replace_at_path(root, &source, |_| to);
        let root = helpers::replace_at_path(&root, &target, |_| from);
        self.with_root(Some(root))
    }

    fn move_window_to_point(&self, window: WindowRef, point: Point) -> Self {
        let wid = window.id();
        debug!(%wid, x = point.x, y = point.y, "move to point");
        let kind = self.held_kind(wid);
        let base = if kind.is_some() { self.remove(wid) } else { self.clone() };
        match base.insert_at_point(window, kind.unwrap_or(LeafKind::Window), point) {
            Some(moved) => moved,
            None => {
                debug!("point is not over any window");
                self.clone()
            }
        }
    }

    fn move_window_edges_in_direction(
        &self,
        edges: Direction,
        deltas: Point,
        window: WindowId,
    ) -> Self {
        debug!(%edges, dx = deltas.x, dy = deltas.y, %window, "move edges");
        let (Some(root), Some(path)) = (&self.root, self.path_of(window)) else {
            return self.clone();
        };
        match resize::move_edges(
            root,
            path,
            edges,
            deltas.x,
            deltas.y,
            self.settings.min_pane_fraction,
        ) {
            Some(root) => self.with_root(Some(root)),
            None => self.clone(),
        }
    }

    fn minimize_window_start(&self, window: WindowRef) -> Self {
        let wid = window.id();
        debug!(%wid, "minimize start");
        if self.is_minimized(wid) {
            return self.clone();
        }
        let kind = self.held_kind(wid).unwrap_or(LeafKind::Window);
        let base = match self.path_of(wid) {
            Some(path) => self.remove_from_tree(path),
            None => self.clone(),
        };
        let mut minimized = (*base.minimized).clone();
        minimized.push(LeafNode { window, kind });
        base.with_minimized(minimized)
    }

    fn minimize_window_end(&self, window: WindowRef) -> Self {
        let wid = window.id();
        debug!(%wid, "minimize end");
        if self.windows.contains_key(&wid) {
            return self.clone();
        }
        let kind = self.held_kind(wid).unwrap_or(LeafKind::Window);
        let base = if self.is_minimized(wid) { self.without_minimized(wid) } else { self.clone() };
        base.insert(window, kind)
    }

    fn do_layout(&self, rectangle: Rectangle, monitor: &Monitor) -> Vec<WindowState> {
        trace!(?rectangle, monitor = %monitor.name, "do layout");
        let mut states = Vec::with_capacity(self.count());
        if let Some(root) = &self.root {
            states.extend(helpers::layout_leaves(root, rectangle.to_rect()).into_iter().map(
                |(_, leaf, rect)| WindowState {
                    window: leaf.window.clone(),
                    rectangle: Rectangle::from(rect),
                    size: WindowSize::Normal,
                },
            ));
        }
        states.extend(self.minimized.iter().map(|leaf| WindowState {
            window: leaf.window.clone(),
            rectangle: Rectangle::default(),
            size: WindowSize::Minimized,
        }));
        states
    }

    fn add_phantom_window(&self, window: WindowRef) -> Result<Self, LayoutError> {
        let wid = window.id();
        debug!(%wid, "add phantom");
        if self.contains(wid) {
            return Err(LayoutError::DuplicatePhantom(wid));
        }
        Ok(self.insert(window, LeafKind::Phantom))
    }

    fn remove_phantom_window(&self, window: WindowId) -> Result<Self, LayoutError> {
        debug!(%window, "remove phantom");
        match self.held_kind(window) {
            None => Ok(self.clone()),
            Some(LeafKind::Window) => Err(LayoutError::NotPhantom(window)),
            Some(LeafKind::Phantom) => Ok(self.remove(window)),
        }
    }

    fn hide_phantom_windows(&self) {
        let Some(root) = &self.root else {
            return;
        };
        for (_, leaf) in helpers::leaves(root) {
            if leaf.is_phantom() {
                leaf.window.hide();
            }
        }
    }

    fn perform_custom_action(&self, action: &LayoutEngineAction) -> Result<Self, LayoutError> {
        if action.target != self.identity {
            return Err(LayoutError::IdentityMismatch {
                expected: action.target,
                actual: self.identity,
            });
        }
        debug!(name = %action.name, "custom action not handled by tree layout");
        Ok(self.clone())
    }
}
