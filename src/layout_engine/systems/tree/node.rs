//! Immutable tree nodes. A node is never changed after it is built; every
//! edit produces new nodes along one path and shares everything else.

use std::sync::Arc;

use crate::layout_engine::Orientation;
use crate::model::{WindowId, WindowRef};
use crate::sys::geometry::{Point, Rect, Size};

pub type NodeRef = Arc<Node>;

/// Relative share given to a freshly inserted child.
pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafKind {
    Window,
    /// A placeholder reserving space for a window that is not really there.
    Phantom,
}

#[derive(Clone, Debug)]
pub struct LeafNode {
    pub window: WindowRef,
    pub kind: LeafKind,
}

impl LeafNode {
    pub fn id(&self) -> WindowId { self.window.id() }

    pub fn is_phantom(&self) -> bool { self.kind == LeafKind::Phantom }
}

/// An internal node. Its children are laid out along `orientation` in list
/// order, each taking `weight / total_weight` of the axis.
///
/// Always has at least two children.
#[derive(Clone, Debug)]
pub struct SplitNode {
    orientation: Orientation,
    children: Vec<(f64, NodeRef)>,
}

#[derive(Clone, Debug)]
pub enum Node {
    Split(SplitNode),
    Leaf(LeafNode),
}

impl Node {
    pub fn leaf(window: WindowRef, kind: LeafKind) -> NodeRef {
        Arc::new(Node::Leaf(LeafNode { window, kind }))
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Split(_) => None,
        }
    }

    pub fn as_split(&self) -> Option<&SplitNode> {
        match self {
            Node::Split(split) => Some(split),
            Node::Leaf(_) => None,
        }
    }
}

impl From<SplitNode> for NodeRef {
    fn from(split: SplitNode) -> Self { Arc::new(Node::Split(split)) }
}

impl SplitNode {
    /// A split holding `first` then `second`, evenly weighted.
    pub fn new(orientation: Orientation, first: NodeRef, second: NodeRef) -> Self {
        SplitNode {
            orientation,
            children: vec![(DEFAULT_WEIGHT, first), (DEFAULT_WEIGHT, second)],
        }
    }

    pub fn orientation(&self) -> Orientation { self.orientation }

    pub fn len(&self) -> usize { self.children.len() }

    pub fn child(&self, index: usize) -> Option<&NodeRef> {
        self.children.get(index).map(|(_, node)| node)
    }

    pub fn children(&self) -> impl Iterator<Item = &NodeRef> {
        self.children.iter().map(|(_, node)| node)
    }

    pub fn weight(&self, index: usize) -> Option<f64> {
        self.children.get(index).map(|(weight, _)| *weight)
    }

    pub fn weights(&self) -> Vec<f64> { self.children.iter().map(|(w, _)| *w).collect() }

    pub fn total_weight(&self) -> f64 { self.children.iter().map(|(w, _)| w).sum() }

    /// Inserts `node` so that it ends up at `index`.
    pub fn insert(&self, index: usize, node: NodeRef) -> SplitNode {
        let mut children = self.children.clone();
        children.insert(index.min(children.len()), (DEFAULT_WEIGHT, node));
        SplitNode { orientation: self.orientation, children }
    }

    /// Replaces the child at `index`, keeping its weight.
    pub fn replace(&self, index: usize, node: NodeRef) -> SplitNode {
        let mut children = self.children.clone();
        if let Some(slot) = children.get_mut(index) {
            slot.1 = node;
        }
        SplitNode { orientation: self.orientation, children }
    }

    /// Removes the child at `index`. A split left with a single child
    /// collapses into that child.
    pub fn remove(&self, index: usize) -> NodeRef {
        let mut children = self.children.clone();
        if index < children.len() {
            children.remove(index);
        }
        if children.len() == 1 {
            return children.remove(0).1;
        }
        SplitNode { orientation: self.orientation, children }.into()
    }

    pub fn with_weight(&self, index: usize, weight: f64) -> SplitNode {
        let mut children = self.children.clone();
        if let Some(slot) = children.get_mut(index) {
            slot.0 = weight;
        }
        SplitNode { orientation: self.orientation, children }
    }

    /// The rectangles of the children inside `rect`, in list order.
    ///
    /// Boundaries are computed from the cumulative weight so that siblings
    /// share exact edges, and the last child always ends on `rect`'s far edge.
    pub fn child_rects(&self, rect: Rect) -> Vec<Rect> {
        let total = self.total_weight();
        let (start, len) = match self.orientation {
            Orientation::Horizontal => (rect.origin.x, rect.size.width),
            Orientation::Vertical => (rect.origin.y, rect.size.height),
        };
        let mut rects = Vec::with_capacity(self.children.len());
        let mut cumulative = 0.0;
        let mut edge = start;
        for (i, (weight, _)) in self.children.iter().enumerate() {
            cumulative += weight;
            let next = if i + 1 == self.children.len() || total <= 0.0 {
                start + len
            } else {
                start + len * cumulative / total
            };
            rects.push(match self.orientation {
                Orientation::Horizontal => Rect::new(
                    Point::new(edge, rect.origin.y),
                    Size::new(next - edge, rect.size.height),
                ),
                Orientation::Vertical => Rect::new(
                    Point::new(rect.origin.x, edge),
                    Size::new(rect.size.width, next - edge),
                ),
            });
            edge = next;
        }
        rects
    }
}
