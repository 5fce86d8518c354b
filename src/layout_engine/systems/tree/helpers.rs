//! Path-based lookups and edits over the immutable tree.
//!
//! A path is the list of child indices leading from the root to a node; the
//! empty path is the root itself.

use std::sync::Arc;

use tracing::trace;

use super::node::{LeafNode, Node, NodeRef, SplitNode};
use crate::common::collections::PersistentHashMap;
use crate::layout_engine::{Direction, DirectionKind, Orientation};
use crate::model::WindowId;
use crate::sys::geometry::{Point, Rect, RectExt, SameAs, UNIT_EPSILON};

pub type Path = Vec<usize>;

/// The path of every leaf, keyed by window.
pub type WindowIndex = PersistentHashMap<WindowId, Path>;

/// How far past a corner the diagonal neighbour search probes.
const CORNER_PROBE: f64 = 1e-6;

pub fn node_at_path<'a>(root: &'a NodeRef, path: &[usize]) -> Option<&'a NodeRef> {
    let mut node = root;
    for &index in path {
        node = node.as_split()?.child(index)?;
    }
    Some(node)
}

pub fn leaf_at_path<'a>(root: &'a NodeRef, path: &[usize]) -> Option<&'a LeafNode> {
    node_at_path(root, path)?.as_leaf()
}

pub fn split_at_path<'a>(root: &'a NodeRef, path: &[usize]) -> Option<&'a SplitNode> {
    node_at_path(root, path)?.as_split()
}

/// Rebuilds the nodes from the root down to `path`, replacing the node at
/// `path` with `f(node)`. Every subtree off the path is shared with `root`.
///
/// An invalid path returns `root` unchanged.
pub fn replace_at_path(
    root: &NodeRef,
    path: &[usize],
    f: impl FnOnce(&NodeRef) -> NodeRef,
) -> NodeRef {
    let Some((&index, rest)) = path.split_first() else {
        return f(root);
    };
    let Some(split) = root.as_split() else {
        return root.clone();
    };
    let Some(child) = split.child(index) else {
        return root.clone();
    };
    let replaced = replace_at_path(child, rest, f);
    if Arc::ptr_eq(child, &replaced) {
        return root.clone();
    }
    split.replace(index, replaced).into()
}

/// Removes the node at `path`, collapsing its parent when only one child is
/// left. Returns `None` if the root itself was removed.
pub fn remove_at_path(root: &NodeRef, path: &[usize]) -> Option<NodeRef> {
    let Some((&index, parent_path)) = path.split_last() else {
        return None;
    };
    let Some(parent) = split_at_path(root, parent_path) else {
        return Some(root.clone());
    };
    let remaining = parent.remove(index);
    Some(replace_at_path(root, parent_path, |_| remaining))
}

/// Every leaf in depth-first order, with its path.
pub fn leaves(root: &NodeRef) -> Vec<(Path, &LeafNode)> {
    fn walk<'a>(node: &'a NodeRef, path: &mut Path, out: &mut Vec<(Path, &'a LeafNode)>) {
        match &**node {
            Node::Leaf(leaf) => out.push((path.clone(), leaf)),
            Node::Split(split) => {
                for (i, child) in split.children().enumerate() {
                    path.push(i);
                    walk(child, path, out);
                    path.pop();
                }
            }
        }
    }
    let mut out = Vec::new();
    walk(root, &mut Vec::new(), &mut out);
    out
}

/// Updates `index`, built for `old`, so it describes `new`.
///
/// Subtrees shared by both trees at the same path are skipped, so the work
/// is bounded by the part of the tree an edit rebuilt or shifted.
pub fn reindex_windows(index: &mut WindowIndex, old: Option<&NodeRef>, new: Option<&NodeRef>) {
    fn collect(node: &NodeRef, prefix: &[usize], out: &mut Vec<(WindowId, Path)>) {
        out.extend(leaves(node).into_iter().map(|(path, leaf)| {
            let mut full = prefix.to_vec();
            full.extend(path);
            (leaf.id(), full)
        }));
    }

    fn diff(
        old: Option<&NodeRef>,
        new: Option<&NodeRef>,
        path: &mut Path,
        stale: &mut Vec<(WindowId, Path)>,
        fresh: &mut Vec<(WindowId, Path)>,
    ) {
        match (old, new) {
            (Some(a), Some(b)) if Arc::ptr_eq(a, b) => {}
            (Some(a), Some(b)) => match (a.as_split(), b.as_split()) {
                (Some(old_split), Some(new_split)) => {
                    for i in 0..old_split.len().max(new_split.len()) {
                        path.push(i);
                        diff(old_split.child(i), new_split.child(i), path, stale, fresh);
                        path.pop();
                    }
                }
                _ => {
                    collect(a, path, stale);
                    collect(b, path, fresh);
                }
            },
            (Some(a), None) => collect(a, path, stale),
            (None, Some(b)) => collect(b, path, fresh),
            (None, None) => {}
        }
    }

    let mut stale = Vec::new();
    let mut fresh = Vec::new();
    diff(old, new, &mut Vec::new(), &mut stale, &mut fresh);
    trace!(stale = stale.len(), fresh = fresh.len(), "reindexing windows");
    for (id, path) in stale {
        if index.get(&id) == Some(&path) {
            index.remove(&id);
        }
    }
    for (id, path) in fresh {
        index.insert(id, path);
    }
}

/// Every leaf in depth-first order with the rectangle it occupies inside
/// `rect`.
pub fn layout_leaves(root: &NodeRef, rect: Rect) -> Vec<(Path, &LeafNode, Rect)> {
    fn walk<'a>(
        node: &'a NodeRef,
        rect: Rect,
        path: &mut Path,
        out: &mut Vec<(Path, &'a LeafNode, Rect)>,
    ) {
        match &**node {
            Node::Leaf(leaf) => out.push((path.clone(), leaf, rect)),
            Node::Split(split) => {
                for (i, (child, child_rect)) in
                    split.children().zip(split.child_rects(rect)).enumerate()
                {
                    path.push(i);
                    walk(child, child_rect, path, out);
                    path.pop();
                }
            }
        }
    }
    let mut out = Vec::new();
    walk(root, rect, &mut Vec::new(), &mut out);
    out
}

/// The rectangle of the node at `path` when the root fills `rect`.
pub fn rect_at_path(root: &NodeRef, path: &[usize], rect: Rect) -> Option<Rect> {
    let mut node = root;
    let mut rect = rect;
    for &index in path {
        let split = node.as_split()?;
        rect = *split.child_rects(rect).get(index)?;
        node = split.child(index)?;
    }
    Some(rect)
}

/// The first leaf, depth-first, whose unit-space rectangle contains `point`.
pub fn leaf_at_point(root: &NodeRef, point: Point) -> Option<(Path, Rect)> {
    layout_leaves(root, Rect::unit())
        .into_iter()
        .find(|(_, _, rect)| rect.contains(point))
        .map(|(path, _, rect)| (path, rect))
}

/// Which side of a rectangle a point given in its local unit coordinates is
/// closest to.
pub fn direction_from_point(local: Point) -> Direction {
    let dx = local.x - 0.5;
    let dy = local.y - 0.5;
    if dx.abs() >= dy.abs() {
        if dx > 0.0 { Direction::RIGHT } else { Direction::LEFT }
    } else if dy > 0.0 {
        Direction::DOWN
    } else {
        Direction::UP
    }
}

/// Inserts `node` beside the leaf at `anchor`, or beside the whole tree when
/// there is no anchor.
///
/// `direction` must be cardinal.
pub fn insert_beside(
    root: Option<&NodeRef>,
    anchor: Option<&[usize]>,
    node: NodeRef,
    direction: Direction,
) -> NodeRef {
    let orientation = direction.orientation().unwrap_or(Orientation::Horizontal);
    let after = direction.insert_after();
    let pair = |existing: &NodeRef, node: NodeRef| -> NodeRef {
        if after {
            SplitNode::new(orientation, existing.clone(), node).into()
        } else {
            SplitNode::new(orientation, node, existing.clone()).into()
        }
    };

    let Some(root) = root else {
        return node;
    };
    match &**root {
        Node::Leaf(_) => pair(root, node),
        Node::Split(split) => {
            let anchor = anchor.filter(|path| leaf_at_path(root, path).is_some());
            let Some((&index, parent_path)) = anchor.and_then(|path| path.split_last()) else {
                trace!("no anchor, inserting beside the root");
                if split.orientation() == orientation {
                    let at = if after { split.len() } else { 0 };
                    return split.insert(at, node).into();
                }
                return pair(root, node);
            };
            let Some(parent) = split_at_path(root, parent_path) else {
                return root.clone();
            };
            if parent.orientation() == orientation {
                let at = if after { index + 1 } else { index };
                let inserted: NodeRef = parent.insert(at, node).into();
                replace_at_path(root, parent_path, |_| inserted)
            } else {
                let mut path = parent_path.to_vec();
                path.push(index);
                replace_at_path(root, &path, |existing| pair(existing, node))
            }
        }
    }
}

/// The leaf next to the one at `source` in `direction`, found from the
/// unit-space rectangles.
pub fn adjacent_leaf(root: &NodeRef, source: &[usize], direction: Direction) -> Option<Path> {
    let laid_out = layout_leaves(root, Rect::unit());
    let (_, _, from) = laid_out.iter().find(|(path, _, _)| path.as_slice() == source)?;
    let from = *from;
    let others = laid_out.iter().filter(|(path, _, _)| path.as_slice() != source);

    let found = match direction.kind() {
        DirectionKind::Invalid => None,
        DirectionKind::Diagonal => {
            let x = if direction.contains(Direction::LEFT) {
                from.min().x - CORNER_PROBE
            } else {
                from.max().x + CORNER_PROBE
            };
            let y = if direction.contains(Direction::UP) {
                from.min().y - CORNER_PROBE
            } else {
                from.max().y + CORNER_PROBE
            };
            let probe = Point::new(x, y);
            others.into_iter().find(|(_, _, rect)| rect.contains(probe))
        }
        DirectionKind::Horizontal | DirectionKind::Vertical => others.into_iter().find(|(_, _, rect)| {
            let (touches, overlap) = if direction == Direction::LEFT {
                (rect.max().x.same_as(from.min().x), rect.overlap_y(&from))
            } else if direction == Direction::RIGHT {
                (rect.min().x.same_as(from.max().x), rect.overlap_y(&from))
            } else if direction == Direction::UP {
                (rect.max().y.same_as(from.min().y), rect.overlap_x(&from))
            } else {
                (rect.min().y.same_as(from.max().y), rect.overlap_x(&from))
            };
            touches && overlap > UNIT_EPSILON
        }),
    };
    found.map(|(path, _, _)| path.clone())
}
