//! Moving the shared edge between two siblings.
//!
//! An edge move only changes the weights of two neighbouring children of one
//! split; it never changes the shape of the tree.

use tracing::{debug, trace};

use super::helpers::{Path, rect_at_path, replace_at_path, split_at_path};
use super::node::NodeRef;
use crate::layout_engine::{Direction, Orientation};
use crate::sys::geometry::Rect;

/// New weights for two adjacent children of the split at `parent`.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightAdjustment {
    pub parent: Path,
    pub child: usize,
    pub child_weight: f64,
    pub neighbour: usize,
    pub neighbour_weight: f64,
}

/// Works out how to move the `edge` side of the leaf at `leaf` by `delta`,
/// a fraction of the whole layout area.
///
/// The boundary lives in the nearest ancestor split with the edge's
/// orientation in which the path to the leaf has a sibling on that side.
/// Returns `None` when there is no such boundary, or when the move would
/// leave either sibling with a share of its split at or below `min_fraction`.
pub fn resolve_edge(
    root: &NodeRef,
    leaf: &[usize],
    edge: Direction,
    delta: f64,
    min_fraction: f64,
) -> Option<WeightAdjustment> {
    let orientation = edge.orientation()?;
    let end_edge = edge.insert_after();

    for depth in (0..leaf.len()).rev() {
        let parent_path = &leaf[..depth];
        let child = leaf[depth];
        let parent = split_at_path(root, parent_path)?;
        if parent.orientation() != orientation {
            continue;
        }
        let neighbour = if end_edge {
            child + 1
        } else if child > 0 {
            child - 1
        } else {
            continue;
        };
        if neighbour >= parent.len() {
            continue;
        }

        let rect = rect_at_path(root, parent_path, Rect::unit())?;
        let axis_len = match orientation {
            Orientation::Horizontal => rect.size.width,
            Orientation::Vertical => rect.size.height,
        };
        if axis_len <= 0.0 {
            return None;
        }
        let total = parent.total_weight();
        let dw = delta / axis_len * total;
        let (child_weight, neighbour_weight) = if end_edge {
            (parent.weight(child)? + dw, parent.weight(neighbour)? - dw)
        } else {
            (parent.weight(child)? - dw, parent.weight(neighbour)? + dw)
        };

        // NaN fails the comparisons, so it is rejected too
        let keeps_both =
            child_weight / total > min_fraction && neighbour_weight / total > min_fraction;
        if !keeps_both {
            debug!(
                %edge,
                delta,
                child_weight,
                neighbour_weight,
                "edge move would close a pane, rejecting"
            );
            return None;
        }

        trace!(?parent_path, child, neighbour, dw, "resolved edge");
        return Some(WeightAdjustment {
            parent: parent_path.to_vec(),
            child,
            child_weight,
            neighbour,
            neighbour_weight,
        });
    }
    None
}

pub fn apply(root: &NodeRef, adjustment: &WeightAdjustment) -> NodeRef {
    replace_at_path(root, &adjustment.parent, |node| match node.as_split() {
        Some(split) => split
            .with_weight(adjustment.child, adjustment.child_weight)
            .with_weight(adjustment.neighbour, adjustment.neighbour_weight)
            .into(),
        None => node.clone(),
    })
}

/// Moves every component of `edges` by the matching component of the
/// deltas. All components are resolved against `root` before any is
/// applied, and if one of them cannot be resolved nothing is changed.
///
/// Components with a zero delta are skipped, and a non-finite delta rejects
/// the whole move. Returns `None` when nothing changes.
pub fn move_edges(
    root: &NodeRef,
    leaf: &[usize],
    edges: Direction,
    dx: f64,
    dy: f64,
    min_fraction: f64,
) -> Option<NodeRef> {
    if !edges.is_valid() || leaf.is_empty() {
        return None;
    }

    let mut adjustments = Vec::new();
    for edge in edges.components() {
        let delta = match edge.orientation()? {
            Orientation::Horizontal => dx,
            Orientation::Vertical => dy,
        };
        if !delta.is_finite() {
            debug!(%edge, delta, "ignoring non-finite edge delta");
            return None;
        }
        if delta == 0.0 {
            continue;
        }
        adjustments.push(resolve_edge(root, leaf, edge, delta, min_fraction)?);
    }
    if adjustments.is_empty() {
        return None;
    }

    // The components touch splits of different orientations, so applying
    // one never moves the boundary the other resolved.
    Some(adjustments.iter().fold(root.clone(), |tree, adjustment| apply(&tree, adjustment)))
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::layout_engine::systems::tree::helpers::{leaves, split_at_path};
    use crate::layout_engine::systems::tree::node::{LeafKind, Node, SplitNode};
    use crate::model::window::testing::TestWindow;
    use crate::sys::geometry::SameAs;

    fn leaf(idx: u32) -> NodeRef { Node::leaf(TestWindow::new(idx), LeafKind::Window) }

    fn three_way() -> NodeRef {
        SplitNode::new(Orientation::Horizontal, leaf(1), leaf(2)).insert(2, leaf(3)).into()
    }

    /// 1 | (2 / 3)
    fn column_tree() -> NodeRef {
        let column: NodeRef = SplitNode::new(Orientation::Vertical, leaf(2), leaf(3)).into();
        SplitNode::new(Orientation::Horizontal, leaf(1), column).into()
    }

    fn approx(actual: Vec<f64>, expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!(a.same_as(*e), "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn start_edge_moves_into_previous_sibling() {
        let root = three_way();
        let moved = move_edges(&root, &[1], Direction::LEFT, -0.1, 0.0, 0.0).unwrap();
        approx(moved.as_split().unwrap().weights(), &[0.7, 1.3, 1.0]);
    }

    #[test]
    fn end_edge_moves_into_next_sibling() {
        let root = three_way();
        let moved = move_edges(&root, &[1], Direction::RIGHT, 0.1, 0.0, 0.0).unwrap();
        approx(moved.as_split().unwrap().weights(), &[1.0, 1.3, 0.7]);
    }

    #[test]
    fn weight_sum_is_conserved() {
        let root = three_way();
        let moved = move_edges(&root, &[0], Direction::RIGHT, 0.2, 0.0, 0.0).unwrap();
        let weights = moved.as_split().unwrap().weights();
        assert!((weights[0] + weights[1]).same_as(2.0));
    }

    #[test]
    fn no_sibling_on_that_side() {
        let root = three_way();
        assert!(move_edges(&root, &[0], Direction::LEFT, -0.1, 0.0, 0.0).is_none());
        assert!(move_edges(&root, &[2], Direction::RIGHT, 0.1, 0.0, 0.0).is_none());
        assert!(move_edges(&root, &[1], Direction::UP, 0.0, -0.1, 0.0).is_none());
    }

    #[test]
    fn closing_a_pane_is_rejected() {
        let root = three_way();
        // the previous sibling is a third of the width
        assert!(move_edges(&root, &[1], Direction::LEFT, -0.34, 0.0, 0.0).is_none());
        assert!(move_edges(&root, &[1], Direction::LEFT, -0.3, 0.0, 0.0).is_some());
        assert!(move_edges(&root, &[1], Direction::LEFT, -0.3, 0.0, 0.05).is_none());
    }

    #[test]
    fn boundary_found_in_ancestor() {
        // the right edge of 2 lives in the root, not in its column
        let root: NodeRef = SplitNode::new(Orientation::Horizontal, column_tree(), leaf(4)).into();
        let moved = move_edges(&root, &[0, 1, 0], Direction::RIGHT, 0.1, 0.0, 0.0).unwrap();
        approx(moved.as_split().unwrap().weights(), &[1.2, 0.8]);
        assert_eq!(split_at_path(&moved, &[0]).unwrap().weights(), vec![1.0, 1.0]);
    }

    #[test]
    fn delta_scales_with_parent_size() {
        let root = column_tree();
        let moved = move_edges(&root, &[1, 0], Direction::DOWN, 0.0, 0.25, 0.0).unwrap();
        approx(split_at_path(&moved, &[1]).unwrap().weights(), &[1.5, 0.5]);

        // the column is now only half the height of the area
        let root: NodeRef =
            SplitNode::new(Orientation::Vertical, column_tree(), leaf(4)).into();
        let moved = move_edges(&root, &[0, 1, 0], Direction::DOWN, 0.0, 0.125, 0.0).unwrap();
        approx(split_at_path(&moved, &[0, 1]).unwrap().weights(), &[1.5, 0.5]);
        assert!(move_edges(&root, &[0, 1, 0], Direction::DOWN, 0.0, 0.25, 0.0).is_none());
    }

    #[test]
    fn diagonal_applies_both_or_neither() {
        let root = column_tree();
        let moved = move_edges(&root, &[1, 1], Direction::LEFT_UP, -0.1, -0.1, 0.0).unwrap();
        approx(moved.as_split().unwrap().weights(), &[0.8, 1.2]);
        approx(split_at_path(&moved, &[1]).unwrap().weights(), &[0.8, 1.2]);
        assert_eq!(leaves(&moved).len(), 3);

        // there is nothing below 3, so the whole move is rejected
        assert!(move_edges(&root, &[1, 1], Direction::LEFT_DOWN, -0.1, 0.1, 0.0).is_none());
        // and 1 has nothing above it
        assert!(move_edges(&root, &[0], Direction::RIGHT_UP, 0.1, -0.1, 0.0).is_none());
    }

    #[test]
    fn zero_delta_component_is_skipped() {
        let root = column_tree();
        let moved = move_edges(&root, &[0], Direction::RIGHT_UP, 0.1, 0.0, 0.0).unwrap();
        approx(moved.as_split().unwrap().weights(), &[1.2, 0.8]);
        assert!(move_edges(&root, &[0], Direction::RIGHT, 0.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn root_and_invalid_edges_do_nothing() {
        assert!(move_edges(&leaf(1), &[], Direction::RIGHT, 0.1, 0.0, 0.0).is_none());
        let root = three_way();
        assert!(move_edges(&root, &[1], Direction::LEFT | Direction::RIGHT, 0.1, 0.0, 0.0).is_none());
    }

    #[test]
    fn non_finite_deltas_are_rejected() {
        let root = three_way();
        for delta in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(move_edges(&root, &[1], Direction::RIGHT, delta, 0.0, 0.0).is_none());
            assert!(resolve_edge(&root, &[1], Direction::RIGHT, delta, 0.0).is_none());
        }
        // a bad component spoils the whole diagonal move
        let root = column_tree();
        assert!(move_edges(&root, &[1, 1], Direction::LEFT_UP, -0.1, f64::NAN, 0.0).is_none());
    }
}
