//! Turning a drag release into an edit intent.
//!
//! A drop on an occupied cell is ambiguous: the user either wants to slot
//! the dragged item in *before* the target, or to pile it *onto* the
//! target to form a group.  The release point decides: the leading
//! [`INSERT_ZONE`] of the cell's width inserts, the rest groups.
//!
//! ```text
//!  ┌──────────┬─────────────────────┐
//!  │  insert  │        group        │
//!  │  before  │        with         │
//!  └──────────┴─────────────────────┘
//!  0        0.35                    1.0
//! ```

use serde::{Deserialize, Serialize};

/// Fraction of the cell width, measured from its leading edge, that means
/// "insert before".  Releases exactly on the boundary insert.
pub const INSERT_ZONE: f64 = 0.35;

/// What occupies a drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Item,
    Group,
}

/// The semantic result of a drop.  Indices are page-local slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropAction {
    /// Shift the target and everything after it one slot on.
    InsertBefore(usize),
    /// The target was empty; put the item there.
    InsertAtEmpty(usize),
    /// Merge the dragged item with whatever occupies the slot.
    GroupWith(usize),
}

impl DropAction {
    /// The page-local slot the action targets.
    pub fn index(&self) -> usize {
        match *self {
            DropAction::InsertBefore(i) | DropAction::InsertAtEmpty(i) | DropAction::GroupWith(i) => i,
        }
    }
}

/// Resolve a release at `offset_x` (pixels from the target cell's leading
/// edge) over a cell `cell_width` pixels wide.
///
/// Dropping an item onto its own cell is a no-op the caller must filter out
/// before calling this.
pub fn resolve_drop(index: usize, offset_x: f64, cell_width: f64, kind: CellKind) -> DropAction {
    match kind {
        CellKind::Empty => DropAction::InsertAtEmpty(index),
        CellKind::Item | CellKind::Group => {
            if offset_x <= cell_width * INSERT_ZONE {
                DropAction::InsertBefore(index)
            } else {
                DropAction::GroupWith(index)
            }
        }
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f64 = 100.0;

    #[test]
    fn leading_edge_inserts() {
        assert_eq!(resolve_drop(4, 10.0, WIDTH, CellKind::Item), DropAction::InsertBefore(4));
        assert_eq!(resolve_drop(4, 0.0, WIDTH, CellKind::Group), DropAction::InsertBefore(4));
    }

    #[test]
    fn boundary_inserts() {
        assert_eq!(resolve_drop(2, 35.0, WIDTH, CellKind::Item), DropAction::InsertBefore(2));
        assert_eq!(resolve_drop(2, 35.01, WIDTH, CellKind::Item), DropAction::GroupWith(2));
    }

    #[test]
    fn trailing_area_groups() {
        assert_eq!(resolve_drop(7, 60.0, WIDTH, CellKind::Item), DropAction::GroupWith(7));
        assert_eq!(resolve_drop(7, 99.0, WIDTH, CellKind::Group), DropAction::GroupWith(7));
    }

    #[test]
    fn empty_cell_always_inserts_at_empty() {
        for x in [0.0, 10.0, 35.0, 60.0, 100.0] {
            assert_eq!(resolve_drop(12, x, WIDTH, CellKind::Empty), DropAction::InsertAtEmpty(12));
        }
    }

    #[test]
    fn scales_with_cell_width() {
        assert_eq!(resolve_drop(0, 30.0, 64.0, CellKind::Item), DropAction::GroupWith(0));
        assert_eq!(resolve_drop(0, 30.0, 128.0, CellKind::Item), DropAction::InsertBefore(0));
    }

    #[test]
    fn index_accessor() {
        assert_eq!(DropAction::GroupWith(9).index(), 9);
        assert_eq!(DropAction::InsertAtEmpty(3).index(), 3);
    }
}
