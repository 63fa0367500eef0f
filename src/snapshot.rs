//! The persisted form of a board.
//!
//! A [`Snapshot`] is written whole after every change; stores never patch
//! one in place.  The `gridLayout` field predates pinned groups and is
//! kept only so older readers still find something sensible in it.
//!
//! # Example
//!
//! ```json
//! {
//!   "apps": [{ "id": "…", "name": "Mail", "displayName": "Mail",
//!              "bundleIdentifier": "com.apple.mail",
//!              "path": "/Applications/Mail.app", "position": null }],
//!   "groups": [],
//!   "gridLayout": [["…", null, null, null, null, null, null], …],
//!   "currentPage": 0
//! }
//! ```

use crate::board::Board;
use crate::item::{Group, Item, COLUMNS, ROWS};
use serde::{Deserialize, Serialize};

/// Legacy 5×7 grid of slot identifiers.
pub type LegacyGrid = Vec<Vec<Option<String>>>;

/// Full persisted launcher state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub apps: Vec<Item>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default = "empty_grid")]
    pub grid_layout: LegacyGrid,
    #[serde(default)]
    pub current_page: usize,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            apps: Vec::new(),
            groups: Vec::new(),
            grid_layout: empty_grid(),
            current_page: 0,
        }
    }
}

impl Snapshot {
    /// Capture `board` as it currently lays out, with `current_page`.
    ///
    /// The legacy grid mirrors page 0 with no search applied.
    pub fn capture(board: &Board, current_page: usize) -> Self {
        let layout = board.arrange("", 0);
        let mut grid = empty_grid();
        for (slot, cell) in layout.cells.iter().enumerate() {
            grid[slot / COLUMNS][slot % COLUMNS] = cell.id().map(|id| id.to_string());
        }
        Self {
            apps: board.items().to_vec(),
            groups: board.groups().to_vec(),
            grid_layout: grid,
            current_page,
        }
    }

    /// Whether nothing was ever saved.
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty() && self.groups.is_empty()
    }

    /// Rebuild the board this snapshot describes.
    pub fn into_board(self) -> (Board, usize) {
        (Board::new(self.apps, self.groups), self.current_page)
    }
}

fn empty_grid() -> LegacyGrid {
    vec![vec![None; COLUMNS]; ROWS]
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::GridPosition;

    fn item(name: &str) -> Item {
        Item::new(name, name, format!("org.example.{name}"), format!("/apps/{name}"))
    }

    #[test]
    fn default_has_empty_5x7_grid() {
        let s = Snapshot::default();
        assert_eq!(s.grid_layout.len(), ROWS);
        assert!(s.grid_layout.iter().all(|row| row.len() == COLUMNS && row.iter().all(Option::is_none)));
        assert!(s.is_empty());
    }

    #[test]
    fn capture_fills_legacy_grid_from_first_page() {
        let a = item("A");
        let b = item("B");
        let group = Group::new("G", vec![item("C")], GridPosition::new(0, 0, 0));
        let board = Board::new(vec![a.clone(), b.clone()], vec![group.clone()]);
        let s = Snapshot::capture(&board, 2);
        assert_eq!(s.grid_layout[0][0], Some(group.id.to_string()));
        assert_eq!(s.grid_layout[0][1], Some(a.id.to_string()));
        assert_eq!(s.grid_layout[0][2], Some(b.id.to_string()));
        assert_eq!(s.grid_layout[0][3], None);
        assert_eq!(s.current_page, 2);
        assert_eq!(s.apps.len(), 2);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let s: Snapshot = serde_json::from_str(r#"{ "currentPage": 3 }"#).unwrap();
        assert!(s.apps.is_empty());
        assert_eq!(s.grid_layout.len(), ROWS);
        assert_eq!(s.current_page, 3);
    }

    #[test]
    fn json_survives_reload() {
        let board = Board::new(
            vec![item("A")],
            vec![Group::new("G", vec![item("B")], GridPosition::new(1, 1, 0))],
        );
        let s = Snapshot::capture(&board, 0);
        let json = serde_json::to_string(&s).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        let (board, page) = back.into_board();
        assert_eq!(board.items().len(), 1);
        assert_eq!(board.groups()[0].items[0].name, "B");
        assert_eq!(page, 0);
    }
}
