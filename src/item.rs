//! Launchable entries, groups, and grid positions.
//!
//! These are plain values.  [`Item`] and [`Group`] compare by identifier
//! only, so a renamed group or a moved item is still "the same" entry.
//!
//! Field names on the wire use `camelCase` so snapshots written by earlier
//! releases keep loading.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of columns on a page.
pub const COLUMNS: usize = 7;
/// Number of rows on a page.
pub const ROWS: usize = 5;
/// Slots on a single page (`COLUMNS × ROWS`).
pub const SLOTS_PER_PAGE: usize = COLUMNS * ROWS;

/// A `(row, column, page)` coordinate on the board.
///
/// Fields are signed because persisted data is not trusted: a negative or
/// out-of-range position deserializes fine and is simply reported as
/// invalid by [`is_valid`](GridPosition::is_valid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: i64,
    pub column: i64,
    pub page: i64,
}

impl GridPosition {
    pub fn new(row: i64, column: i64, page: i64) -> Self {
        Self { row, column, page }
    }

    /// Build a position from a page-local linear index (`row * 7 + column`).
    pub fn from_linear(index: usize, page: usize) -> Self {
        Self {
            row: (index / COLUMNS) as i64,
            column: (index % COLUMNS) as i64,
            page: page as i64,
        }
    }

    /// Page-local slot index.  Only meaningful when the position is valid.
    pub fn linear_index(&self) -> i64 {
        self.row * COLUMNS as i64 + self.column
    }

    /// Whether the position lies on the 7×5 grid of a non-negative page.
    pub fn is_valid(&self) -> bool {
        (0..ROWS as i64).contains(&self.row)
            && (0..COLUMNS as i64).contains(&self.column)
            && self.page >= 0
    }

    /// `(page, slot)` for a valid position, `None` otherwise.
    pub fn slot(&self) -> Option<(usize, usize)> {
        self.is_valid()
            .then(|| (self.page as usize, self.linear_index() as usize))
    }
}

/// A single launchable entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Internal name (e.g. the bundle file stem).
    pub name: String,
    /// Name shown under the icon.
    pub display_name: String,
    /// Secondary identity key, stable across reinstalls.
    pub bundle_identifier: String,
    /// Launch handle handed to the [`Launcher`](crate::traits::Launcher).
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    /// Last known position.  A hint for the presentation layer only.
    #[serde(default)]
    pub position: Option<GridPosition>,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        bundle_identifier: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            display_name: display_name.into(),
            bundle_identifier: bundle_identifier.into(),
            path: path.into(),
            icon_path: None,
            position: None,
        }
    }

    /// The identity triple used to find this item again after a drag.
    pub fn key(&self) -> ItemKey {
        ItemKey {
            id: self.id,
            path: Some(self.path.clone()),
            bundle_identifier: Some(self.bundle_identifier.clone()),
        }
    }

    /// Case-insensitive substring match on the display or internal name.
    ///
    /// An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.display_name.to_lowercase().contains(&needle)
            || self.name.to_lowercase().contains(&needle)
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Item {}

/// Reference to a dragged item as carried by a gesture.
///
/// The identifier may be stale (regenerated by a reload), so the launch
/// handle and bundle identifier ride along as fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemKey {
    pub id: Uuid,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub bundle_identifier: Option<String>,
}

impl ItemKey {
    /// A key that can only match by identifier.
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id,
            path: None,
            bundle_identifier: None,
        }
    }

    /// How well `item` matches this key, strongest first.  `None` = no match.
    pub(crate) fn match_rank(&self, item: &Item) -> Option<u8> {
        if item.id == self.id {
            return Some(0);
        }
        let bundle = self.bundle_identifier.as_deref()?;
        if item.bundle_identifier != bundle {
            return None;
        }
        match self.path.as_deref() {
            Some(path) if item.path == path => Some(1),
            _ => Some(2),
        }
    }
}

/// A named, pinned container of items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "apps", default)]
    pub items: Vec<Item>,
    /// Authoritative placement.  `None` or invalid means auto-placed.
    #[serde(default)]
    pub position: Option<GridPosition>,
}

impl Group {
    pub fn new(name: impl Into<String>, items: Vec<Item>, position: GridPosition) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            items,
            position: Some(position),
        }
    }

    /// Append `item` unless an item with the same id is already a member.
    ///
    /// Returns `true` if the item was added.
    pub fn add(&mut self, item: Item) -> bool {
        if self.contains(item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the member with `id`, returning it.
    pub fn remove(&mut self, id: Uuid) -> Option<Item> {
        let index = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The pinned `(page, slot)`, if the stored position is valid.
    pub fn pinned_slot(&self) -> Option<(usize, usize)> {
        self.position.and_then(|p| p.slot())
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Group {}

//  Tests
