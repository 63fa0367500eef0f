//! Commands understood by the launch session.
//!
//! This is the vocabulary shared by every [`CommandSource`]: drag gestures
//! from the presentation layer, page navigation, search, launching, and
//! group management.
//!
//! [`CommandSource`]: crate::traits::CommandSource
//!
//! Page numbers arrive either as JSON numbers or as strings (`"2"`), since
//! key-bind helpers tend to pass everything as text.

use crate::hover::PageEdge;
use crate::item::ItemKey;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Wire format for a page number: accepts `2` or `"2"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageIndex(pub usize);

impl<'de> Deserialize<'de> for PageIndex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = PageIndex;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "non-negative integer or string")
            }
            fn visit_u64<E>(self, n: u64) -> Result<PageIndex, E> {
                Ok(PageIndex(n as usize))
            }
            fn visit_str<E>(self, s: &str) -> Result<PageIndex, E>
            where
                E: DeError,
            {
                let n: usize = s
                    .trim()
                    .parse()
                    .map_err(|_| DeError::custom("GoToPage: expected non-negative integer"))?;
                Ok(PageIndex(n))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// A drag released over a cell of the current page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropRequest {
    /// The dragged item.
    pub item: ItemKey,
    /// Page-local slot of the cell under the pointer.
    pub cell: usize,
    /// Pointer x relative to the cell's leading edge (pixels).
    pub offset_x: f64,
    /// Width of the cell (pixels).
    pub cell_width: f64,
}

/// Every action the launch session can perform.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by the
/// [`LaunchSession`](crate::session::LaunchSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    //  Drag gestures

    /// A drag of `item` started.
    DragBegin(ItemKey),

    /// The drag moved over `cell`, possibly resting on a page edge.
    ///
    /// A hover with a different cell or edge than the previous one restarts
    /// the auto page-turn countdown.
    DragHover {
        cell: Option<usize>,
        #[serde(default)]
        edge: Option<PageEdge>,
    },

    /// The drag ended without a drop (cancelled or released off-grid).
    DragEnd,

    /// The drag was released over a cell.
    Drop(DropRequest),

    //  Navigation

    NextPage,
    PreviousPage,
    /// Jump to a page; out-of-range pages are clamped.
    GoToPage(PageIndex),

    //  Search

    /// Replace the search text.  Editing is disabled while it is non-empty.
    Search(String),
    ClearSearch,

    //  Launching

    /// Launch the item with this identifier (listed or grouped).
    Launch(Uuid),
    /// Launch the first item matching the search, then clear the search.
    LaunchFirstResult,

    //  Groups

    /// Move `item` out of `group`, back into the list before `cell` on the
    /// current page, or to the end when `cell` is absent.
    Ungroup {
        group: Uuid,
        item: Uuid,
        #[serde(default)]
        cell: Option<usize>,
    },
    RenameGroup { group: Uuid, name: String },
    /// Remove a group, returning its members to the end of the list.
    DissolveGroup(Uuid),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::DragBegin(key) => write!(f, "drag begin {}", key.id),
            Command::DragHover { cell, edge } => write!(f, "drag hover {:?} edge {:?}", cell, edge),
            Command::DragEnd => write!(f, "drag end"),
            Command::Drop(req) => write!(f, "drop {} on cell {}", req.item.id, req.cell),
            Command::NextPage => write!(f, "next page"),
            Command::PreviousPage => write!(f, "previous page"),
            Command::GoToPage(PageIndex(p)) => write!(f, "go to page {}", p),
            Command::Search(text) => write!(f, "search {:?}", text),
            Command::ClearSearch => write!(f, "clear search"),
            Command::Launch(id) => write!(f, "launch {}", id),
            Command::LaunchFirstResult => write!(f, "launch first result"),
            Command::Ungroup { group, item, .. } => write!(f, "ungroup {} from {}", item, group),
            Command::RenameGroup { group, name } => write!(f, "rename group {} to {:?}", group, name),
            Command::DissolveGroup(group) => write!(f, "dissolve group {}", group),
        }
    }
}
