//! Page layout derived from the ordered item list and the group set.
//!
//! Groups are *pinned*: each one claims the slot stored in its
//! [`GridPosition`].  Items *flow*: they fill the remaining slots of each
//! page in list order, so a page's item capacity is `35 − groups on it`.
//!
//! Everything here is a pure function of its inputs.  Data problems (two
//! groups on one slot, positions off the grid) never fail; they are fixed
//! up by a fallback placement and reported as [`LayoutWarning`]s for the
//! caller to log.
//!
//! # Fallback placement
//!
//! Groups without a valid position, and groups that lost a slot conflict to
//! a later group, are placed after every validly pinned group, each taking
//! the first slot (lowest page, then lowest linear index) no other group
//! occupies.

use crate::drop::CellKind;
use crate::item::{GridPosition, Group, Item, SLOTS_PER_PAGE};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// One rendered slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Item(Item),
    Group(Group),
    Empty,
}

impl Cell {
    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Item(_) => CellKind::Item,
            Cell::Group(_) => CellKind::Group,
            Cell::Empty => CellKind::Empty,
        }
    }

    /// Identifier of the item or group in this cell.
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Cell::Item(item) => Some(item.id),
            Cell::Group(group) => Some(group.id),
            Cell::Empty => None,
        }
    }
}

/// A data-integrity problem found while placing groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutWarning {
    /// Two groups are pinned to the same slot.  `kept` (enumerated later)
    /// stays, `displaced` goes through the fallback placement.
    SlotTaken {
        page: usize,
        slot: usize,
        kept: Uuid,
        displaced: Uuid,
    },
    /// A group's stored position is off the grid.
    InvalidPosition { group: Uuid, position: GridPosition },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::SlotTaken {
                page,
                slot,
                kept,
                displaced,
            } => write!(
                f,
                "groups {} and {} both pinned to page {} slot {}; relocating {}",
                displaced, kept, page, slot, displaced
            ),
            LayoutWarning::InvalidPosition { group, position } => write!(
                f,
                "group {} has invalid position (row {}, column {}, page {}); auto-placing",
                group, position.row, position.column, position.page
            ),
        }
    }
}

/// Resolved slot for every group, plus per-page group counts.
#[derive(Debug, Clone, Default)]
pub struct GroupPlacement {
    /// `(page, slot) -> index into the group slice`.
    slots: BTreeMap<(usize, usize), usize>,
    /// `group index -> (page, slot)`.
    by_group: BTreeMap<usize, (usize, usize)>,
    /// `page -> number of groups on it`.
    per_page: BTreeMap<usize, usize>,
    warnings: Vec<LayoutWarning>,
}

impl GroupPlacement {
    /// Place every group in `groups`.
    pub fn resolve(groups: &[Group]) -> Self {
        let mut slots: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        let mut warnings = Vec::new();
        let mut floating = Vec::new();

        for (index, group) in groups.iter().enumerate() {
            match group.pinned_slot() {
                Some((page, slot)) => {
                    if let Some(previous) = slots.insert((page, slot), index) {
                        warnings.push(LayoutWarning::SlotTaken {
                            page,
                            slot,
                            kept: group.id,
                            displaced: groups[previous].id,
                        });
                        floating.push(previous);
                    }
                }
                None => {
                    if let Some(position) = group.position {
                        warnings.push(LayoutWarning::InvalidPosition {
                            group: group.id,
                            position,
                        });
                    }
                    floating.push(index);
                }
            }
        }

        floating.sort_unstable();
        let mut cursor = 0usize;
        for index in floating {
            while slots.contains_key(&split(cursor)) {
                cursor += 1;
            }
            slots.insert(split(cursor), index);
            cursor += 1;
        }

        let mut by_group = BTreeMap::new();
        let mut per_page = BTreeMap::new();
        for (&(page, slot), &index) in &slots {
            by_group.insert(index, (page, slot));
            *per_page.entry(page).or_insert(0) += 1;
        }

        Self {
            slots,
            by_group,
            per_page,
            warnings,
        }
    }

    /// Index of the group occupying `(page, slot)`.
    pub fn group_at(&self, page: usize, slot: usize) -> Option<usize> {
        self.slots.get(&(page, slot)).copied()
    }

    /// Where group number `index` ended up.
    pub fn position_of(&self, index: usize) -> Option<GridPosition> {
        self.by_group
            .get(&index)
            .map(|&(page, slot)| GridPosition::from_linear(slot, page))
    }

    pub fn groups_on(&self, page: usize) -> usize {
        self.per_page.get(&page).copied().unwrap_or(0)
    }

    /// Flowing-item slots on `page`.
    pub fn capacity(&self, page: usize) -> usize {
        SLOTS_PER_PAGE - self.groups_on(page)
    }

    /// Number of flowing items consumed by pages `0..page`.
    pub fn start_index(&self, page: usize) -> usize {
        let pinned: usize = self.per_page.range(..page).map(|(_, &n)| n).sum();
        page.saturating_mul(SLOTS_PER_PAGE).saturating_sub(pinned)
    }

    /// Pages needed to show `item_count` flowing items and every group.
    ///
    /// Never less than one.
    pub fn page_count(&self, item_count: usize) -> usize {
        let item_pages = match item_count.checked_sub(1) {
            Some(last) => self.slot_for(last).0.saturating_add(1),
            None => 0,
        };
        let group_pages = self.per_page.keys().next_back().map_or(0, |p| p + 1);
        item_pages.max(group_pages).max(1)
    }

    /// `(page, slot)` of the flowing item at `index` in the list.
    ///
    /// Only pages holding groups are visited one by one; runs of group-free
    /// pages are skipped arithmetically.
    pub fn slot_for(&self, index: usize) -> (usize, usize) {
        let mut page = 0;
        let mut remaining = index;
        for (&group_page, &pinned) in &self.per_page {
            let full = (group_page - page).saturating_mul(SLOTS_PER_PAGE);
            if remaining < full {
                break;
            }
            remaining -= full;
            page = group_page;
            let capacity = SLOTS_PER_PAGE - pinned;
            if remaining < capacity {
                break;
            }
            remaining -= capacity;
            page = group_page + 1;
        }
        page = page.saturating_add(remaining / SLOTS_PER_PAGE);
        let remaining = remaining % SLOTS_PER_PAGE;
        let slot = (0..SLOTS_PER_PAGE)
            .filter(|&slot| self.group_at(page, slot).is_none())
            .nth(remaining)
            .unwrap_or(SLOTS_PER_PAGE - 1);
        (page, slot)
    }

    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }
}

fn split(global_slot: usize) -> (usize, usize) {
    (global_slot / SLOTS_PER_PAGE, global_slot % SLOTS_PER_PAGE)
}

/// The rendered contents of one page.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Page this layout describes.
    pub page: usize,
    /// Exactly [`SLOTS_PER_PAGE`] cells in row-major order.
    pub cells: Vec<Cell>,
    /// Total pages for the same list, groups and query.
    pub total_pages: usize,
    /// Position in the filtered list of the first item on this page.
    pub first_item: usize,
    /// Integrity problems found while placing groups.
    pub warnings: Vec<LayoutWarning>,
}

impl PageLayout {
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Page-local slot holding the item or group with `id`.
    pub fn index_of(&self, id: Uuid) -> Option<usize> {
        self.cells.iter().position(|c| c.id() == Some(id))
    }

    /// Number of non-group cells strictly before `index`.
    pub fn flowing_before(&self, index: usize) -> usize {
        self.cells
            .iter()
            .take(index)
            .filter(|c| !matches!(c, Cell::Group(_)))
            .count()
    }
}

/// Lay out `page` for the items matching `query`.
///
/// Groups are never filtered by `query`.
pub fn arrange(items: &[Item], groups: &[Group], query: &str, page: usize) -> PageLayout {
    let placement = GroupPlacement::resolve(groups);
    let filtered: Vec<&Item> = items.iter().filter(|i| i.matches(query)).collect();
    let start = placement.start_index(page).min(filtered.len());
    let mut flowing = filtered[start..].iter().take(placement.capacity(page));

    let cells = (0..SLOTS_PER_PAGE)
        .map(|slot| match placement.group_at(page, slot) {
            Some(index) => Cell::Group(groups[index].clone()),
            None => flowing
                .next()
                .map_or(Cell::Empty, |item| Cell::Item((*item).clone())),
        })
        .collect();

    PageLayout {
        page,
        cells,
        total_pages: placement.page_count(filtered.len()),
        first_item: start,
        warnings: placement.warnings,
    }
}

/// Total pages for the items matching `query`.
pub fn total_pages(items: &[Item], groups: &[Group], query: &str) -> usize {
    let count = items.iter().filter(|i| i.matches(query)).count();
    GroupPlacement::resolve(groups).page_count(count)
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| {
                Item::new(
                    format!("app{i}"),
                    format!("App {i}"),
                    format!("org.example.app{i}"),
                    format!("/apps/app{i}"),
                )
            })
            .collect()
    }

    fn group_at(row: i64, column: i64, page: i64) -> Group {
        Group::new("G", vec![], GridPosition::new(row, column, page))
    }

    #[test]
    fn page_count_without_groups_is_ceil() {
        for n in [1, 34, 35, 36, 70, 71, 200] {
            assert_eq!(total_pages(&items(n), &[], ""), n.div_ceil(SLOTS_PER_PAGE), "n={n}");
        }
    }

    #[test]
    fn empty_board_has_one_page_of_empty_cells() {
        let layout = arrange(&[], &[], "", 0);
        assert_eq!(layout.total_pages, 1);
        assert_eq!(layout.cells.len(), SLOTS_PER_PAGE);
        assert!(layout.cells.iter().all(|c| *c == Cell::Empty));
    }

    #[test]
    fn group_at_origin_pushes_last_item_to_next_page() {
        let list = items(36);
        let groups = vec![group_at(0, 0, 0)];

        let first = arrange(&list, &groups, "", 0);
        assert!(matches!(first.cells[0], Cell::Group(_)));
        for slot in 1..SLOTS_PER_PAGE {
            assert_eq!(first.cells[slot], Cell::Item(list[slot - 1].clone()));
        }
        assert_eq!(first.total_pages, 2);

        let second = arrange(&list, &groups, "", 1);
        assert_eq!(second.cells[0], Cell::Item(list[34].clone()));
        assert_eq!(second.cells[1], Cell::Item(list[35].clone()));
        assert_eq!(second.cells[2], Cell::Empty);
        assert_eq!(second.first_item, 34);
    }

    #[test]
    fn every_item_and_group_rendered_exactly_once() {
        let list = items(80);
        let groups = vec![group_at(0, 3, 0), group_at(4, 6, 1), group_at(2, 2, 2), group_at(1, 1, 0)];
        let pages = total_pages(&list, &groups, "");
        let mut seen = Vec::new();
        for page in 0..pages {
            let layout = arrange(&list, &groups, "", page);
            assert_eq!(layout.cells.len(), SLOTS_PER_PAGE);
            seen.extend(layout.cells.iter().filter_map(Cell::id));
        }
        let unique: HashSet<Uuid> = seen.iter().copied().collect();
        assert_eq!(seen.len(), unique.len(), "no duplicates");
        assert_eq!(seen.len(), list.len() + groups.len());
    }

    #[test]
    fn full_page_of_groups_has_no_item_capacity() {
        let groups: Vec<Group> = (0..SLOTS_PER_PAGE)
            .map(|slot| Group::new("G", vec![], GridPosition::from_linear(slot, 0)))
            .collect();
        let list = items(3);
        let first = arrange(&list, &groups, "", 0);
        assert!(first.cells.iter().all(|c| matches!(c, Cell::Group(_))));
        let second = arrange(&list, &groups, "", 1);
        assert_eq!(second.cells[0], Cell::Item(list[0].clone()));
        assert_eq!(second.total_pages, 2);
    }

    #[test]
    fn search_filters_items_but_not_groups() {
        let list = items(12);
        let groups = vec![group_at(0, 0, 0)];
        let layout = arrange(&list, &groups, "app 1", 0);
        let shown: Vec<&str> = layout
            .cells
            .iter()
            .filter_map(|c| match c {
                Cell::Item(i) => Some(i.display_name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(shown, vec!["App 1", "App 10", "App 11"]);
        assert!(matches!(layout.cells[0], Cell::Group(_)));
    }

    #[test]
    fn later_group_wins_slot_conflict() {
        let a = group_at(0, 0, 0);
        let b = group_at(0, 0, 0);
        let groups = vec![a.clone(), b.clone()];
        let layout = arrange(&[], &groups, "", 0);
        assert_eq!(layout.cells[0].id(), Some(b.id));
        assert_eq!(layout.cells[1].id(), Some(a.id), "displaced group relocated");
        assert_eq!(
            layout.warnings,
            vec![LayoutWarning::SlotTaken {
                page: 0,
                slot: 0,
                kept: b.id,
                displaced: a.id,
            }]
        );
    }

    #[test]
    fn invalid_and_missing_positions_take_first_free_slot() {
        let pinned = group_at(0, 0, 0);
        let mut invalid = group_at(7, 0, 0);
        invalid.name = "invalid".into();
        let mut unplaced = group_at(0, 0, 0);
        unplaced.position = None;

        let groups = vec![invalid.clone(), pinned.clone(), unplaced.clone()];
        let placement = GroupPlacement::resolve(&groups);
        assert_eq!(placement.position_of(1), Some(GridPosition::new(0, 0, 0)));
        assert_eq!(placement.position_of(0), Some(GridPosition::new(0, 1, 0)));
        assert_eq!(placement.position_of(2), Some(GridPosition::new(0, 2, 0)));
        assert_eq!(placement.warnings().len(), 1);
        assert!(matches!(
            placement.warnings()[0],
            LayoutWarning::InvalidPosition { group, .. } if group == invalid.id
        ));
    }

    #[test]
    fn fallback_skips_full_pages() {
        let mut groups: Vec<Group> = (0..SLOTS_PER_PAGE)
            .map(|slot| Group::new("G", vec![], GridPosition::from_linear(slot, 0)))
            .collect();
        let mut floating = group_at(0, 0, 0);
        floating.position = None;
        groups.push(floating);
        let placement = GroupPlacement::resolve(&groups);
        assert_eq!(placement.position_of(SLOTS_PER_PAGE), Some(GridPosition::new(0, 0, 1)));
    }

    #[test]
    fn page_count_covers_groups_on_later_pages() {
        let groups = vec![group_at(0, 0, 3)];
        assert_eq!(total_pages(&items(5), &groups, ""), 4);
        let last = arrange(&items(5), &groups, "", 3);
        assert!(matches!(last.cells[0], Cell::Group(_)));
    }

    #[test]
    fn slot_for_agrees_with_arrange() {
        let list = items(75);
        let groups = vec![group_at(0, 0, 0), group_at(3, 3, 1), group_at(0, 1, 1)];
        let placement = GroupPlacement::resolve(&groups);
        for (index, item) in list.iter().enumerate() {
            let (page, slot) = placement.slot_for(index);
            let layout = arrange(&list, &groups, "", page);
            assert_eq!(layout.cells[slot], Cell::Item(item.clone()), "index {index}");
        }
    }

    #[test]
    fn flowing_before_skips_groups() {
        let list = items(10);
        let groups = vec![group_at(0, 1, 0), group_at(0, 3, 0)];
        let layout = arrange(&list, &groups, "", 0);
        assert_eq!(layout.flowing_before(0), 0);
        assert_eq!(layout.flowing_before(2), 1);
        assert_eq!(layout.flowing_before(5), 3);
    }

    #[test]
    fn far_away_group_page_is_arranged_directly() {
        let far = 2_000_000_000;
        let list = items(40);
        let groups = vec![group_at(0, 0, far as i64), group_at(0, 0, 1)];
        assert_eq!(total_pages(&list, &groups, ""), far + 1);

        let placement = GroupPlacement::resolve(&groups);
        assert_eq!(placement.start_index(far), far * SLOTS_PER_PAGE - 1);
        assert_eq!(placement.slot_for(39), (1, 5));

        let last = arrange(&list, &groups, "", far);
        assert!(matches!(last.cells[0], Cell::Group(_)));
        assert!(last.cells[1..].iter().all(|c| *c == Cell::Empty));
        assert_eq!(last.first_item, list.len());

        let second = arrange(&list, &groups, "", 1);
        assert!(matches!(second.cells[0], Cell::Group(_)));
        assert_eq!(second.cells[1], Cell::Item(list[35].clone()));
    }

    #[test]
    fn largest_pinned_page_does_not_overflow() {
        let groups = vec![group_at(0, 0, i64::MAX)];
        let placement = GroupPlacement::resolve(&groups);
        assert_eq!(placement.page_count(3), i64::MAX as usize + 1);
        assert_eq!(placement.slot_for(2), (0, 2));
        assert_eq!(placement.start_index(i64::MAX as usize), usize::MAX);
    }
}
