//! The mutable launcher board: ordered item list plus group set.
//!
//! [`Board`] is the only place the two collections change.  Every edit that
//! actually changes something bumps [`Board::version`]; callers memoize
//! derived layouts on that counter instead of comparing lists.
//!
//! Edits arrive as page-local [`DropAction`]s.  Because the list skips
//! grouped items and every page loses one slot per pinned group, a
//! page-local index is translated to a list index with the same capacity
//! arithmetic the layout uses (see [`Board::global_index`]).

use crate::drop::DropAction;
use crate::item::{GridPosition, Group, Item, ItemKey};
use crate::layout::{arrange, Cell, GroupPlacement, PageLayout};
use log::debug;
use std::collections::HashSet;
use uuid::Uuid;

/// Why an edit was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// The dragged item is not in the ordered list.
    #[error("item {0} not found")]
    NotFound(Uuid),
    /// The referenced group does not exist.
    #[error("group {0} not found")]
    GroupNotFound(Uuid),
    /// Edits are disabled while a search filter is active.
    #[error("board cannot be edited while searching")]
    SearchActive,
}

/// Whether an accepted edit changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Applied,
    Unchanged,
}

impl Edit {
    pub fn is_applied(self) -> bool {
        self == Edit::Applied
    }
}

/// Ordered items and pinned groups.
#[derive(Debug, Clone, Default)]
pub struct Board {
    items: Vec<Item>,
    groups: Vec<Group>,
    version: u64,
}

impl Board {
    /// Build a board, dropping list entries that repeat an identifier or
    /// belong to a group.
    pub fn new(items: Vec<Item>, groups: Vec<Group>) -> Self {
        let mut seen: HashSet<Uuid> = groups
            .iter()
            .flat_map(|g| g.items.iter().map(|i| i.id))
            .collect();
        let before = items.len();
        let items: Vec<Item> = items.into_iter().filter(|i| seen.insert(i.id)).collect();
        if items.len() != before {
            debug!("dropped {} duplicate list entries", before - items.len());
        }
        Self {
            items,
            groups,
            version: 0,
        }
    }

    //  Accessors

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, id: Uuid) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Structural version, bumped on every applied edit.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn arrange(&self, query: &str, page: usize) -> PageLayout {
        arrange(&self.items, &self.groups, query, page)
    }

    pub fn total_pages(&self, query: &str) -> usize {
        crate::layout::total_pages(&self.items, &self.groups, query)
    }

    //  Lookup

    /// Index of the dragged item in the ordered list.
    ///
    /// Matches by identifier first, then by launch handle plus bundle
    /// identifier, then by bundle identifier alone.
    pub fn locate(&self, key: &ItemKey) -> Result<usize, EditError> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| key.match_rank(item).map(|rank| (index, rank)))
            .min_by_key(|&(_, rank)| rank)
            .map(|(index, _)| index)
            .ok_or(EditError::NotFound(key.id))
    }

    /// Whether an item matching `key` is in the list or any group.
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.items
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.items.iter()))
            .any(|item| key.match_rank(item).is_some())
    }

    /// List insertion index for page-local slot `local` on `page`.
    ///
    /// Groups before the slot do not count; the result is clamped to the
    /// list length.
    pub fn global_index(&self, page: usize, local: usize) -> usize {
        let placement = GroupPlacement::resolve(&self.groups);
        let layout = self.arrange("", page);
        (placement.start_index(page) + layout.flowing_before(local)).min(self.items.len())
    }

    //  Edits

    /// Apply a resolved drop of the item identified by `dragged` on `page`.
    ///
    /// `query` is the active search text; any non-empty query refuses the
    /// edit.
    pub fn apply(
        &mut self,
        action: DropAction,
        dragged: &ItemKey,
        page: usize,
        query: &str,
    ) -> Result<Edit, EditError> {
        if !query.is_empty() {
            return Err(EditError::SearchActive);
        }
        let source = self.locate(dragged)?;
        let local = action.index();
        match action {
            DropAction::InsertBefore(_) | DropAction::InsertAtEmpty(_) => {
                let target = self.global_index(page, local);
                Ok(self.move_item(source, target))
            }
            DropAction::GroupWith(_) => Ok(self.group_with(source, page, local)),
        }
    }

    /// Move the item at `from` so it ends up before the item currently at
    /// `to`.  `to == len` appends.
    pub fn move_item(&mut self, from: usize, to: usize) -> Edit {
        let to = to.min(self.items.len());
        let target = if from < to { to - 1 } else { to };
        if from >= self.items.len() || from == target {
            return Edit::Unchanged;
        }
        let item = self.items.remove(from);
        debug!("move {} from {} to {}", item.display_name, from, target);
        self.items.insert(target, item);
        self.bump()
    }

    /// Merge the list item at `source` with the occupant of `local` on
    /// `page`.
    fn group_with(&mut self, source: usize, page: usize, local: usize) -> Edit {
        let layout = self.arrange("", page);
        let position = GridPosition::from_linear(local, page);
        match layout.cell(local) {
            Some(Cell::Group(target)) => {
                let target = target.id;
                let item = self.items.remove(source);
                if let Some(group) = self.groups.iter_mut().find(|g| g.id == target) {
                    debug!("add {} to group {}", item.display_name, group.name);
                    if !group.add(item) {
                        debug!("already a member");
                    }
                }
                self.bump()
            }
            Some(Cell::Item(existing)) => {
                let Some(other) = self.items.iter().position(|i| i.id == existing.id) else {
                    return Edit::Unchanged;
                };
                if other == source {
                    return Edit::Unchanged;
                }
                let (dragged, existing) = if source > other {
                    let dragged = self.items.remove(source);
                    (dragged, self.items.remove(other))
                } else {
                    let existing = self.items.remove(other);
                    (self.items.remove(source), existing)
                };
                let group = Group::new(dragged.display_name.clone(), vec![dragged, existing], position);
                debug!("new group {} at page {} slot {}", group.name, page, local);
                self.groups.push(group);
                self.bump()
            }
            Some(Cell::Empty) => {
                let dragged = self.items.remove(source);
                let group = Group::new(dragged.display_name.clone(), vec![dragged], position);
                debug!("new single-item group {} at page {} slot {}", group.name, page, local);
                self.groups.push(group);
                self.bump()
            }
            None => Edit::Unchanged,
        }
    }

    /// Take `item` out of `group` and put it back in the list before
    /// `insert_at` (page-local slot on `page`), or at the end when `None`.
    ///
    /// A group left without members is removed.
    pub fn ungroup(
        &mut self,
        group: Uuid,
        item: Uuid,
        target: Option<(usize, usize)>,
    ) -> Result<Edit, EditError> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id == group)
            .ok_or(EditError::GroupNotFound(group))?;
        if !self.groups[index].contains(item) {
            return Err(EditError::NotFound(item));
        }
        // The target slot refers to the page as shown, group included.
        let at = match target {
            Some((page, local)) => self.global_index(page, local),
            None => self.items.len(),
        };
        let removed = self.groups[index]
            .remove(item)
            .ok_or(EditError::NotFound(item))?;
        if self.groups[index].is_empty() {
            let gone = self.groups.remove(index);
            debug!("group {} is empty, removing", gone.name);
        }
        self.items.insert(at, removed);
        Ok(self.bump())
    }

    pub fn rename_group(&mut self, group: Uuid, name: &str) -> Result<Edit, EditError> {
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group)
            .ok_or(EditError::GroupNotFound(group))?;
        if group.name == name {
            return Ok(Edit::Unchanged);
        }
        group.name = name.to_string();
        Ok(self.bump())
    }

    /// Remove `group`, appending its members to the list in member order.
    pub fn dissolve_group(&mut self, group: Uuid) -> Result<Edit, EditError> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id == group)
            .ok_or(EditError::GroupNotFound(group))?;
        let group = self.groups.remove(index);
        debug!("dissolve group {} ({} items)", group.name, group.items.len());
        self.items.extend(group.items);
        Ok(self.bump())
    }

    /// Append catalog items not yet on the board.
    pub fn append_new(&mut self, candidates: Vec<Item>) -> usize {
        let fresh: Vec<Item> = candidates
            .into_iter()
            .filter(|c| !self.contains(&c.key()))
            .collect();
        let added = fresh.len();
        if added > 0 {
            self.items.extend(fresh);
            self.bump();
        }
        added
    }

    /// Drop every item (listed or grouped) for which `keep` is false, and
    /// any group that ends up empty.  Returns the number of items removed.
    pub fn retain_items(&mut self, mut keep: impl FnMut(&Item) -> bool) -> usize {
        let before = self.item_count();
        self.items.retain(|i| keep(i));
        for group in &mut self.groups {
            group.items.retain(|i| keep(i));
        }
        self.groups.retain(|g| !g.is_empty());
        let removed = before - self.item_count();
        if removed > 0 {
            self.bump();
        }
        removed
    }

    /// Record each list item's current slot in its position hint, and pin
    /// every group to the slot it is shown in.
    ///
    /// Pinning fallback-placed groups keeps them where they are when other
    /// groups go away.  The arrangement does not change, so this does not
    /// bump the version.
    pub fn refresh_position_hints(&mut self) {
        let placement = GroupPlacement::resolve(&self.groups);
        for (index, item) in self.items.iter_mut().enumerate() {
            let (page, slot) = placement.slot_for(index);
            item.position = Some(GridPosition::from_linear(slot, page));
        }
        for (index, group) in self.groups.iter_mut().enumerate() {
            if let Some(resolved) = placement.position_of(index) {
                if group.position != Some(resolved) {
                    debug!("pinning group {} at {:?}", group.name, resolved);
                    group.position = Some(resolved);
                }
            }
        }
    }

    fn item_count(&self) -> usize {
        self.items.len() + self.groups.iter().map(|g| g.items.len()).sum::<usize>()
    }

    fn bump(&mut self) -> Edit {
        self.version += 1;
        Edit::Applied
    }
}

//  Tests
