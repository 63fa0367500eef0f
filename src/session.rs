//! The orchestrator that ties the board, the store, and the launcher
//! together.
//!
//! [`LaunchSession`] owns the [`Board`] and reacts to [`Command`]s by
//! resolving drops, applying edits, and persisting a fresh [`Snapshot`]
//! after every change.  It is the only writer of the board; everything is
//! handled sequentially on the thread that owns the session.
//!
//! # States
//!
//! ```text
//! Idle ──begin_loading──▶ Loading ──finish_loading──▶ Ready ◀──▶ Dragging
//! ```
//!
//! Commands are refused until the session is `Ready`.  A drag moves it to
//! `Dragging`; a drop or drag end returns it to `Ready`.

use crate::board::{Board, Edit, EditError};
use crate::command::{Command, DropRequest, PageIndex};
use crate::config::StorageConfig;
use crate::drop::resolve_drop;
use crate::hover::{DragConfig, EdgeHoverTimer, PageEdge};
use crate::item::{Item, ItemKey};
use crate::layout::PageLayout;
use crate::snapshot::Snapshot;
use crate::traits::{Launcher, Notice, SessionEvent, SnapshotStore};
use log::{debug, error, info, warn};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::sync::mpsc;
use std::time::Instant;
use uuid::Uuid;

/// Possible errors from the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The board refused an edit.
    #[error(transparent)]
    Edit(#[from] EditError),
    /// The launcher failed to open an item.
    #[error("launcher error: {0}")]
    Launcher(String),
    /// Commands arrived before loading finished.
    #[error("session not ready ({0:?})")]
    NotReady(SessionState),
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Ready,
    Dragging,
}

/// How a saved board is reconciled with a fresh catalog scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Forget items whose launch handle no longer exists on disk.
    pub prune_missing: bool,
    /// Append catalog items the saved board does not know yet.
    pub append_new_catalog_items: bool,
}

impl From<&StorageConfig> for LoadOptions {
    fn from(cfg: &StorageConfig) -> Self {
        Self {
            prune_missing: cfg.prune_missing,
            append_new_catalog_items: cfg.append_new_catalog_items,
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::from(&StorageConfig::default())
    }
}

/// An in-flight drag.
#[derive(Debug, Clone)]
struct ActiveDrag {
    item: ItemKey,
    /// Page the drag started on.
    origin_page: usize,
    /// Board version when the drag started.
    origin_version: u64,
    /// Cell currently hovered.
    cell: Option<usize>,
}

/// Memoized layout of the current page.
#[derive(Debug)]
struct CachedLayout {
    version: u64,
    page: usize,
    query: String,
    layout: PageLayout,
}

/// Owns the board and applies user commands to it.
///
/// Generic over the [`SnapshotStore`] and [`Launcher`] so tests can swap in
/// recorders.
///
/// # Typical usage
///
/// ```ignore
/// let mut session = LaunchSession::new(store, launcher, DragConfig::default());
/// session.begin_loading();
/// session.finish_loading(catalog_items, LoadOptions::default());
/// session.handle(Command::NextPage)?;
/// ```
pub struct LaunchSession<S: SnapshotStore, L: Launcher> {
    store: S,
    launcher: L,
    board: Board,
    state: SessionState,
    current_page: usize,
    query: String,
    drag: Option<ActiveDrag>,
    drag_config: DragConfig,
    edge_timer: EdgeHoverTimer,
    cache: RefCell<Option<CachedLayout>>,
    arrangements: Cell<u64>,
    events: Option<mpsc::Sender<SessionEvent>>,
}

impl<S: SnapshotStore, L: Launcher> LaunchSession<S, L> {
    /// Create an idle session with an empty board.
    pub fn new(store: S, launcher: L, drag_config: DragConfig) -> Self {
        Self {
            store,
            launcher,
            board: Board::default(),
            state: SessionState::Idle,
            current_page: 0,
            query: String::new(),
            drag: None,
            edge_timer: EdgeHoverTimer::new(&drag_config),
            drag_config,
            cache: RefCell::new(None),
            arrangements: Cell::new(0),
            events: None,
        }
    }

    /// Attach an event channel for a presentation layer.
    pub fn set_events(&mut self, tx: mpsc::Sender<SessionEvent>) {
        self.events = Some(tx);
    }

    //  Accessors

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Pages for the current query.
    pub fn total_pages(&self) -> usize {
        self.board.total_pages(&self.query)
    }

    /// Layout of the current page.
    ///
    /// Recomputed only when the board version, the page, or the query
    /// changed since the last call.
    pub fn layout(&self) -> PageLayout {
        if let Some(cached) = self.cache.borrow().as_ref() {
            if cached.version == self.board.version()
                && cached.page == self.current_page
                && cached.query == self.query
            {
                return cached.layout.clone();
            }
        }
        let layout = self.board.arrange(&self.query, self.current_page);
        self.arrangements.set(self.arrangements.get() + 1);
        debug!(
            "arranged page {} of {} (#{})",
            layout.page + 1,
            layout.total_pages,
            self.arrangements.get()
        );
        for warning in &layout.warnings {
            warn!("{}", warning);
        }
        *self.cache.borrow_mut() = Some(CachedLayout {
            version: self.board.version(),
            page: self.current_page,
            query: self.query.clone(),
            layout: layout.clone(),
        });
        layout
    }

    //  Loading

    /// Mark the session as waiting for the catalog scan.
    pub fn begin_loading(&mut self) {
        info!("loading board");
        self.state = SessionState::Loading;
    }

    /// Install the board from the store, reconciled with `catalog`.
    ///
    /// With nothing saved yet the catalog becomes the board.  Otherwise the
    /// saved board wins and `options` decide how the catalog amends it.
    pub fn finish_loading(&mut self, catalog: Vec<Item>, options: LoadOptions) {
        let snapshot = self.store.load();
        let mut changed = false;
        if snapshot.is_empty() {
            info!("no saved board, laying out {} catalog item(s)", catalog.len());
            self.board = Board::new(catalog, Vec::new());
            self.current_page = 0;
            changed = true;
        } else {
            let (board, page) = snapshot.into_board();
            self.board = board;
            self.current_page = page;
            if options.prune_missing {
                let pruned = self.board.retain_items(|i| Path::new(&i.path).exists());
                if pruned > 0 {
                    info!("pruned {} missing item(s)", pruned);
                    changed = true;
                }
            }
            if options.append_new_catalog_items {
                let added = self.board.append_new(catalog);
                if added > 0 {
                    info!("appended {} new catalog item(s)", added);
                    changed = true;
                }
            }
        }
        self.clamp_page();
        self.state = SessionState::Ready;
        info!(
            "board ready: {} item(s), {} group(s), page {} of {}",
            self.board.items().len(),
            self.board.groups().len(),
            self.current_page + 1,
            self.total_pages()
        );
        if changed {
            self.persist();
        }
        self.emit_layout();
    }

    //  Commands

    /// Process a single [`Command`] now.
    pub fn handle(&mut self, cmd: Command) -> Result<(), SessionError> {
        self.handle_at(cmd, Instant::now())
    }

    /// Process a single [`Command`] as if it arrived at `now`.
    ///
    /// Edits are applied in memory first; a failed save is logged and does
    /// not undo them.
    pub fn handle_at(&mut self, cmd: Command, now: Instant) -> Result<(), SessionError> {
        if matches!(self.state, SessionState::Idle | SessionState::Loading) {
            return Err(SessionError::NotReady(self.state));
        }
        match cmd {
            Command::DragBegin(item) => {
                debug!("drag begin {}", item.id);
                self.edge_timer.cancel();
                self.drag = Some(ActiveDrag {
                    item,
                    origin_page: self.current_page,
                    origin_version: self.board.version(),
                    cell: None,
                });
                self.state = SessionState::Dragging;
            }

            Command::DragHover { cell, edge } => {
                let Some(drag) = self.drag.as_mut() else {
                    debug!("hover without drag, ignoring");
                    return Ok(());
                };
                if drag.cell != cell {
                    drag.cell = cell;
                    self.edge_timer.cancel();
                }
                let was_armed = self.edge_timer.is_armed();
                self.edge_timer.hover(edge, now);
                if let (false, Some(edge), Some(remaining)) =
                    (was_armed, edge, self.edge_timer.remaining(now))
                {
                    self.send(SessionEvent::EdgeCountdown { edge, remaining });
                }
            }

            Command::DragEnd => {
                debug!("drag end");
                self.end_drag();
            }

            Command::Drop(req) => {
                let result = self.drop_item(&req);
                self.end_drag();
                result?;
            }

            Command::NextPage => {
                self.go_to_page(self.current_page + 1);
            }

            Command::PreviousPage => {
                self.go_to_page(self.current_page.saturating_sub(1));
            }

            Command::GoToPage(PageIndex(page)) => {
                info!("go to page {}", page);
                self.go_to_page(page);
            }

            Command::Search(text) => {
                debug!("search {:?}", text);
                self.set_query(text);
            }

            Command::ClearSearch => {
                self.set_query(String::new());
            }

            Command::Launch(id) => {
                let item = self.find_item(id).cloned().ok_or_else(|| {
                    self.notify(Notice::ItemNotFound(id));
                    EditError::NotFound(id)
                })?;
                self.launch(&item)?;
            }

            Command::LaunchFirstResult => {
                if self.query.is_empty() {
                    return Ok(());
                }
                let Some(item) = self
                    .board
                    .items()
                    .iter()
                    .find(|i| i.matches(&self.query))
                    .cloned()
                else {
                    self.notify(Notice::NoSearchResult);
                    return Ok(());
                };
                self.launch(&item)?;
                self.set_query(String::new());
            }

            Command::Ungroup { group, item, cell } => {
                if self.refuse_while_searching() {
                    return Ok(());
                }
                info!("ungroup {} from {}", item, group);
                let target = cell.map(|c| (self.current_page, c));
                let edit = self.board.ungroup(group, item, target)?;
                self.after_edit(edit);
            }

            Command::RenameGroup { group, name } => {
                if self.refuse_while_searching() {
                    return Ok(());
                }
                let edit = self.board.rename_group(group, &name)?;
                self.after_edit(edit);
            }

            Command::DissolveGroup(group) => {
                if self.refuse_while_searching() {
                    return Ok(());
                }
                info!("dissolve group {}", group);
                let edit = self.board.dissolve_group(group)?;
                self.after_edit(edit);
            }
        }
        Ok(())
    }

    /// Advance timers.  Turns the page when a drag has rested on a page
    /// edge long enough.
    pub fn tick(&mut self, now: Instant) {
        if self.state != SessionState::Dragging {
            return;
        }
        let Some(edge) = self.edge_timer.poll(now) else {
            return;
        };
        let target = match edge {
            PageEdge::Leading if self.current_page > 0 => self.current_page - 1,
            PageEdge::Trailing if self.current_page + 1 < self.page_limit() => self.current_page + 1,
            _ => return,
        };
        debug!("edge hover: page {} -> {}", self.current_page, target);
        self.current_page = target;
        self.emit_layout();
    }

    //  Drop handling

    fn drop_item(&mut self, req: &DropRequest) -> Result<(), SessionError> {
        if self.refuse_while_searching() {
            return Ok(());
        }
        let layout = self.layout();
        let Some(cell) = layout.cell(req.cell) else {
            warn!("drop on cell {} outside the grid, ignoring", req.cell);
            return Ok(());
        };
        let source = match self.board.locate(&req.item) {
            Ok(index) => index,
            Err(e) => {
                warn!("drop: {}", e);
                self.notify(Notice::ItemNotFound(req.item.id));
                return Err(e.into());
            }
        };
        if cell.id() == Some(self.board.items()[source].id) {
            debug!("dropped onto its own cell, nothing to do");
            return Ok(());
        }
        let action = resolve_drop(req.cell, req.offset_x, req.cell_width, cell.kind());
        info!("drop {} -> {:?} on page {}", req.item.id, action, self.current_page);
        let edit = self
            .board
            .apply(action, &req.item, self.current_page, &self.query)?;
        self.after_edit(edit);
        Ok(())
    }

    fn end_drag(&mut self) {
        self.edge_timer.cancel();
        let Some(drag) = self.drag.take() else {
            self.state = SessionState::Ready;
            return;
        };
        debug!("drag of {} finished", drag.item.id);
        self.state = SessionState::Ready;
        let before = self.current_page;
        self.clamp_page();
        let clamped = before != self.current_page;
        if clamped {
            self.emit_layout();
        }
        // An applied drop already saved the page it happened on.
        let edited = self.board.version() != drag.origin_version;
        if (edited && clamped) || (!edited && self.current_page != drag.origin_page) {
            self.persist();
        }
    }

    //  Helpers

    /// Log and report an edit attempted during a search.  Returns `true`
    /// when the edit must be skipped.
    fn refuse_while_searching(&self) -> bool {
        if self.query.is_empty() {
            return false;
        }
        warn!("board is read-only while searching ({:?})", self.query);
        self.notify(Notice::SearchActive);
        true
    }

    fn after_edit(&mut self, edit: Edit) {
        if !edit.is_applied() {
            debug!("edit changed nothing");
            return;
        }
        if self.state != SessionState::Dragging {
            self.clamp_page();
        }
        self.persist();
        self.emit_layout();
    }

    fn go_to_page(&mut self, page: usize) {
        let target = page.min(self.total_pages() - 1);
        if target == self.current_page {
            return;
        }
        self.current_page = target;
        if self.state != SessionState::Dragging {
            self.persist();
        }
        self.emit_layout();
    }

    fn set_query(&mut self, text: String) {
        if text == self.query {
            return;
        }
        self.query = text;
        self.clamp_page();
        self.emit_layout();
    }

    fn launch(&self, item: &Item) -> Result<(), SessionError> {
        info!("launch {}", item.display_name);
        self.launcher
            .launch(item)
            .map_err(|e| SessionError::Launcher(e.to_string()))
    }

    /// A listed or grouped item by identifier.
    fn find_item(&self, id: Uuid) -> Option<&Item> {
        self.board
            .items()
            .iter()
            .chain(self.board.groups().iter().flat_map(|g| g.items.iter()))
            .find(|i| i.id == id)
    }

    /// Pages reachable right now; one extra, empty page while dragging.
    fn page_limit(&self) -> usize {
        let extra = self.state == SessionState::Dragging && self.drag_config.allow_trailing_page;
        self.total_pages() + usize::from(extra)
    }

    fn clamp_page(&mut self) {
        let last = self.page_limit() - 1;
        if self.current_page > last {
            self.current_page = last;
        }
    }

    fn persist(&mut self) {
        self.board.refresh_position_hints();
        let snapshot = Snapshot::capture(&self.board, self.current_page);
        if let Err(e) = self.store.save(&snapshot) {
            error!("failed to save board: {}", e);
        }
    }

    fn send(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    fn notify(&self, notice: Notice) {
        self.send(SessionEvent::Notice(notice));
    }

    fn emit_layout(&self) {
        if self.events.is_some() {
            let layout = self.layout();
            self.send(SessionEvent::PageChanged {
                page: self.current_page,
                total_pages: layout.total_pages,
            });
            self.send(SessionEvent::LayoutChanged(layout));
        }
    }
}

//  Tests
