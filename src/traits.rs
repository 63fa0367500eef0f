//! Core traits that decouple the launcher board from storage, app
//! discovery, process spawning, and the gesture transport.
//!
//! Every concrete backend (a JSON file, a manifest catalog, a Unix-socket
//! listener, a test recorder, …) implements one of these traits.  The
//! [`LaunchSession`](crate::session::LaunchSession) only depends on these
//! abstractions.

use crate::command::Command;
use crate::hover::PageEdge;
use crate::item::Item;
use crate::layout::PageLayout;
use crate::snapshot::Snapshot;
use std::sync::mpsc;
use std::time::Duration;
use uuid::Uuid;

/// Somewhere a [`Snapshot`] lives between runs.
///
/// # Contract
///
/// * [`load`](SnapshotStore::load) never fails: a missing or unreadable
///   snapshot yields [`Snapshot::default`].
/// * [`save`](SnapshotStore::save) replaces the stored snapshot as a whole
///   or not at all.  A failed save is reported but the caller keeps its
///   in-memory state.
pub trait SnapshotStore {
    /// The error type produced when saving.
    type Error: std::error::Error + Send + 'static;

    fn load(&self) -> Snapshot;

    fn save(&self, snapshot: &Snapshot) -> Result<(), Self::Error>;
}

/// A source of installed applications.
///
/// The returned list is taken as-is: deduplicated, filtered of anything
/// not meant for the user, in the order new items should be appended.
/// Implementations must be [`Send`] so the scan can run on a background
/// thread.
pub trait CatalogSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    fn scan(&mut self) -> Result<Vec<Item>, Self::Error>;
}

/// Opens an item's launch handle.
pub trait Launcher {
    /// The error type produced by this launcher.
    type Error: std::error::Error + Send + 'static;

    fn launch(&self, item: &Item) -> Result<(), Self::Error>;
}

//  Session events

/// User-facing feedback that does not change the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A dragged or launched item could not be found.
    ItemNotFound(Uuid),
    /// An edit was ignored because a search filter is active.
    SearchActive,
    /// The board has no items matching the current search.
    NoSearchResult,
}

/// Events sent from the [`LaunchSession`](crate::session::LaunchSession) to
/// a presentation layer over an [`mpsc`](std::sync::mpsc) channel.
///
/// The session holds an `Option<mpsc::Sender<SessionEvent>>`; whoever owns
/// the receiver (a renderer, a debug logger, a test) sees every change
/// without being owned by the session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The visible page changed contents (edit, search, or page turn).
    LayoutChanged(PageLayout),
    /// The current page or the page count changed.
    PageChanged { page: usize, total_pages: usize },
    /// A drag started resting on a page edge; the page turns after
    /// `remaining` unless the drag moves on.
    EdgeCountdown { edge: PageEdge, remaining: Duration },
    /// Feedback for the user.
    Notice(Notice),
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, an in-memory
/// channel) and forward parsed commands into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::PageIndex;
    use std::cell::RefCell;

    #[derive(Debug, thiserror::Error)]
    #[error("mock error")]
    struct MockError;

    /// Keeps the last saved snapshot in memory.
    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<Option<Snapshot>>,
    }

    impl SnapshotStore for MemoryStore {
        type Error = MockError;

        fn load(&self) -> Snapshot {
            self.saved.borrow().clone().unwrap_or_default()
        }

        fn save(&self, snapshot: &Snapshot) -> Result<(), MockError> {
            *self.saved.borrow_mut() = Some(snapshot.clone());
            Ok(())
        }
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::default();
        assert!(store.load().is_empty());
        let snapshot = Snapshot {
            current_page: 4,
            ..Snapshot::default()
        };
        store.save(&snapshot).unwrap();
        assert_eq!(store.load().current_page, 4);
    }

    struct MockSource {
        commands: Vec<Command>,
    }

    impl CommandSource for MockSource {
        type Error = MockError;

        fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), MockError> {
            for cmd in self.commands.drain(..) {
                let _ = sink.send(cmd);
            }
            Ok(())
        }
    }

    #[test]
    fn mock_source_emits_commands() {
        let mut src = MockSource {
            commands: vec![Command::NextPage, Command::GoToPage(PageIndex(2))],
        };
        let (tx, rx) = mpsc::channel();
        src.run(tx).unwrap();
        let cmds: Vec<Command> = rx.try_iter().collect();
        assert_eq!(cmds, vec![Command::NextPage, Command::GoToPage(PageIndex(2))]);
    }
}
