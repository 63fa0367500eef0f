//! **launchgrid**: a paged launcher board.
//!
//! Items are laid out on pages of a fixed `7 × 5` grid.  User-created
//! groups are pinned to a slot; the ordered item list flows around them
//! across as many pages as needed.  Dragging an item onto another cell
//! either reorders it or folds both into a group, depending on where it is
//! released.
//!
//! # Architecture
//!
//! * [`layout`] and [`drop`] are pure: they arrange a page and classify a
//!   release without touching any state.
//! * [`board::Board`] owns the item list and the groups and applies edits.
//! * [`session::LaunchSession`] drives the board from [`command::Command`]s
//!   and persists a [`snapshot::Snapshot`] after every change.
//!
//! The session is decoupled from the outside world by the traits in
//! [`traits`]: [`traits::SnapshotStore`], [`traits::CatalogSource`],
//! [`traits::Launcher`] and [`traits::CommandSource`].  Desktop
//! implementations live in [`backend`] and [`ipc`].

pub mod backend;
pub mod board;
pub mod command;
pub mod config;
pub mod drop;
pub mod hover;
pub mod ipc;
pub mod item;
pub mod layout;
pub mod session;
pub mod snapshot;
pub mod traits;
