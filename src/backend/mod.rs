//! Desktop backends.
//!
//! Concrete implementations of
//! [`SnapshotStore`](crate::traits::SnapshotStore),
//! [`CatalogSource`](crate::traits::CatalogSource) and
//! [`Launcher`](crate::traits::Launcher) for a regular Linux desktop.
//!
//! Hosts wire these into a [`LaunchSession`](crate::session::LaunchSession);
//! tests use in-memory doubles instead.

pub mod catalog;
pub mod launcher;
pub mod store;
