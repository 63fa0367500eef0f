//! Auto page-turn while a drag hovers at a page edge.
//!
//! Holding a dragged item over the leading or trailing edge of the board
//! for [`DragConfig::edge_hover_ms`] turns the page, so items can be moved
//! across pages without releasing.  Keeping the item there turns again
//! after another full delay.
//!
//! The timer is driven by the caller's clock ([`EdgeHoverTimer::poll`]
//! takes an [`Instant`]) so it needs no thread of its own.  It must be
//! cancelled whenever the drag ends or the hovered target changes, or it
//! would turn the page after the gesture is gone.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Drag behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// How long a drag must rest on a page edge before the page turns (ms).
    /// `0` disables auto page-turning.
    pub edge_hover_ms: u64,
    /// Whether hovering the trailing edge of the last page opens one extra,
    /// empty page to drop onto.
    pub allow_trailing_page: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            edge_hover_ms: 600,
            allow_trailing_page: true,
        }
    }
}

/// Which side of the board the drag rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageEdge {
    /// Towards the previous page.
    Leading,
    /// Towards the next page.
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    edge: PageEdge,
    since: Instant,
}

/// One-shot-per-delay timer for edge hovering.
#[derive(Debug)]
pub struct EdgeHoverTimer {
    delay: Duration,
    armed: Option<Armed>,
}

impl EdgeHoverTimer {
    pub fn new(config: &DragConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.edge_hover_ms),
            armed: None,
        }
    }

    /// Report that the drag now rests on `edge` (or on no edge).
    ///
    /// Hovering the same edge again keeps the running countdown; any other
    /// target restarts or stops it.
    pub fn hover(&mut self, edge: Option<PageEdge>, now: Instant) {
        if self.delay.is_zero() {
            self.armed = None;
            return;
        }
        self.armed = match (self.armed, edge) {
            (Some(armed), Some(edge)) if armed.edge == edge => Some(armed),
            (_, Some(edge)) => Some(Armed { edge, since: now }),
            (_, None) => None,
        };
    }

    /// Stop the countdown.
    pub fn cancel(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Returns the edge to turn towards once the delay has passed, and
    /// re-arms for the next turn.
    pub fn poll(&mut self, now: Instant) -> Option<PageEdge> {
        let armed = self.armed?;
        if now.saturating_duration_since(armed.since) < self.delay {
            return None;
        }
        self.armed = Some(Armed {
            edge: armed.edge,
            since: now,
        });
        Some(armed.edge)
    }

    /// Time left before the next turn, if armed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.armed
            .map(|a| self.delay.saturating_sub(now.saturating_duration_since(a.since)))
    }
}

//  Tests
