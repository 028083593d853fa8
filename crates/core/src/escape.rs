//! Manual escape hatch for a page that appears stuck
//!
//! `Hidden -> Idle` when the mount timer fires, `Idle -> Busy` on click, and
//! the busy state only ends when the document reload navigates away. Nothing
//! ever returns to `Hidden`.

use crate::config::GuardConfig;
use crate::navigation::WipeTarget;
use crate::wipe::{SessionWipe, WipeReport};
use std::cell::Cell;
use tracing::{debug, info};

/// Visible state of the escape control
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EscapePhase {
    /// Timer still running; the control is not rendered at all
    #[default]
    Hidden,
    /// Shown and clickable
    Idle,
    /// Wipe in flight; clicks are ignored
    Busy,
}

impl EscapePhase {
    /// Timer expiry
    #[must_use]
    pub const fn expire(self) -> Self {
        match self {
            Self::Hidden => Self::Idle,
            other => other,
        }
    }

    /// Click on the control; the flag says whether a wipe should start
    #[must_use]
    pub const fn click(self) -> (Self, bool) {
        match self {
            Self::Idle => (Self::Busy, true),
            other => (other, false),
        }
    }

    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }

    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// Escape control state for one mount
pub struct StuckPageEscape {
    wipe: SessionWipe,
    delay_ms: u32,
    root_route: String,
    phase: Cell<EscapePhase>,
    mounted: Cell<bool>,
}

impl StuckPageEscape {
    #[must_use]
    pub fn new(wipe: SessionWipe, config: &GuardConfig) -> Self {
        Self {
            wipe,
            delay_ms: config.escape_delay_ms,
            root_route: config.root_route.clone(),
            phase: Cell::new(EscapePhase::Hidden),
            mounted: Cell::new(true),
        }
    }

    /// How long the timer started on mount runs
    #[must_use]
    pub const fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    #[must_use]
    pub fn phase(&self) -> EscapePhase {
        self.phase.get()
    }

    /// Timer callback; a no-op once unmounted
    pub fn on_timer_expired(&self) -> EscapePhase {
        if self.mounted.get() {
            let phase = self.phase.get().expire();
            debug!(?phase, "Escape timer expired");
            self.phase.set(phase);
        }
        self.phase.get()
    }

    /// Apply the time elapsed since mount
    pub fn advance(&self, elapsed_ms: u32) -> EscapePhase {
        if elapsed_ms >= self.delay_ms {
            self.on_timer_expired()
        } else {
            self.phase.get()
        }
    }

    pub fn unmount(&self) {
        self.mounted.set(false);
    }

    /// Enter the busy state if the control is idle
    pub fn begin(&self) -> bool {
        let (phase, start) = self.phase.get().click();
        self.phase.set(phase);
        start
    }

    /// Handle a click: wipe and reload the document root
    ///
    /// Returns `None` when the click was ignored (hidden or already busy).
    pub async fn trigger(&self) -> Option<WipeReport> {
        if !self.begin() {
            return None;
        }
        Some(self.reset().await)
    }

    /// Wipe and reload the document root without touching the phase
    ///
    /// Callers that already switched to busy through [`Self::begin`] use this
    /// so the busy state can render before the wipe starts.
    pub async fn reset(&self) -> WipeReport {
        info!(path = %self.root_route, "Manual session reset requested");
        self.wipe
            .run(&WipeTarget::DocumentReload(self.root_route.clone()))
            .await
    }
}
