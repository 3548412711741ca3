//! Which bottom sheet is open on narrow screens.
//!
//! Only one panel is visible at a time. Each keeps its own committed height
//! so switching back restores where the user left it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::panel::PanelHeight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Itinerary,
    Chat,
    Route,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelNav {
    active: Option<PanelKind>,
    itinerary: PanelHeight,
    chat: PanelHeight,
    route: PanelHeight,
}

impl Default for PanelNav {
    fn default() -> Self {
        Self {
            active: None,
            itinerary: PanelHeight::Partial,
            chat: PanelHeight::Partial,
            route: PanelHeight::Partial,
        }
    }
}

impl PanelNav {
    pub fn active(&self) -> Option<PanelKind> {
        self.active
    }

    pub fn is_open(&self, panel: PanelKind) -> bool {
        self.active == Some(panel)
    }

    pub fn height(&self, panel: PanelKind) -> PanelHeight {
        match panel {
            PanelKind::Itinerary => self.itinerary,
            PanelKind::Chat => self.chat,
            PanelKind::Route => self.route,
        }
    }

    /// Tab tap: closes the panel if it is already open, otherwise opens it
    /// in place of whatever was open.
    pub fn toggle(&mut self, panel: PanelKind) {
        self.active = if self.is_open(panel) { None } else { Some(panel) };
        debug!(active = ?self.active, "panel toggled");
    }

    pub fn open(&mut self, panel: PanelKind) {
        self.active = Some(panel);
    }

    pub fn close(&mut self) {
        self.active = None;
    }

    /// Apply a snapped height from a panel's controller. Snapping to
    /// minimized closes the panel and leaves its stored height alone.
    pub fn on_height_change(&mut self, panel: PanelKind, height: PanelHeight) {
        if height == PanelHeight::Minimized {
            if self.is_open(panel) {
                self.close();
            }
            return;
        }
        match panel {
            PanelKind::Itinerary => self.itinerary = height,
            PanelKind::Chat => self.chat = height,
            PanelKind::Route => self.route = height,
        }
    }
}
