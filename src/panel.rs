//! Bottom-sheet panel controller.
//!
//! Turns a vertical pointer drag on a panel handle into one of three
//! committed heights. While the drag is live the panel follows the pointer
//! (clamped to the viewport); on release it snaps to the nearest breakpoint.
//!
//! ```text
//! Idle --start--> Dragging --move--> Dragging --end/cancel--> Idle
//! ```
//!
//! Hosts attach move/end listeners on [`PanelEffect::DragStarted`] and
//! detach them on [`PanelEffect::Snapped`]; [`PanelController::is_dragging`]
//! reports which of the two applies.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Committed panel height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelHeight {
    Minimized,
    Partial,
    Full,
}

impl PanelHeight {
    /// Ordered from most closed to most open.
    pub const ALL: [PanelHeight; 3] = [PanelHeight::Minimized, PanelHeight::Partial, PanelHeight::Full];
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    /// Fixed height of the minimized sheet in pixels.
    pub minimized_px: f64,
    /// Partial height as a fraction of the viewport.
    pub partial_ratio: f64,
    /// Full height as a fraction of the viewport.
    pub full_ratio: f64,
    /// Lowest height a live drag may reach.
    pub min_drag_px: f64,
    /// Highest height a live drag may reach, as a fraction of the viewport.
    pub max_drag_ratio: f64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            minimized_px: 96.0,
            partial_ratio: 0.40,
            full_ratio: 0.85,
            min_drag_px: 80.0,
            max_drag_ratio: 0.95,
        }
    }
}

/// Pixel heights of each committed state for one viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoints {
    pub minimized: f64,
    pub partial: f64,
    pub full: f64,
}

impl Breakpoints {
    pub fn for_viewport(viewport_height: f64, config: &PanelConfig) -> Self {
        Self {
            minimized: config.minimized_px,
            partial: viewport_height * config.partial_ratio,
            full: viewport_height * config.full_ratio,
        }
    }

    pub fn height_of(&self, state: PanelHeight) -> f64 {
        match state {
            PanelHeight::Minimized => self.minimized,
            PanelHeight::Partial => self.partial,
            PanelHeight::Full => self.full,
        }
    }

    /// State whose breakpoint is closest to `height`.
    ///
    /// On an exact tie the state lying in the direction of travel wins:
    /// the more open one when `opening`, the more closed one otherwise.
    pub fn nearest(&self, height: f64, opening: bool) -> PanelHeight {
        let mut best = PanelHeight::Minimized;
        let mut best_diff = f64::INFINITY;
        for state in PanelHeight::ALL {
            let diff = (self.height_of(state) - height).abs();
            // ALL runs closed -> open, so `<=` keeps the later (more open) state on ties.
            let better = if opening { diff <= best_diff } else { diff < best_diff };
            if better {
                best = state;
                best_diff = diff;
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

/// Where a gesture came from. Touch callers pass the first touch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse(MouseButton),
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging {
        origin_y: f64,
        start_height: f64,
        current_height: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelNoopReason {
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    NonPrimaryButton,
    NonFinitePosition,
}

/// Result of feeding one pointer event to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEffect {
    DragStarted { height: f64 },
    DragUpdated { height: f64 },
    Snapped {
        from: PanelHeight,
        to: PanelHeight,
        height: f64,
    },
    Noop { reason: PanelNoopReason },
}

type HeightCallback = Box<dyn FnMut(PanelHeight)>;

pub struct PanelController {
    config: PanelConfig,
    viewport_height: f64,
    breakpoints: Breakpoints,
    state: PanelHeight,
    gesture: GestureState,
    on_change: Option<HeightCallback>,
}

impl fmt::Debug for PanelController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelController")
            .field("viewport_height", &self.viewport_height)
            .field("breakpoints", &self.breakpoints)
            .field("state", &self.state)
            .field("gesture", &self.gesture)
            .finish_non_exhaustive()
    }
}

impl PanelController {
    pub fn new(initial: PanelHeight, viewport_height: f64) -> Self {
        Self::with_config(initial, viewport_height, PanelConfig::default())
    }

    pub fn with_config(initial: PanelHeight, viewport_height: f64, config: PanelConfig) -> Self {
        let breakpoints = Breakpoints::for_viewport(viewport_height, &config);
        Self {
            config,
            viewport_height,
            breakpoints,
            state: initial,
            gesture: GestureState::Idle,
            on_change: None,
        }
    }

    /// Called with the snapped state every time a drag is released.
    pub fn on_height_change(mut self, callback: impl FnMut(PanelHeight) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> PanelHeight {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, GestureState::Dragging { .. })
    }

    pub fn breakpoints(&self) -> Breakpoints {
        self.breakpoints
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Height the panel should be drawn at right now.
    pub fn display_height(&self) -> f64 {
        match self.gesture {
            GestureState::Dragging { current_height, .. } => current_height,
            GestureState::Idle => self.breakpoints.height_of(self.state),
        }
    }

    /// Recompute breakpoints for a new viewport. A live drag is re-clamped.
    pub fn set_viewport(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height;
        self.breakpoints = Breakpoints::for_viewport(viewport_height, &self.config);
        if let GestureState::Dragging { current_height, .. } = &mut self.gesture {
            let (min, max) = drag_limits(viewport_height, &self.config);
            *current_height = current_height.clamp(min, max);
        }
        debug!(viewport_height, "panel breakpoints recomputed");
    }

    /// Pointer down on the handle at vertical position `y`.
    pub fn start(&mut self, source: PointerSource, y: f64) -> PanelEffect {
        if let PointerSource::Mouse(button) = source {
            if button != MouseButton::Primary {
                return PanelEffect::Noop {
                    reason: PanelNoopReason::NonPrimaryButton,
                };
            }
        }
        if self.is_dragging() {
            return PanelEffect::Noop {
                reason: PanelNoopReason::ActiveDragAlreadyInProgress,
            };
        }
        if !y.is_finite() {
            return PanelEffect::Noop {
                reason: PanelNoopReason::NonFinitePosition,
            };
        }

        let height = self.breakpoints.height_of(self.state);
        self.gesture = GestureState::Dragging {
            origin_y: y,
            start_height: height,
            current_height: height,
        };
        debug!(?source, height, "panel drag started");
        PanelEffect::DragStarted { height }
    }

    /// Pointer moved to vertical position `y`. Dragging up grows the panel.
    pub fn move_to(&mut self, y: f64) -> PanelEffect {
        if self.is_dragging() && !y.is_finite() {
            return PanelEffect::Noop {
                reason: PanelNoopReason::NonFinitePosition,
            };
        }
        let (min, max) = drag_limits(self.viewport_height, &self.config);
        match &mut self.gesture {
            GestureState::Idle => PanelEffect::Noop {
                reason: PanelNoopReason::IdleWithoutActiveDrag,
            },
            GestureState::Dragging {
                origin_y,
                start_height,
                current_height,
            } => {
                let height = (*start_height + (*origin_y - y)).clamp(min, max);
                *current_height = height;
                trace!(y, height, "panel drag updated");
                PanelEffect::DragUpdated { height }
            }
        }
    }

    /// Pointer released: snap to the nearest breakpoint and fire the callback.
    pub fn end(&mut self) -> PanelEffect {
        let GestureState::Dragging {
            start_height,
            current_height,
            ..
        } = self.gesture
        else {
            return PanelEffect::Noop {
                reason: PanelNoopReason::IdleWithoutActiveDrag,
            };
        };
        self.gesture = GestureState::Idle;

        let from = self.state;
        let to = self.breakpoints.nearest(current_height, current_height >= start_height);
        self.state = to;
        debug!(?from, ?to, released_at = current_height, "panel snapped");

        if let Some(callback) = self.on_change.as_mut() {
            callback(to);
        }
        PanelEffect::Snapped {
            from,
            to,
            height: self.breakpoints.height_of(to),
        }
    }

    /// Lost pointer capture. Treated the same as a release.
    pub fn cancel(&mut self) -> PanelEffect {
        self.end()
    }
}

fn drag_limits(viewport_height: f64, config: &PanelConfig) -> (f64, f64) {
    let min = config.min_drag_px;
    let max = (viewport_height * config.max_drag_ratio).max(min);
    (min, max)
}
