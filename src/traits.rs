//! Boundary traits for the services the planner calls out to.
//!
//! Map rendering, route optimization and trip naming live outside this crate. Apps supply
//! their own implementations; tests use in-memory fakes.

use crate::location::{MarkerHandle, Place};
use crate::optimizer::{OptimizeError, OptimizeRequest};

/// The map layer that owns marker visuals.
///
/// Handles are issued by the layer and only ever passed back to it.
pub trait MarkerLayer {
    /// Place a marker at (lat, lng) and return its handle.
    fn create_marker(&mut self, coords: (f64, f64), title: &str) -> MarkerHandle;

    /// Remove a marker from the map. Fire-and-forget.
    fn dispose_marker(&mut self, handle: MarkerHandle);

    /// Move the viewport so every coordinate is visible.
    fn fit_bounds(&mut self, coords: &[(f64, f64)]);
}

/// External route optimizer.
///
/// Returns a sequence of indices into `request.locations`.
pub trait RouteOptimizer {
    fn optimize(&self, request: &OptimizeRequest) -> Result<Vec<usize>, OptimizeError>;
}

/// Suggests a display name for a trip from its places.
pub trait TripNamer {
    fn name_trip(&self, places: &[Place]) -> Result<String, OptimizeError>;
}

/// Marker layer that draws nothing. Handles are still unique.
#[derive(Debug, Clone, Default)]
pub struct DetachedMarkers {
    next: u64,
}

impl MarkerLayer for DetachedMarkers {
    fn create_marker(&mut self, _coords: (f64, f64), _title: &str) -> MarkerHandle {
        self.next += 1;
        MarkerHandle::new(self.next)
    }

    fn dispose_marker(&mut self, _handle: MarkerHandle) {}

    fn fit_bounds(&mut self, _coords: &[(f64, f64)]) {}
}
