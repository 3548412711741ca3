//! Shared fixtures for trip-planner tests.
//!
//! - Real Las Vegas sights (coordinates from OpenStreetMap)
//! - A marker layer that records what it was asked to do
//! - An optimizer that replays scripted answers
//! - A namer with a fixed answer

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use trip_planner::location::{MarkerHandle, Place};
use trip_planner::optimizer::{OptimizeError, OptimizeRequest};
use trip_planner::traits::{MarkerLayer, RouteOptimizer, TripNamer};

pub const SIGHTS: &[(&str, f64, f64)] = &[
    ("Bellagio Fountains", 36.1126, -115.1767),
    ("Fremont Street", 36.1707, -115.1437),
    ("Hoover Dam", 36.0161, -114.7377),
    ("Red Rock Canyon", 36.1357, -115.4270),
    ("The Sphere", 36.1207, -115.1622),
    ("Neon Museum", 36.1770, -115.1355),
];

pub fn sight(index: usize) -> Place {
    let (name, lat, lng) = SIGHTS[index];
    Place::new(name, lat, lng)
}

pub fn sights(count: usize) -> Vec<Place> {
    (0..count).map(sight).collect()
}

#[derive(Debug, Default)]
pub struct RecordingMarkers {
    next: u64,
    pub created: Vec<(MarkerHandle, String)>,
    pub disposed: Vec<MarkerHandle>,
    pub fitted: Vec<Vec<(f64, f64)>>,
}

impl RecordingMarkers {
    /// Markers created and not yet disposed.
    pub fn live(&self) -> usize {
        self.created.len() - self.disposed.len()
    }
}

impl MarkerLayer for RecordingMarkers {
    fn create_marker(&mut self, _coords: (f64, f64), title: &str) -> MarkerHandle {
        self.next += 1;
        let handle = MarkerHandle::new(self.next);
        self.created.push((handle, title.to_string()));
        handle
    }

    fn dispose_marker(&mut self, handle: MarkerHandle) {
        self.disposed.push(handle);
    }

    fn fit_bounds(&mut self, coords: &[(f64, f64)]) {
        self.fitted.push(coords.to_vec());
    }
}

#[derive(Debug, Default)]
pub struct ScriptedOptimizer {
    responses: RefCell<VecDeque<Result<Vec<usize>, OptimizeError>>>,
    pub requests: RefCell<Vec<OptimizeRequest>>,
}

impl ScriptedOptimizer {
    pub fn answering(route: Vec<usize>) -> Self {
        let optimizer = Self::default();
        optimizer.push(Ok(route));
        optimizer
    }

    pub fn push(&self, response: Result<Vec<usize>, OptimizeError>) {
        self.responses.borrow_mut().push_back(response);
    }
}

impl RouteOptimizer for ScriptedOptimizer {
    fn optimize(&self, request: &OptimizeRequest) -> Result<Vec<usize>, OptimizeError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(OptimizeError::EmptyResponse))
    }
}

/// Answers the first naming call with a fixed result, then `EmptyResponse`.
#[derive(Debug, Default)]
pub struct FixedNamer {
    answer: RefCell<Option<Result<String, OptimizeError>>>,
    pub calls: Cell<usize>,
}

impl FixedNamer {
    pub fn answering(answer: Result<String, OptimizeError>) -> Self {
        Self {
            answer: RefCell::new(Some(answer)),
            calls: Cell::new(0),
        }
    }
}

impl TripNamer for FixedNamer {
    fn name_trip(&self, _places: &[Place]) -> Result<String, OptimizeError> {
        self.calls.set(self.calls.get() + 1);
        self.answer
            .borrow_mut()
            .take()
            .unwrap_or(Err(OptimizeError::EmptyResponse))
    }
}
