//! Route geometry handed to the map layer for drawing.

use serde::{Deserialize, Serialize};

/// Ordered (lat, lng) points of a drawn route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the loop back to the first point.
    ///
    /// Paths with fewer than two points, or that already end where they
    /// start, are returned unchanged.
    pub fn closed(mut self) -> Self {
        if let (Some(&first), Some(&last)) = (self.points.first(), self.points.last()) {
            if self.points.len() > 1 && first != last {
                self.points.push(first);
            }
        }
        self
    }

    /// South-west and north-east corners, or `None` when empty.
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let (&first, rest) = self.points.split_first()?;
        Some(rest.iter().fold((first, first), |(sw, ne), &(lat, lng)| {
            ((sw.0.min(lat), sw.1.min(lng)), (ne.0.max(lat), ne.1.max(lng)))
        }))
    }
}
