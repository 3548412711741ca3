//! Locations selected into an itinerary.

use serde::{Deserialize, Serialize};

/// Opaque reference to a marker owned by the map layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A place picked from search, before it has a marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

impl Place {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            address: None,
            lat,
            lng,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// An itinerary entry.
///
/// `name` is the de-duplication key inside an itinerary. The marker handle,
/// when present, belongs to the map layer that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub place: Place,
    pub marker: Option<MarkerHandle>,
}

impl Location {
    pub fn new(place: Place) -> Self {
        Self {
            place,
            marker: None,
        }
    }

    pub fn with_marker(place: Place, marker: MarkerHandle) -> Self {
        Self {
            place,
            marker: Some(marker),
        }
    }

    pub fn name(&self) -> &str {
        &self.place.name
    }

    pub fn coords(&self) -> (f64, f64) {
        self.place.coords()
    }
}
