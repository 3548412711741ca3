//! Serializable trip record for saving and reloading an itinerary.

use serde::{Deserialize, Serialize};

use crate::itinerary::ItineraryState;
use crate::location::Place;

/// Plain snapshot of a trip. Marker handles are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub locations: Vec<Place>,
    #[serde(default)]
    pub optimized_route: Option<Vec<usize>>,
    #[serde(default)]
    pub start_index: Option<usize>,
    #[serde(default)]
    pub end_index: Option<usize>,
}

impl TripRecord {
    pub fn from_state(state: &ItineraryState) -> Self {
        Self {
            name: None,
            locations: state.locations().iter().map(|location| location.place.clone()).collect(),
            optimized_route: state.optimized_route().map(<[usize]>::to_vec),
            start_index: state.start_index(),
            end_index: state.end_index(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
