//! Itinerary ordering engine.
//!
//! Owns the ordered list of selected locations together with the optional
//! start/end anchors and the last optimized route. Every mutation goes
//! through [`ItineraryStore`] so anchors always point at existing entries
//! and a stale optimized route never survives a change to the list.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::location::{Location, Place};
use crate::traits::MarkerLayer;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItineraryError {
    #[error("Location already in itinerary: {name}")]
    DuplicateLocation { name: String },

    #[error("Index {index} out of range for itinerary of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Cannot move entry {index} onto itself")]
    ReorderInPlace { index: usize },
}

impl ItineraryError {
    /// Only duplicate adds are expected in normal use; everything else is a
    /// caller bug.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ItineraryError::DuplicateLocation { .. })
    }
}

/// Snapshot of the itinerary handed to observers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItineraryState {
    locations: Vec<Location>,
    start_index: Option<usize>,
    end_index: Option<usize>,
    optimized_route: Option<Vec<usize>>,
    revision: u64,
}

impl ItineraryState {
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn start_index(&self) -> Option<usize> {
        self.start_index
    }

    pub fn end_index(&self) -> Option<usize> {
        self.end_index
    }

    pub fn optimized_route(&self) -> Option<&[usize]> {
        self.optimized_route.as_deref()
    }

    /// Bumped by every successful itinerary or anchor mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locations.iter().any(|location| location.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.locations.iter().map(Location::name).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&ItineraryState)>;

pub struct ItineraryStore<M: MarkerLayer> {
    state: ItineraryState,
    markers: M,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<M: MarkerLayer + fmt::Debug> fmt::Debug for ItineraryStore<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItineraryStore")
            .field("state", &self.state)
            .field("markers", &self.markers)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<M: MarkerLayer> ItineraryStore<M> {
    pub fn new(markers: M) -> Self {
        Self {
            state: ItineraryState::default(),
            markers,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &ItineraryState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn markers(&self) -> &M {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut M {
        &mut self.markers
    }

    /// Register an observer. It is called once after every successful
    /// operation, never for rejected ones.
    pub fn subscribe(&mut self, observer: impl FnMut(&ItineraryState) + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Append a location unless one with the same name is already present.
    pub fn add(&mut self, location: Location) -> Result<(), ItineraryError> {
        if self.state.contains(location.name()) {
            warn!(name = location.name(), "rejected duplicate location");
            return Err(ItineraryError::DuplicateLocation {
                name: location.name().to_string(),
            });
        }

        debug!(name = location.name(), len = self.state.len() + 1, "added location");
        self.state.locations.push(location);
        self.commit();
        Ok(())
    }

    /// Remove the entry at `index`, dispose its marker and return its place.
    pub fn remove(&mut self, index: usize) -> Result<Place, ItineraryError> {
        self.check_index(index)?;

        let removed = self.state.locations.remove(index);
        if let Some(handle) = removed.marker {
            self.markers.dispose_marker(handle);
        }
        self.state.start_index = self.state.start_index.and_then(|anchor| remap_after_remove(anchor, index));
        self.state.end_index = self.state.end_index.and_then(|anchor| remap_after_remove(anchor, index));

        debug!(index, len = self.state.len(), "removed location");
        self.commit();
        Ok(removed.place)
    }

    /// Move the entry at `source` to `destination`, shifting the entries in
    /// between by one.
    pub fn reorder(&mut self, source: usize, destination: usize) -> Result<(), ItineraryError> {
        self.check_index(source)?;
        self.check_index(destination)?;
        if source == destination {
            return Err(ItineraryError::ReorderInPlace { index: source });
        }

        let moved = self.state.locations.remove(source);
        self.state.locations.insert(destination, moved);
        self.state.start_index = self
            .state
            .start_index
            .map(|anchor| remap_after_reorder(anchor, source, destination));
        self.state.end_index = self
            .state
            .end_index
            .map(|anchor| remap_after_reorder(anchor, source, destination));

        debug!(source, destination, "reordered location");
        self.commit();
        Ok(())
    }

    /// Toggle the start anchor: setting the current start again clears it.
    pub fn set_start(&mut self, index: usize) -> Result<(), ItineraryError> {
        self.check_index(index)?;
        self.state.start_index = toggle(self.state.start_index, index);
        debug!(start = ?self.state.start_index, "start anchor changed");
        self.commit();
        Ok(())
    }

    /// Toggle the end anchor: setting the current end again clears it.
    pub fn set_end(&mut self, index: usize) -> Result<(), ItineraryError> {
        self.check_index(index)?;
        self.state.end_index = toggle(self.state.end_index, index);
        debug!(end = ?self.state.end_index, "end anchor changed");
        self.commit();
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.dispose_all();
        self.state.start_index = None;
        self.state.end_index = None;
        debug!("cleared itinerary");
        self.commit();
    }

    /// Store an optimizer result as-is. Checking it against the itinerary
    /// that produced it is the caller's job.
    pub fn accept_optimized_route(&mut self, route: Vec<usize>) {
        debug!(stops = route.len(), "accepted optimized route");
        self.state.optimized_route = Some(route);
        self.notify();
    }

    pub fn clear_optimized_route(&mut self) {
        if self.state.optimized_route.take().is_some() {
            self.notify();
        }
    }

    /// Replace the whole itinerary in one step, as when loading a saved trip.
    ///
    /// Observers see only the final state. Entries whose name repeats an
    /// earlier one are dropped (their markers disposed) and anchors pointing
    /// at them follow to the surviving entry. Out-of-range anchors are unset.
    /// The route is kept only if it still indexes the loaded list exactly.
    pub fn restore(
        &mut self,
        locations: Vec<Location>,
        start_index: Option<usize>,
        end_index: Option<usize>,
        optimized_route: Option<Vec<usize>>,
    ) {
        self.dispose_all();

        let incoming = locations.len();
        let mut kept: Vec<Location> = Vec::with_capacity(incoming);
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut new_index = Vec::with_capacity(incoming);
        for location in locations {
            if let Some(&existing) = first_seen.get(location.name()) {
                warn!(name = location.name(), "dropped duplicate location while restoring");
                if let Some(handle) = location.marker {
                    self.markers.dispose_marker(handle);
                }
                new_index.push(existing);
                continue;
            }
            first_seen.insert(location.name().to_string(), kept.len());
            new_index.push(kept.len());
            kept.push(location);
        }
        let collapsed = kept.len() != incoming;

        let remap = |anchor: Option<usize>, label: &str| match anchor {
            Some(index) if index < new_index.len() => Some(new_index[index]),
            Some(index) => {
                warn!(index, anchor = label, "dropped out-of-range anchor while restoring");
                None
            }
            None => None,
        };
        let start_index = remap(start_index, "start");
        let end_index = remap(end_index, "end");

        let optimized_route = match optimized_route {
            Some(_) if collapsed => {
                warn!("dropped optimized route after collapsing duplicates");
                None
            }
            Some(route) if !indexes_within(&route, kept.len()) => {
                warn!(stops = route.len(), len = kept.len(), "dropped optimized route with invalid indices");
                None
            }
            route => route,
        };

        self.state.locations = kept;
        self.state.start_index = start_index;
        self.state.end_index = end_index;
        self.state.revision += 1;
        self.state.optimized_route = optimized_route;
        debug!(len = self.state.len(), "restored itinerary");
        self.notify();
    }

    fn check_index(&self, index: usize) -> Result<(), ItineraryError> {
        let len = self.state.len();
        if index < len {
            Ok(())
        } else {
            Err(ItineraryError::IndexOutOfRange { index, len })
        }
    }

    fn dispose_all(&mut self) {
        for location in self.state.locations.drain(..) {
            if let Some(handle) = location.marker {
                self.markers.dispose_marker(handle);
            }
        }
    }

    /// Finish a successful mutation: drop the route, bump the revision and
    /// tell observers.
    fn commit(&mut self) {
        self.state.optimized_route = None;
        self.state.revision += 1;
        self.notify();
    }

    fn notify(&mut self) {
        for (_, observer) in &mut self.observers {
            observer(&self.state);
        }
    }
}

fn toggle(anchor: Option<usize>, index: usize) -> Option<usize> {
    if anchor == Some(index) { None } else { Some(index) }
}

/// Anchor position after the entry at `removed` is deleted.
pub fn remap_after_remove(anchor: usize, removed: usize) -> Option<usize> {
    if anchor == removed {
        None
    } else if anchor > removed {
        Some(anchor - 1)
    } else {
        Some(anchor)
    }
}

/// Anchor position after the entry at `source` moves to `destination`.
pub fn remap_after_reorder(anchor: usize, source: usize, destination: usize) -> usize {
    if anchor == source {
        destination
    } else if source < anchor && anchor <= destination {
        anchor - 1
    } else if destination <= anchor && anchor < source {
        anchor + 1
    } else {
        anchor
    }
}

/// True when `route` is a permutation-or-path over `0..len` with no repeats.
pub(crate) fn indexes_within(route: &[usize], len: usize) -> bool {
    let mut seen = vec![false; len];
    route.iter().all(|&index| {
        if index >= len || seen[index] {
            return false;
        }
        seen[index] = true;
        true
    })
}
