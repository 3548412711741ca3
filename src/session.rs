//! Trip session: an itinerary plus the optimizer that orders it.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::haversine::path_length_km;
use crate::itinerary::{ItineraryError, ItineraryStore, indexes_within};
use crate::location::{Location, Place};
use crate::optimizer::{OptimizeError, OptimizeRequest, OptimizeStop};
use crate::polyline::Polyline;
use crate::record::TripRecord;
use crate::traits::{MarkerLayer, RouteOptimizer, TripNamer};

const MAPS_DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/";

/// Placeholder the naming backend answers with when it has nothing better.
pub const DEFAULT_TRIP_NAME: &str = "My Trip";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No locations to submit")]
    EmptyItinerary,

    #[error("No optimized route available")]
    NoRouteAvailable,

    #[error("Optimized route points at stop {index} of {len}")]
    InvalidRoute { index: usize, len: usize },

    #[error("A route request is already in flight")]
    SubmitInProgress,

    #[error("Route request {id} is not the one in flight")]
    UnknownRequest { id: u64 },

    #[error("Itinerary changed while optimizing (revision {requested} -> {current})")]
    StaleResponse { requested: u64, current: u64 },

    #[error(transparent)]
    Optimizer(#[from] OptimizeError),

    #[error(transparent)]
    Itinerary(#[from] ItineraryError),

    #[error("Invalid trip record: {0}")]
    Record(#[from] serde_json::Error),
}

/// An in-flight optimization, tagged with the itinerary revision it was
/// built from.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    id: u64,
    revision: u64,
    body: OptimizeRequest,
}

impl RouteRequest {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn body(&self) -> &OptimizeRequest {
        &self.body
    }
}

#[derive(Debug)]
pub struct TripSession<O: RouteOptimizer, M: MarkerLayer> {
    store: ItineraryStore<M>,
    optimizer: O,
    next_request: u64,
    in_flight: Option<u64>,
}

impl<O: RouteOptimizer, M: MarkerLayer> TripSession<O, M> {
    pub fn new(optimizer: O, markers: M) -> Self {
        Self {
            store: ItineraryStore::new(markers),
            optimizer,
            next_request: 0,
            in_flight: None,
        }
    }

    pub fn store(&self) -> &ItineraryStore<M> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ItineraryStore<M> {
        &mut self.store
    }

    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    /// Add a searched place, creating its marker only once the name is known
    /// to be new.
    pub fn add_place(&mut self, place: Place) -> Result<(), SessionError> {
        if self.store.state().contains(&place.name) {
            warn!(name = %place.name, "rejected duplicate place");
            return Err(ItineraryError::DuplicateLocation { name: place.name }.into());
        }
        let marker = self.store.markers_mut().create_marker(place.coords(), &place.name);
        self.store.add(Location::with_marker(place, marker))?;
        Ok(())
    }

    /// True between `begin_submit` and the matching `complete_submit`.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Build the optimizer request for the current itinerary and mark it in
    /// flight. Only one request may be in flight at a time.
    pub fn begin_submit(&mut self) -> Result<RouteRequest, SessionError> {
        if self.in_flight.is_some() {
            return Err(SessionError::SubmitInProgress);
        }
        let state = self.store.state();
        if state.is_empty() {
            return Err(SessionError::EmptyItinerary);
        }

        let locations = state
            .locations()
            .iter()
            .map(|location| OptimizeStop {
                name: location.place.name.clone(),
                lat: location.place.lat,
                lng: location.place.lng,
            })
            .collect();

        let revision = state.revision();
        self.next_request += 1;
        self.in_flight = Some(self.next_request);
        Ok(RouteRequest {
            id: self.next_request,
            revision,
            body: OptimizeRequest {
                locations,
                start_index: state.start_index(),
                end_index: state.end_index(),
            },
        })
    }

    /// Apply the optimizer's answer to `request`.
    ///
    /// Failures and answers for an itinerary that has since changed leave
    /// the itinerary untouched. Any answer to the in-flight request ends it.
    pub fn complete_submit(
        &mut self,
        request: &RouteRequest,
        result: Result<Vec<usize>, OptimizeError>,
    ) -> Result<(), SessionError> {
        if self.in_flight != Some(request.id) {
            warn!(id = request.id, "ignoring answer to a request not in flight");
            return Err(SessionError::UnknownRequest { id: request.id });
        }
        self.in_flight = None;

        let route = result.inspect_err(|err| warn!(%err, "route optimization failed"))?;
        if route.is_empty() {
            return Err(OptimizeError::EmptyResponse.into());
        }

        let current = self.store.state().revision();
        if request.revision != current || !indexes_within(&route, self.store.len()) {
            warn!(requested = request.revision, current, "discarding stale optimized route");
            return Err(SessionError::StaleResponse {
                requested: request.revision,
                current,
            });
        }

        info!(stops = route.len(), "route optimized");
        self.store.accept_optimized_route(route);
        if let Some((south_west, north_east)) =
            self.route_polyline().and_then(|polyline| polyline.bounds())
        {
            self.store.markers_mut().fit_bounds(&[south_west, north_east]);
        }
        Ok(())
    }

    /// Send the itinerary to the optimizer and wait for the result.
    pub fn submit(&mut self) -> Result<(), SessionError> {
        let request = self.begin_submit()?;
        let result = self.optimizer.optimize(request.body());
        self.complete_submit(&request, result)
    }

    /// Stops of the optimized route in visiting order. A route naming a
    /// stop the itinerary does not have is an error, never skipped.
    fn route_locations(&self) -> Result<Vec<&Location>, SessionError> {
        let state = self.store.state();
        let route = state
            .optimized_route()
            .filter(|route| !route.is_empty())
            .ok_or(SessionError::NoRouteAvailable)?;

        route
            .iter()
            .map(|&index| {
                state.locations().get(index).ok_or(SessionError::InvalidRoute {
                    index,
                    len: state.len(),
                })
            })
            .collect()
    }

    /// Coordinates of the optimized route in visiting order.
    pub fn export_route(&self) -> Result<Vec<(f64, f64)>, SessionError> {
        Ok(self
            .route_locations()?
            .into_iter()
            .map(Location::coords)
            .collect())
    }

    /// Directions link with one waypoint per stop.
    pub fn export_maps_url(&self) -> Result<String, SessionError> {
        let waypoints = self
            .export_route()?
            .iter()
            .map(|(lat, lng)| format!("{},{}", lat, lng))
            .collect::<Vec<_>>()
            .join("/");
        Ok(format!("{}{}", MAPS_DIRECTIONS_URL, waypoints))
    }

    /// Route geometry to draw. Loops back to the first stop unless an end
    /// anchor fixes where the trip finishes.
    pub fn route_polyline(&self) -> Option<Polyline> {
        let polyline = Polyline::new(self.export_route().ok()?);
        if self.store.state().end_index().is_some() {
            Some(polyline)
        } else {
            Some(polyline.closed())
        }
    }

    /// Straight-line length of the drawn route.
    pub fn route_distance_km(&self) -> Option<f64> {
        self.route_polyline()
            .map(|polyline| path_length_km(polyline.points()))
    }

    /// Numbered stop names in route order, starting at 1.
    pub fn route_stops(&self) -> Result<Vec<(usize, &str)>, SessionError> {
        Ok(self
            .route_locations()?
            .into_iter()
            .enumerate()
            .map(|(position, location)| (position + 1, location.name()))
            .collect())
    }

    pub fn snapshot(&self) -> TripRecord {
        TripRecord::from_state(self.store.state())
    }

    /// Snapshot named by `namer`. The placeholder name and naming failures
    /// leave the record unnamed.
    pub fn named_snapshot<N: TripNamer + ?Sized>(&self, namer: &N) -> TripRecord {
        let record = self.snapshot();
        if record.locations.is_empty() {
            return record;
        }
        match namer.name_trip(&record.locations) {
            Ok(name) if !name.trim().is_empty() && name != DEFAULT_TRIP_NAME => {
                debug!(%name, "trip named");
                record.with_name(name)
            }
            Ok(name) => {
                debug!(%name, "ignoring placeholder trip name");
                record
            }
            Err(err) => {
                warn!(%err, "trip naming failed");
                record
            }
        }
    }

    /// Replace the current trip with a saved one in a single step.
    pub fn load_trip(&mut self, record: TripRecord) {
        let markers = self.store.markers_mut();
        let locations = record
            .locations
            .into_iter()
            .map(|place| {
                let marker = markers.create_marker(place.coords(), &place.name);
                Location::with_marker(place, marker)
            })
            .collect();

        self.store.restore(
            locations,
            record.start_index,
            record.end_index,
            record.optimized_route,
        );
        info!(len = self.store.len(), "trip loaded");
    }

    pub fn load_trip_json(&mut self, json: &str) -> Result<(), SessionError> {
        let record = TripRecord::from_json(json)?;
        self.load_trip(record);
        Ok(())
    }
}
