//! trip-planner core
//!
//! Client-side state for building a trip: the ordered itinerary with its
//! start/end anchors, the session glue around an external route optimizer,
//! and the drag controller behind the bottom-sheet panels.

pub mod traits;
pub mod location;
pub mod itinerary;
pub mod optimizer;
pub mod session;
pub mod record;
pub mod panel;
pub mod nav;
pub mod haversine;
pub mod polyline;
