//! Itinerary ordering tests
//!
//! Anchor remapping, route invalidation and marker disposal through the
//! public store API.

mod fixtures;

use proptest::prelude::*;

use fixtures::{RecordingMarkers, sight, sights};
use trip_planner::itinerary::{ItineraryError, ItineraryStore};
use trip_planner::location::{Location, Place};
use trip_planner::traits::MarkerLayer;

type Store = ItineraryStore<RecordingMarkers>;

fn store_of(names: &[&str]) -> Store {
    let mut store = ItineraryStore::new(RecordingMarkers::default());
    for name in names {
        let marker = store.markers_mut().create_marker((0.0, 0.0), name);
        store
            .add(Location::with_marker(Place::new(*name, 0.0, 0.0), marker))
            .unwrap();
    }
    store
}

fn store_of_len(len: usize) -> Store {
    let names: Vec<String> = (0..len).map(|i| format!("stop-{}", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    store_of(&refs)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn remove_middle_keeps_start_on_first() {
    let mut store = store_of(&["A", "B", "C"]);
    store.set_start(0).unwrap();
    store.accept_optimized_route(vec![0, 2, 1]);

    store.remove(1).unwrap();

    assert_eq!(store.state().names(), vec!["A", "C"]);
    assert_eq!(store.state().start_index(), Some(0));
    assert!(store.state().optimized_route().is_none());
}

#[test]
fn reorder_first_to_last_moves_end_anchor_back() {
    let mut store = store_of(&["A", "B", "C", "D"]);
    store.set_end(3).unwrap();

    store.reorder(0, 3).unwrap();

    assert_eq!(store.state().names(), vec!["B", "C", "D", "A"]);
    assert_eq!(store.state().end_index(), Some(2));
    assert_eq!(store.state().locations()[2].name(), "D");
}

#[test]
fn reorder_carries_anchor_with_item() {
    let mut store = store_of(&["A", "B", "C", "D"]);
    store.set_start(3).unwrap();
    store.set_end(1).unwrap();

    store.reorder(3, 0).unwrap();

    assert_eq!(store.state().names(), vec!["D", "A", "B", "C"]);
    assert_eq!(store.state().start_index(), Some(0));
    assert_eq!(store.state().end_index(), Some(2));
}

#[test]
fn removing_anchored_entry_unsets_anchor() {
    let mut store = store_of(&["A", "B", "C"]);
    store.set_start(1).unwrap();
    store.set_end(2).unwrap();

    store.remove(1).unwrap();

    assert_eq!(store.state().start_index(), None);
    assert_eq!(store.state().end_index(), Some(1));
}

#[test]
fn duplicate_name_rejected() {
    let mut store = store_of(&["A"]);
    store.accept_optimized_route(vec![0]);

    let err = store
        .add(Location::new(Place::new("A", 10.0, 10.0)))
        .unwrap_err();

    assert_eq!(err, ItineraryError::DuplicateLocation { name: "A".to_string() });
    assert!(err.is_recoverable());
    assert_eq!(store.len(), 1);
    assert_eq!(store.state().optimized_route(), Some(&[0][..]));
}

#[test]
fn same_name_different_coordinates_still_rejected() {
    let mut store = ItineraryStore::new(RecordingMarkers::default());
    store.add(Location::new(sight(0))).unwrap();
    let mut twin = sight(1);
    twin.name = sight(0).name;
    assert!(store.add(Location::new(twin)).is_err());
}

#[test]
fn out_of_range_indices_fail_fast() {
    let mut store = store_of(&["A", "B"]);
    let before = store.state().clone();

    let expected = ItineraryError::IndexOutOfRange { index: 2, len: 2 };
    assert_eq!(store.remove(2).unwrap_err(), expected);
    assert_eq!(store.reorder(0, 2).unwrap_err(), expected);
    assert_eq!(store.reorder(2, 0).unwrap_err(), expected);
    assert_eq!(store.set_start(2).unwrap_err(), expected);
    assert_eq!(store.set_end(2).unwrap_err(), expected);
    assert!(!expected.is_recoverable());

    assert_eq!(store.state(), &before);
}

#[test]
fn clear_all_resets_everything_and_disposes_markers() {
    let mut store = store_of(&["A", "B", "C"]);
    store.set_start(0).unwrap();
    store.set_end(2).unwrap();
    store.accept_optimized_route(vec![0, 1, 2]);

    store.clear_all();

    assert!(store.is_empty());
    assert_eq!(store.state().start_index(), None);
    assert_eq!(store.state().end_index(), None);
    assert!(store.state().optimized_route().is_none());
    assert_eq!(store.markers().live(), 0);
}

#[test]
fn remove_disposes_only_that_marker() {
    let mut store = store_of(&["A", "B", "C"]);
    let handle_b = store.state().locations()[1].marker.unwrap();

    let removed = store.remove(1).unwrap();

    assert_eq!(removed.name, "B");
    assert_eq!(store.markers().disposed, vec![handle_b]);
}

#[test]
fn every_mutation_clears_route() {
    let mut store = ItineraryStore::new(RecordingMarkers::default());
    for place in sights(4) {
        store.add(Location::new(place)).unwrap();
    }

    let mutations: [fn(&mut Store); 6] = [
        |s| s.add(Location::new(sight(5))).unwrap(),
        |s| {
            s.remove(0).unwrap();
        },
        |s| s.reorder(0, 1).unwrap(),
        |s| s.set_start(0).unwrap(),
        |s| s.set_end(1).unwrap(),
        |s| s.clear_all(),
    ];

    for mutate in mutations {
        store.accept_optimized_route(vec![0]);
        let revision = store.state().revision();
        mutate(&mut store);
        assert!(store.state().optimized_route().is_none());
        assert!(store.state().revision() > revision);
    }
}

#[test]
fn accepted_route_is_stored_as_is() {
    let mut store = store_of(&["A", "B"]);
    let revision = store.state().revision();
    store.accept_optimized_route(vec![7, 7]);
    assert_eq!(store.state().optimized_route(), Some(&[7, 7][..]));
    assert_eq!(store.state().revision(), revision);

    store.clear_optimized_route();
    assert!(store.state().optimized_route().is_none());
}

// ============================================================================
// Properties
// ============================================================================

fn expected_after_remove(anchor: usize, index: usize) -> Option<usize> {
    if anchor == index {
        None
    } else if anchor > index {
        Some(anchor - 1)
    } else {
        Some(anchor)
    }
}

proptest! {
    #[test]
    fn remove_remaps_anchors(
        (len, index, start, end) in (1usize..12).prop_flat_map(|len| (Just(len), 0..len, 0..len, 0..len))
    ) {
        let mut store = store_of_len(len);
        store.set_start(start).unwrap();
        store.set_end(end).unwrap();

        store.remove(index).unwrap();

        prop_assert_eq!(store.len(), len - 1);
        prop_assert_eq!(store.state().start_index(), expected_after_remove(start, index));
        prop_assert_eq!(store.state().end_index(), expected_after_remove(end, index));
    }

    #[test]
    fn reorder_preserves_entries_and_anchor_targets(
        (len, source, destination, anchor) in (2usize..12)
            .prop_flat_map(|len| (Just(len), 0..len, 0..len, 0..len))
            .prop_filter("distinct indices", |(_, s, d, _)| s != d)
    ) {
        let mut store = store_of_len(len);
        store.set_start(anchor).unwrap();
        let anchored = store.state().locations()[anchor].name().to_string();
        let mut before: Vec<String> = store.state().names().iter().map(|n| n.to_string()).collect();

        store.reorder(source, destination).unwrap();

        let mut after: Vec<String> = store.state().names().iter().map(|n| n.to_string()).collect();
        let start = store.state().start_index().unwrap();
        prop_assert_eq!(store.state().locations()[start].name(), anchored.as_str());

        let expected = if anchor == source {
            destination
        } else if source < anchor && anchor <= destination {
            anchor - 1
        } else if destination <= anchor && anchor < source {
            anchor + 1
        } else {
            anchor
        };
        prop_assert_eq!(start, expected);

        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn duplicate_add_never_changes_length(len in 1usize..8, pick in 0usize..8) {
        let mut store = store_of_len(len);
        let name = format!("stop-{}", pick % len);
        let result = store.add(Location::new(Place::new(name, 1.0, 1.0)));
        prop_assert!(result.is_err());
        prop_assert_eq!(store.len(), len);
    }
}
