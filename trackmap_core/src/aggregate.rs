//! The Route Aggregator - groups frame rows into per-entity routes.
//!
//! One pass over the frame, O(N) time and space. Entities keep the order in
//! which their key first appears; each entity's points keep row order.
//! Nothing is carried between frames: membership and ordering can change
//! arbitrarily from one frame to the next, so every frame is aggregated
//! from scratch.

use crate::frame::DecodedFrame;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use trackmap_env::LonLat;

/// Everything observed for one entity within a frame.
///
/// `points`, `weights` and `timestamps` are parallel: entry `i` of each
/// comes from the same row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityRoute {
    pub points: Vec<LonLat>,
    pub weights: Vec<f64>,
    pub timestamps: Vec<f64>,

    /// Label of the entity's first row; later labels are ignored
    pub label: String,
}

impl EntityRoute {
    fn first(label: String) -> Self {
        Self {
            label,
            ..Default::default()
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Per-entity routes derived from one frame.
///
/// Replaced wholesale on every new frame, never patched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedState {
    routes: IndexMap<String, EntityRoute>,
}

impl AggregatedState {
    /// State with no entities.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entity keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.routes.keys().map(String::as_str)
    }

    /// Owned copy of the keys, in first-seen order.
    pub fn key_list(&self) -> Vec<String> {
        self.routes.keys().cloned().collect()
    }

    pub fn route(&self, key: &str) -> Option<&EntityRoute> {
        self.routes.get(key)
    }

    /// Stored key and route for `key`.
    pub fn route_entry(&self, key: &str) -> Option<(&str, &EntityRoute)> {
        self.routes.get_key_value(key).map(|(k, v)| (k.as_str(), v))
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.routes.get(key).map(|r| r.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityRoute)> + '_ {
        self.routes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Total observations across all entities.
    pub fn observation_count(&self) -> usize {
        self.routes.values().map(EntityRoute::len).sum()
    }
}

/// Groups the rows of `frame` by entity key.
///
/// - Rows with the same key accumulate into one route even when they are
///   not adjacent.
/// - An entity's label comes from its first row.
/// - Repeated positions are kept; each still carries its own weight and
///   timestamp.
pub fn aggregate(frame: &DecodedFrame<'_>) -> AggregatedState {
    let mut routes: IndexMap<String, EntityRoute> = IndexMap::new();

    for row in frame.rows() {
        let route = routes
            .entry(row.key.as_text().into_owned())
            .or_insert_with(|| EntityRoute::first(row.label.as_text().into_owned()));

        route.points.push(row.position());
        route.weights.push(row.weight.as_f64());
        route.timestamps.push(row.timestamp.as_f64());
    }

    AggregatedState { routes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{decode, Observation, RawFrame, SchemaMode};
    use proptest::prelude::*;

    fn obs(key: &str, lon: f64, lat: f64, label: &str, timestamp: f64) -> Observation {
        Observation {
            key: key.to_string(),
            lat,
            lon,
            weight: 3.0,
            label: label.to_string(),
            timestamp,
        }
    }

    fn aggregate_rows(rows: &[Observation]) -> AggregatedState {
        let frame = RawFrame::from_observations(rows);
        aggregate(&decode(&frame, SchemaMode::Named).unwrap())
    }

    #[test]
    fn test_empty_frame_has_no_keys() {
        let state = aggregate_rows(&[]);
        assert!(state.is_empty());
        assert_eq!(state.keys().count(), 0);
    }

    #[test]
    fn test_non_adjacent_rows_group_together() {
        let state = aggregate_rows(&[
            obs("a", 1.0, 1.0, "x", 0.0),
            obs("b", 5.0, 5.0, "y", 0.0),
            obs("a", 2.0, 2.0, "x", 1000.0),
        ]);

        assert_eq!(state.key_list(), vec!["a".to_string(), "b".to_string()]);
        let a = state.route("a").unwrap();
        assert_eq!(a.points, vec![LonLat::new(1.0, 1.0), LonLat::new(2.0, 2.0)]);
        assert_eq!(a.timestamps, vec![0.0, 1000.0]);
        assert_eq!(state.route("b").unwrap().len(), 1);
    }

    #[test]
    fn test_first_label_wins() {
        let state = aggregate_rows(&[
            obs("a", 1.0, 1.0, "first", 0.0),
            obs("a", 2.0, 2.0, "second", 1.0),
        ]);
        assert_eq!(state.label("a"), Some("first"));
    }

    #[test]
    fn test_repeated_points_are_kept() {
        let state = aggregate_rows(&[
            obs("a", 1.0, 1.0, "x", 0.0),
            obs("a", 1.0, 1.0, "x", 5000.0),
        ]);
        let a = state.route("a").unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.weights.len(), 2);
        assert_eq!(a.timestamps, vec![0.0, 5000.0]);
    }

    #[test]
    fn test_row_order_is_kept_even_if_not_chronological() {
        let state = aggregate_rows(&[
            obs("a", 1.0, 1.0, "x", 9000.0),
            obs("a", 2.0, 2.0, "x", 1000.0),
        ]);
        assert_eq!(state.route("a").unwrap().timestamps, vec![9000.0, 1000.0]);
    }

    fn rows_strategy() -> impl Strategy<Value = Vec<Observation>> {
        prop::collection::vec(
            (0u8..5, -180.0f64..180.0, -85.0f64..85.0, 0u8..3, 0.0f64..1e12),
            0..60,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(k, lon, lat, l, ts)| obs(&format!("key-{}", k), lon, lat, &format!("label-{}", l), ts))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_grouping_preserves_counts_and_order(rows in rows_strategy()) {
            let state = aggregate_rows(&rows);

            for (key, route) in state.iter() {
                let expected: Vec<LonLat> = rows
                    .iter()
                    .filter(|r| r.key == key)
                    .map(|r| LonLat::new(r.lon, r.lat))
                    .collect();
                prop_assert_eq!(route.len(), expected.len());
                prop_assert_eq!(route.weights.len(), expected.len());
                prop_assert_eq!(route.timestamps.len(), expected.len());
                prop_assert_eq!(&route.points, &expected);
            }
            prop_assert_eq!(state.observation_count(), rows.len());
        }

        #[test]
        fn prop_label_is_first_seen(rows in rows_strategy()) {
            let state = aggregate_rows(&rows);
            for (key, route) in state.iter() {
                let first = rows.iter().find(|r| r.key == key).unwrap();
                prop_assert_eq!(&route.label, &first.label);
            }
        }

        #[test]
        fn prop_aggregation_is_idempotent(rows in rows_strategy()) {
            prop_assert_eq!(aggregate_rows(&rows), aggregate_rows(&rows));
        }
    }
}
