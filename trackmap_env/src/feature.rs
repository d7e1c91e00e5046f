//! Route features handed to the rendering surface.
//!
//! All coordinates are in the projected (Web Mercator) plane the map
//! renders in, not in degrees.

use geo::{Coord, Line};
use serde::{Deserialize, Serialize};

/// Where a point marker sits along its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerRole {
    Start,
    Waypoint,
    End,
}

/// One observation of the route, drawn as a circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointMarker {
    /// Position of the observation within its route
    pub index: usize,
    
    /// Projected position
    pub position: Coord<f64>,
    
    /// Circle radius in pixels (the observation weight, unscaled)
    pub radius: f64,
    
    pub role: MarkerRole,
}

/// Arrow icon placed at the end of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionArrow {
    /// Projected position (the segment's end point)
    pub position: Coord<f64>,
    
    /// Icon rotation in radians, the negated segment bearing
    pub rotation: f64,
}

/// Directed sub-path between two consecutive observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    /// Index of the segment's start observation
    pub index: usize,
    
    /// Straight line from observation `index` to `index + 1`
    pub line: Line<f64>,
    
    /// Direction of travel in the projected plane, `atan2(dy, dx)`
    pub bearing: f64,
    
    /// Elapsed time between the two observations, in seconds
    pub duration_secs: f64,
    
    /// Duration text shown when the segment is hovered, e.g. `"3s"`
    pub duration_label: String,
    
    pub arrow: DirectionArrow,
}

/// The complete set of features making up one selected route.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub segments: Vec<RouteSegment>,
    pub markers: Vec<PointMarker>,
}

impl RouteGeometry {
    /// Creates an empty geometry (a route with no observations).
    pub fn empty() -> Self {
        Self::default()
    }
    
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.markers.is_empty()
    }
    
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
    
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
    
    /// Iterates over every feature, segments first.
    pub fn features(&self) -> impl Iterator<Item = RouteFeature<'_>> {
        self.segments
            .iter()
            .map(RouteFeature::Segment)
            .chain(self.markers.iter().map(RouteFeature::Marker))
    }
    
    /// Looks up a feature by id.
    pub fn feature(&self, id: FeatureId) -> Option<RouteFeature<'_>> {
        match id {
            FeatureId::Segment(i) => self.segments.get(i).map(RouteFeature::Segment),
            FeatureId::Marker(i) => self.markers.get(i).map(RouteFeature::Marker),
        }
    }
}

/// Identifies a feature within a `RouteGeometry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureId {
    Segment(usize),
    Marker(usize),
}

/// Borrowed view of a single feature, keyed by geometry type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteFeature<'a> {
    Segment(&'a RouteSegment),
    Marker(&'a PointMarker),
}

impl<'a> RouteFeature<'a> {
    pub fn id(&self) -> FeatureId {
        match self {
            RouteFeature::Segment(s) => FeatureId::Segment(s.index),
            RouteFeature::Marker(m) => FeatureId::Marker(m.index),
        }
    }
    
    /// Metadata the surface shows on hover. Only segments carry one.
    pub fn duration_label(&self) -> Option<&'a str> {
        match *self {
            RouteFeature::Segment(s) => Some(s.duration_label.as_str()),
            RouteFeature::Marker(_) => None,
        }
    }
}
