//! The Route Geometry Builder - turns one entity's route into map features.
//!
//! For a route of `M` observations this produces:
//! - `max(M - 1, 0)` directed segments, each with a bearing, a duration
//!   label and an arrow at its end point
//! - exactly `M` point markers, sized by the observation weight
//!
//! Bearings are measured in the projected (Web Mercator) plane, not as
//! great-circle bearings. At street-level zoom the two agree closely enough
//! for arrow orientation.

use crate::aggregate::EntityRoute;
use crate::projection::from_lon_lat;
use geo::{Coord, Line};
use trackmap_env::{DirectionArrow, LonLat, MarkerRole, PointMarker, RouteGeometry, RouteSegment};

/// Builds the features for a route given in degrees.
pub fn build(points: &[LonLat], weights: &[f64], timestamps: &[f64]) -> RouteGeometry {
    let projected: Vec<Coord<f64>> = points.iter().copied().map(from_lon_lat).collect();
    build_projected(&projected, weights, timestamps)
}

/// Builds the features for an aggregated entity route.
pub fn build_route(route: &EntityRoute) -> RouteGeometry {
    build(&route.points, &route.weights, &route.timestamps)
}

/// Builds the features for a route already in projected coordinates.
///
/// The three slices are expected to be the same length. If they are not,
/// the extra tail of the longer ones is ignored.
pub fn build_projected(points: &[Coord<f64>], weights: &[f64], timestamps: &[f64]) -> RouteGeometry {
    let m = points.len().min(weights.len()).min(timestamps.len());
    if m != points.len() || m != weights.len() || m != timestamps.len() {
        tracing::warn!(
            points = points.len(),
            weights = weights.len(),
            timestamps = timestamps.len(),
            "route sequences differ in length, truncating to {}",
            m
        );
    }

    let segments = (1..m)
        .map(|i| segment(i - 1, points[i - 1], points[i], timestamps[i - 1], timestamps[i]))
        .collect();

    let markers = (0..m)
        .map(|i| PointMarker {
            index: i,
            position: points[i],
            radius: weights[i],
            role: marker_role(i, m),
        })
        .collect();

    RouteGeometry { segments, markers }
}

fn segment(index: usize, from: Coord<f64>, to: Coord<f64>, start_ms: f64, end_ms: f64) -> RouteSegment {
    let bearing = bearing(from, to);
    let duration_secs = duration_secs(start_ms, end_ms);

    RouteSegment {
        index,
        line: Line::new(from, to),
        bearing,
        duration_secs,
        duration_label: format_duration(duration_secs),
        arrow: DirectionArrow {
            position: to,
            // Icon rotation is clockwise, bearing is counter-clockwise
            rotation: -bearing,
        },
    }
}

/// Direction of travel from `from` to `to`, `atan2(dy, dx)` in radians.
pub fn bearing(from: Coord<f64>, to: Coord<f64>) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Elapsed seconds between two epoch-millisecond timestamps.
///
/// Negative when the timestamps go backwards; that is reported, not fixed.
pub fn duration_secs(start_ms: f64, end_ms: f64) -> f64 {
    (end_ms - start_ms) / 1000.0
}

/// Formats a duration as `"<seconds>s"`, e.g. `"3s"`, `"-3.2s"`.
///
/// The number is written the way the dashboard's labels always showed it:
/// shortest round-trip digits, `NaN`/`Infinity` spelled out, no negative
/// zero, and exponent form (`1e+21`, `1.5e-7`) outside `[1e-6, 1e21)`.
pub fn format_duration(secs: f64) -> String {
    format!("{}s", number_text(secs))
}

fn number_text(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }

    let exp = format!("{:e}", value);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

fn marker_role(index: usize, count: usize) -> MarkerRole {
    if index == 0 {
        MarkerRole::Start
    } else if index + 1 == count {
        MarkerRole::End
    } else {
        MarkerRole::Waypoint
    }
}
