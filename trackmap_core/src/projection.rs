//! Spherical Web Mercator (EPSG:3857), the plane the map renders in.

use geo::Coord;
use trackmap_env::LonLat;

/// WGS84 semi-major axis, meters
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Half the projected world width, meters
pub const HALF_WORLD_M: f64 = std::f64::consts::PI * EARTH_RADIUS_M;

/// Projects a geographic position into Web Mercator meters.
///
/// Latitudes beyond the Mercator limit (about ±85.05°) clamp to the edge
/// of the projected world. `NaN` inputs stay `NaN`.
pub fn from_lon_lat(position: LonLat) -> Coord<f64> {
    let x = EARTH_RADIUS_M * position.lon.to_radians();
    let y = EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + position.lat.to_radians() / 2.0).tan().ln();
    Coord {
        x,
        y: y.clamp(-HALF_WORLD_M, HALF_WORLD_M),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    
    #[test]
    fn test_origin_projects_to_origin() {
        let c = from_lon_lat(LonLat::new(0.0, 0.0));
        assert_relative_eq!(c.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 0.0, epsilon = 1e-6);
    }
    
    #[test]
    fn test_antimeridian_is_world_edge() {
        let c = from_lon_lat(LonLat::new(180.0, 0.0));
        assert_relative_eq!(c.x, HALF_WORLD_M, epsilon = 1e-6);
    }
    
    #[test]
    fn test_known_point() {
        let c = from_lon_lat(LonLat::new(11.66725, 48.262725));
        assert_relative_eq!(c.x, 1_298_792.329, epsilon = 0.01);
        assert_relative_eq!(c.y, 6_150_674.741, epsilon = 0.01);
    }
    
    #[test]
    fn test_pole_clamps() {
        let c = from_lon_lat(LonLat::new(0.0, 90.0));
        assert_relative_eq!(c.y, HALF_WORLD_M, epsilon = 1e-6);
    }
    
    #[test]
    fn test_nan_passes_through() {
        assert!(from_lon_lat(LonLat::new(f64::NAN, 0.0)).x.is_nan());
    }
}
