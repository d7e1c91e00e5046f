//! Simulated vehicle fleet - the data feed behind a route panel.
//!
//! The Fleet stands in for the dashboard query:
//! - Vehicles move at constant velocity around an origin
//! - Every tick records one noisy GPS fix per vehicle
//! - A frame is the sliding window of the last few ticks, rows interleaved
//!   across vehicles the way a time-ordered query returns them

use nalgebra::Vector2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::collections::VecDeque;
use trackmap_core::{Observation, RawFrame};
use trackmap_env::LonLat;
use uuid::Builder;

/// Meters per degree of latitude (spherical approximation).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Timestamp of tick zero, epoch milliseconds.
const START_MS: f64 = 1_700_000_000_000.0;

/// Vendor labels assigned round-robin.
pub const VENDORS: [&str; 4] = ["voi", "tier", "lime", "bird"];

/// A simulated vehicle.
#[derive(Debug, Clone)]
pub struct Vehicle {
    /// Entity key (UUID string)
    pub key: String,

    /// Vendor label shown in the selector
    pub vendor: String,

    /// True position
    pub position: LonLat,

    /// Velocity [east, north] in m/s
    pub velocity: Vector2<f64>,

    /// Marker radius reported with every fix
    pub radius: f64,
}

impl Vehicle {
    fn advance(&mut self, dt: f64) {
        self.position = offset(self.position, self.velocity * dt);
    }
}

/// Moves `position` by a displacement in meters.
fn offset(position: LonLat, meters: Vector2<f64>) -> LonLat {
    let lat = position.lat + meters.y / METERS_PER_DEGREE;
    let lon = position.lon + meters.x / (METERS_PER_DEGREE * position.lat.to_radians().cos());
    LonLat::new(lon, lat)
}

/// Deterministic fleet generating observation frames.
pub struct Fleet {
    /// RNG for spawn, noise and shuffles
    rng: ChaCha8Rng,

    vehicles: Vec<Vehicle>,

    /// Timestamp of the latest tick (epoch ms)
    time_ms: f64,

    /// Tick length in milliseconds (default: 1000)
    tick_ms: f64,

    /// Ticks kept in a frame (default: 5)
    window: usize,

    /// Fixes of the last `window` ticks, oldest first
    trail: VecDeque<Vec<Observation>>,

    /// GPS noise, `None` for exact fixes
    noise: Option<Normal<f64>>,
}

impl Fleet {
    /// Spawns `count` vehicles within a few hundred meters of `origin`.
    pub fn new(seed: u64, count: usize, origin: LonLat) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let vehicles = (0..count)
            .map(|i| {
                let key = Builder::from_random_bytes(rng.gen()).into_uuid().to_string();
                let heading: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
                let speed: f64 = rng.gen_range(2.0..8.0);
                Vehicle {
                    key,
                    vendor: VENDORS[i % VENDORS.len()].to_string(),
                    position: LonLat::new(
                        origin.lon + rng.gen_range(-0.002..0.002),
                        origin.lat + rng.gen_range(-0.002..0.002),
                    ),
                    velocity: Vector2::new(speed * heading.cos(), speed * heading.sin()),
                    radius: rng.gen_range(3.0..6.0),
                }
            })
            .collect();

        Self {
            rng,
            vehicles,
            time_ms: START_MS,
            tick_ms: 1000.0,
            window: 5,
            trail: VecDeque::new(),
            noise: Normal::new(0.0, 1.5).ok(), // 1.5 m GPS noise
        }
    }

    /// Sets how many ticks a frame spans.
    pub fn with_window(mut self, ticks: usize) -> Self {
        self.window = ticks.max(1);
        self
    }

    /// Sets the GPS noise standard deviation in meters (0 = exact).
    pub fn set_jitter(&mut self, std_dev_m: f64) {
        self.noise = if std_dev_m > 0.0 {
            Normal::new(0.0, std_dev_m).ok()
        } else {
            None
        };
    }

    /// Vehicle keys in spawn order.
    pub fn keys(&self) -> Vec<String> {
        self.vehicles.iter().map(|v| v.key.clone()).collect()
    }

    /// Advances every vehicle one tick and records a fix for each.
    pub fn tick(&mut self) {
        self.time_ms += self.tick_ms;
        let dt = self.tick_ms / 1000.0;

        let mut fixes = Vec::with_capacity(self.vehicles.len());
        for vehicle in &mut self.vehicles {
            vehicle.advance(dt);

            let error = match &self.noise {
                Some(noise) => Vector2::new(noise.sample(&mut self.rng), noise.sample(&mut self.rng)),
                None => Vector2::zeros(),
            };
            let fix = offset(vehicle.position, error);

            fixes.push(Observation {
                key: vehicle.key.clone(),
                lat: fix.lat,
                lon: fix.lon,
                weight: vehicle.radius,
                label: vehicle.vendor.clone(),
                timestamp: self.time_ms,
            });
        }

        self.trail.push_back(fixes);
        while self.trail.len() > self.window {
            self.trail.pop_front();
        }
    }

    /// Fixes of the current window, tick by tick.
    pub fn observations(&self) -> Vec<Observation> {
        self.trail.iter().flatten().cloned().collect()
    }

    /// The current window as a frame.
    pub fn frame(&self) -> RawFrame {
        RawFrame::from_observations(&self.observations())
    }

    /// Fixes of the current window in random order.
    ///
    /// Routes built from them jump around and carry negative durations.
    pub fn shuffled_observations(&mut self) -> Vec<Observation> {
        let mut rows = self.observations();
        rows.shuffle(&mut self.rng);
        rows
    }

    /// The current window with only the first `fields` columns.
    pub fn truncated_frame(&self, fields: usize) -> RawFrame {
        let mut frame = self.frame();
        frame.fields.truncate(fields);
        frame
    }

    /// Picks a random vehicle key.
    pub fn random_key(&mut self) -> Option<String> {
        self.vehicles.choose(&mut self.rng).map(|v| v.key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn origin() -> LonLat {
        LonLat::new(11.66725, 48.262725)
    }

    #[test]
    fn test_fleet_is_deterministic() {
        let mut a = Fleet::new(42, 4, origin());
        let mut b = Fleet::new(42, 4, origin());
        for _ in 0..3 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.keys(), b.keys());
        assert_eq!(a.frame(), b.frame());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = Fleet::new(1, 4, origin());
        let b = Fleet::new(2, 4, origin());
        assert_ne!(a.keys(), b.keys());
    }

    #[test]
    fn test_keys_are_unique_uuids() {
        let fleet = Fleet::new(7, 20, origin());
        let keys: HashSet<String> = fleet.keys().into_iter().collect();
        assert_eq!(keys.len(), 20);
        assert!(keys.iter().all(|k| k.len() == 36));
    }

    #[test]
    fn test_window_limits_rows() {
        let mut fleet = Fleet::new(3, 4, origin()).with_window(2);
        assert!(fleet.frame().is_empty());

        fleet.tick();
        assert_eq!(fleet.frame().len(), 4);
        for _ in 0..5 {
            fleet.tick();
        }
        assert_eq!(fleet.frame().len(), 8);
    }

    #[test]
    fn test_rows_interleave_vehicles() {
        let mut fleet = Fleet::new(9, 3, origin());
        fleet.tick();
        fleet.tick();

        let rows = fleet.observations();
        let first_tick: Vec<&str> = rows[..3].iter().map(|r| r.key.as_str()).collect();
        let keys = fleet.keys();
        assert_eq!(first_tick, keys.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(rows[3].timestamp > rows[0].timestamp);
    }

    #[test]
    fn test_vehicles_move() {
        let mut fleet = Fleet::new(5, 1, origin());
        fleet.set_jitter(0.0);
        let start = fleet.vehicles[0].position;
        fleet.tick();
        let rows = fleet.observations();
        assert_ne!(LonLat::new(rows[0].lon, rows[0].lat), start);
        assert_eq!(LonLat::new(rows[0].lon, rows[0].lat), fleet.vehicles[0].position);
    }

    #[test]
    fn test_shuffle_keeps_rows() {
        let mut fleet = Fleet::new(11, 3, origin());
        for _ in 0..4 {
            fleet.tick();
        }
        let mut shuffled = fleet.shuffled_observations();
        let mut ordered = fleet.observations();
        assert_eq!(shuffled.len(), ordered.len());

        let by_time = |a: &Observation, b: &Observation| {
            a.timestamp.total_cmp(&b.timestamp).then_with(|| a.key.cmp(&b.key))
        };
        shuffled.sort_by(by_time);
        ordered.sort_by(by_time);
        assert_eq!(shuffled, ordered);
    }

    #[test]
    fn test_truncated_frame() {
        let mut fleet = Fleet::new(5, 2, origin());
        fleet.tick();
        assert_eq!(fleet.truncated_frame(4).fields.len(), 4);
    }
}
