//! Panel configuration.
//!
//! `MapOptions` is owned by the hosting dashboard's options editor and
//! may change on any update. `PanelConfig` is fixed when the panel mounts.

use crate::error::{Result, TrackMapError};
use crate::frame::SchemaMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use trackmap_env::{LonLat, ZIndex};

// ============================================================================
// MAP OPTIONS (host-owned)
// ============================================================================

/// User-editable map options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Initial view latitude when the frame has no rows (default: 48.262725)
    pub center_lat: f64,

    /// Initial view longitude when the frame has no rows (default: 11.66725)
    pub center_lon: f64,

    /// View zoom level (default: 18)
    pub zoom_level: f64,

    /// Maximum zoom the view allows (default: 22)
    pub max_zoom: f64,

    /// XYZ overlay tile URL template; empty disables the overlay
    pub tile_url: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center_lat: 48.262725,
            center_lon: 11.66725,
            zoom_level: 18.0,
            max_zoom: 22.0,
            tile_url: String::new(),
        }
    }
}

impl MapOptions {
    /// Parses options from a JSON object. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| TrackMapError::options(e.to_string()))?;
        // serde would otherwise fill the fields of an array by position
        if !value.is_object() {
            return Err(TrackMapError::options("options must be a JSON object"));
        }
        let options: Self = serde_json::from_value(value).map_err(|e| TrackMapError::options(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks the options are usable for a map view.
    pub fn validate(&self) -> Result<()> {
        if !self.center_lat.is_finite() || !self.center_lon.is_finite() {
            return Err(TrackMapError::options("center must be finite"));
        }
        if !(-90.0..=90.0).contains(&self.center_lat) {
            return Err(TrackMapError::options(format!(
                "center_lat {} outside [-90, 90]",
                self.center_lat
            )));
        }
        if !(self.zoom_level >= 0.0 && self.max_zoom >= 0.0) {
            return Err(TrackMapError::options("zoom levels must be non-negative"));
        }
        if self.zoom_level > self.max_zoom {
            return Err(TrackMapError::options(format!(
                "zoom_level {} exceeds max_zoom {}",
                self.zoom_level, self.max_zoom
            )));
        }
        Ok(())
    }

    /// Configured center as a position.
    pub fn center(&self) -> LonLat {
        LonLat::new(self.center_lon, self.center_lat)
    }

    /// Returns true when an overlay tile layer is configured.
    pub fn has_overlay(&self) -> bool {
        !self.tile_url.is_empty()
    }
}

// ============================================================================
// PANEL CONFIG (fixed at mount)
// ============================================================================

/// Fixed settings of a route panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    /// Base map tiles, added once at mount
    pub base_tile_url: String,

    /// Duration of the recenter animation on first data (default: 2000 ms)
    pub recenter_duration_ms: u64,

    /// Stacking order of the overlay tile layer (default: 1)
    pub overlay_z_index: ZIndex,

    /// Stacking order of the route layer (default: 2)
    pub route_z_index: ZIndex,

    /// How frame fields are matched to columns
    pub schema_mode: SchemaMode,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_tile_url: "https://{1-4}.basemaps.cartocdn.com/rastertiles/voyager/{z}/{x}/{y}{r}.png"
                .to_string(),
            recenter_duration_ms: 2000,
            overlay_z_index: 1,
            route_z_index: 2,
            schema_mode: SchemaMode::Positional,
        }
    }
}
