//! Common types for the TrackMap environment abstraction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a mounted route panel.
///
/// Each panel instance owns one; the host uses it to find the element the
/// map is drawn into. Uses UUID v4 so instances never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelId(pub Uuid);

impl PanelId {
    /// Creates a new random PanelId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
    
    /// Creates a deterministic PanelId from a seed (for simulation).
    pub fn from_seed(seed: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&seed.to_le_bytes());
        bytes[8..16].copy_from_slice(&seed.wrapping_mul(0x517cc1b727220a95).to_le_bytes());
        Self(Uuid::from_bytes(bytes))
    }
    
    /// Returns the element id the host should render the map into.
    pub fn target(&self) -> String {
        format!("id{}", self.0.simple())
    }
}

impl Default for PanelId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PanelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show first 8 chars for readability
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Revision token attached to every frame the data feed delivers.
///
/// Two deliveries with the same revision carry the same content; the
/// feed bumps the revision whenever it replaces the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FrameRevision(pub u64);

impl FrameRevision {
    /// Returns the revision following this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for FrameRevision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Geographic position in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// The entity currently chosen in the panel's selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Nothing selected; no route layer is shown
    #[default]
    None,
    
    /// A single entity key
    Key(String),
}

impl Selection {
    /// Value the selector uses for the "nothing selected" entry.
    pub const NONE_VALUE: &'static str = "None";
    
    /// Parses a raw selector value. `"None"`/`"none"` map to `Selection::None`.
    pub fn from_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case(Self::NONE_VALUE) {
            Selection::None
        } else {
            Selection::Key(value.to_string())
        }
    }
    
    /// Returns the selector value for this selection.
    pub fn value(&self) -> &str {
        match self {
            Selection::None => Self::NONE_VALUE,
            Selection::Key(key) => key,
        }
    }
    
    /// Returns the selected key, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Selection::None => None,
            Selection::Key(key) => Some(key),
        }
    }
    
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_panel_id_display_is_short() {
        let id = PanelId::from_seed(7);
        assert_eq!(id.to_string().len(), 8);
        assert!(id.target().starts_with("id"));
    }
    
    #[test]
    fn test_panel_id_from_seed_is_deterministic() {
        assert_eq!(PanelId::from_seed(42), PanelId::from_seed(42));
        assert_ne!(PanelId::from_seed(42), PanelId::from_seed(43));
    }
    
    #[test]
    fn test_selection_from_value() {
        assert_eq!(Selection::from_value("None"), Selection::None);
        assert_eq!(Selection::from_value("none"), Selection::None);
        assert_eq!(Selection::from_value("abc"), Selection::Key("abc".to_string()));
        assert_eq!(Selection::Key("abc".to_string()).value(), "abc");
        assert_eq!(Selection::None.key(), None);
    }
}
