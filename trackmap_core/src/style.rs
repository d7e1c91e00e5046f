//! Feature styling for the route layer.
//!
//! Style selection is a pure function of the feature kind and whether the
//! pointer is over it. Color scheme:
//! - Segments: blue 2px stroke, direction arrow at the end point
//! - Hovered segment: 4px high-contrast stroke + duration text
//! - Markers: green start, yellow end, blue waypoints, radius = weight
//! - Hovered marker: white outline

use trackmap_env::{FeatureId, MarkerRole, RouteFeature};

/// Arrow icon drawn at the end of every segment. Points up when unrotated.
pub const ARROW_ICON: &str = "img/arrow.png";

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// CSS hex notation, alpha omitted when opaque.
    pub fn hex(&self) -> String {
        let [r, g, b, a] = self.0;
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

pub const ROUTE_BLUE: Rgba = Rgba::rgb(0x00, 0x80, 0xff);
pub const START_GREEN: Rgba = Rgba::rgb(0x26, 0xde, 0x00);
pub const END_YELLOW: Rgba = Rgba::rgb(0xfe, 0xda, 0x21);
pub const HIGHLIGHT_RED: Rgba = Rgba::rgb(0xff, 0x3b, 0x30);
pub const WHITE: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
pub const INK: Rgba = Rgba::rgb(0x1e, 0x1e, 0x1e);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleStyle {
    pub radius: f64,
    pub fill: Rgba,
    pub outline: Option<Stroke>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconStyle {
    pub src: &'static str,
    /// Clockwise rotation in radians
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub content: String,
    pub fill: Rgba,
    pub halo: Stroke,
}

/// Everything the surface needs to draw one feature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureStyle {
    pub stroke: Option<Stroke>,
    pub circle: Option<CircleStyle>,
    pub icon: Option<IconStyle>,
    pub text: Option<TextStyle>,
}

fn role_color(role: MarkerRole) -> Rgba {
    match role {
        MarkerRole::Start => START_GREEN,
        MarkerRole::End => END_YELLOW,
        MarkerRole::Waypoint => ROUTE_BLUE,
    }
}

/// Style of a feature the pointer is not over.
pub fn base_style(feature: RouteFeature<'_>) -> FeatureStyle {
    match feature {
        RouteFeature::Segment(segment) => FeatureStyle {
            stroke: Some(Stroke { color: ROUTE_BLUE, width: 2.0 }),
            icon: Some(IconStyle {
                src: ARROW_ICON,
                rotation: segment.arrow.rotation,
            }),
            ..Default::default()
        },
        RouteFeature::Marker(marker) => FeatureStyle {
            circle: Some(CircleStyle {
                radius: marker.radius,
                fill: role_color(marker.role),
                outline: None,
            }),
            ..Default::default()
        },
    }
}

/// Style of the feature under the pointer.
pub fn hover_style(feature: RouteFeature<'_>) -> FeatureStyle {
    let mut style = base_style(feature);
    match feature {
        RouteFeature::Segment(segment) => {
            style.stroke = Some(Stroke { color: HIGHLIGHT_RED, width: 4.0 });
            style.text = Some(TextStyle {
                content: segment.duration_label.clone(),
                fill: INK,
                halo: Stroke { color: WHITE, width: 3.0 },
            });
        }
        RouteFeature::Marker(_) => {
            if let Some(circle) = style.circle.as_mut() {
                circle.outline = Some(Stroke { color: WHITE, width: 2.0 });
            }
        }
    }
    style
}

/// Tracks which route feature, if any, the pointer is over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverState {
    hovered: Option<FeatureId>,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<FeatureId> {
        self.hovered
    }

    /// Records the feature under the pointer.
    ///
    /// Returns `true` if the hovered feature changed and the layer needs a
    /// restyle.
    pub fn set(&mut self, feature: Option<FeatureId>) -> bool {
        let changed = self.hovered != feature;
        self.hovered = feature;
        changed
    }

    /// Forgets the hovered feature (route layer removed or pointer left).
    pub fn clear(&mut self) -> bool {
        self.set(None)
    }

    /// Style for `feature` given the current hover.
    pub fn style(&self, feature: RouteFeature<'_>) -> FeatureStyle {
        if self.hovered == Some(feature.id()) {
            hover_style(feature)
        } else {
            base_style(feature)
        }
    }
}
