//! Marker styling and placement types.

use munifor_issue_models::DataType;
use serde::{Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::LatLng;

/// A hex color swatch such as `#e74c3c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub &'static str);

impl Color {
    /// Returns the hex string.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

/// Icon drawn inside a map pin.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Glyph {
    /// Pothole reports.
    Road,
    /// Streetlight reports.
    Lightbulb,
    /// Trash reports.
    Trash,
    /// Other reports.
    CircleInfo,
    /// Repair tasks.
    Wrench,
    /// Maintenance tasks.
    Gear,
    /// Collection tasks.
    Truck,
    /// Supervision tasks.
    ClipboardCheck,
    /// Every progress update.
    PersonDigging,
    /// Unclassifiable entries.
    Question,
}

/// Resolved visual style for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDescriptor {
    /// Pin body color.
    pub fill: Color,
    /// Pin outline color.
    pub border: Color,
    /// Icon inside the pin.
    pub glyph: Glyph,
}

/// Pin footprint and anchor points, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IconGeometry {
    /// Width and height.
    pub size: [u32; 2],
    /// Point of the icon placed on the coordinate, from the top-left.
    pub anchor: [i32; 2],
    /// Popup offset relative to the anchor.
    pub popup_anchor: [i32; 2],
}

/// Geometry shared by every pin: 40×50, anchored bottom-center, popup above.
pub const PIN_GEOMETRY: IconGeometry = IconGeometry {
    size: [40, 50],
    anchor: [20, 50],
    popup_anchor: [0, -50],
};

/// A placed, styled map pin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Identifier of the entry this pin represents.
    pub id: String,
    /// Popup title.
    pub title: String,
    /// Collection the entry came from.
    pub data_type: DataType,
    /// Where the pin is placed.
    pub position: LatLng,
    /// Colors and glyph.
    pub descriptor: MarkerDescriptor,
    /// Pin geometry.
    pub geometry: IconGeometry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_is_anchored_bottom_center() {
        assert_eq!(PIN_GEOMETRY.anchor[0], i32::try_from(PIN_GEOMETRY.size[0] / 2).unwrap());
        assert_eq!(PIN_GEOMETRY.anchor[1], i32::try_from(PIN_GEOMETRY.size[1]).unwrap());
        assert!(PIN_GEOMETRY.popup_anchor[1] < 0);
    }

    #[test]
    fn glyph_names_are_kebab_case() {
        assert_eq!(Glyph::ClipboardCheck.to_string(), "clipboard-check");
        assert_eq!("person-digging".parse::<Glyph>().unwrap(), Glyph::PersonDigging);
        assert_eq!(
            serde_json::to_value(Glyph::CircleInfo).unwrap(),
            serde_json::json!("circle-info")
        );
    }
}
