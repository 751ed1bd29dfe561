//! Marker placement and `GeoJSON` export.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value, feature::Id};
use munifor_map_models::{EntryRef, LatLng, Marker, MarkerDescriptor, PIN_GEOMETRY};

use crate::classify;

/// Places a pin for `entry` at `position` with the shared pin geometry.
#[must_use]
pub fn place_marker(entry: EntryRef<'_>, position: LatLng, descriptor: MarkerDescriptor) -> Marker {
    Marker {
        id: entry.id().to_string(),
        title: entry.title().to_string(),
        data_type: entry.data_type(),
        position,
        descriptor,
        geometry: PIN_GEOMETRY,
    }
}

/// Classifies and places one entry.
///
/// Returns `None` when the entry lacks a latitude or longitude.
#[must_use]
pub fn build_marker(entry: EntryRef<'_>) -> Option<Marker> {
    let position = entry.position()?;
    Some(place_marker(entry, position, classify::classify(entry)))
}

/// Turns filtered entries into pins, skipping entries without a position.
pub fn render_markers<'a, I>(entries: I) -> Vec<Marker>
where
    I: IntoIterator<Item = EntryRef<'a>>,
{
    let mut skipped = 0usize;
    let markers: Vec<Marker> = entries
        .into_iter()
        .filter_map(|entry| {
            let marker = build_marker(entry);
            if marker.is_none() {
                skipped += 1;
            }
            marker
        })
        .collect();

    if skipped > 0 {
        log::debug!("Skipped {skipped} entries without coordinates");
    }

    markers
}

/// Converts a pin to a `GeoJSON` point feature.
#[must_use]
pub fn marker_to_feature(marker: &Marker) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("id".to_string(), marker.id.clone().into());
    properties.insert("title".to_string(), marker.title.clone().into());
    properties.insert("dataType".to_string(), marker.data_type.to_string().into());
    properties.insert("fill".to_string(), marker.descriptor.fill.hex().into());
    properties.insert("border".to_string(), marker.descriptor.border.hex().into());
    properties.insert("glyph".to_string(), marker.descriptor.glyph.to_string().into());
    properties.insert("iconSize".to_string(), serde_json::json!(marker.geometry.size));
    properties.insert("iconAnchor".to_string(), serde_json::json!(marker.geometry.anchor));
    properties.insert("popupAnchor".to_string(), serde_json::json!(marker.geometry.popup_anchor));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            marker.position.lng,
            marker.position.lat,
        ]))),
        id: Some(Id::String(marker.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Exports pins as a `GeoJSON` feature collection.
#[must_use]
pub fn markers_to_geojson(markers: &[Marker]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: markers.iter().map(marker_to_feature).collect(),
        foreign_members: None,
    }
}
