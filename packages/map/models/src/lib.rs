#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map entry, filter criteria and marker types.
//!
//! These types mirror the JSON returned by the `MuniFor` backend map
//! endpoints (`/map/data`, `/map/operator-data`) and the shapes the map
//! view works with after filtering and classification. Entries are
//! read-only here: reports, tasks and progress updates are created and
//! mutated elsewhere.

pub mod api;
pub mod criteria;
pub mod marker;

use chrono::{DateTime, Utc};
use munifor_issue_models::{
    DataType, ProgressStatus, ReportStatus, ReportType, Tag, TaskPriority, TaskStatus, TaskType,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub use criteria::{CriteriaScope, FilterCriteria, RawFilterForm};
pub use marker::{Color, Glyph, IconGeometry, Marker, MarkerDescriptor, PIN_GEOMETRY};

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl LatLng {
    /// Builds a position from optional coordinates.
    ///
    /// Returns `None` unless both coordinates are present and finite.
    #[must_use]
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some(Self { lat, lng }),
            _ => None,
        }
    }
}

/// A citizen report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    /// Opaque identifier.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Latitude, if the citizen supplied a location.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude, if the citizen supplied a location.
    #[serde(default)]
    pub lng: Option<f64>,
    /// Kind of problem.
    #[serde(rename = "type")]
    pub report_type: Tag<ReportType>,
    /// Review state.
    pub status: Tag<ReportStatus>,
    /// Short title.
    #[serde(default)]
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// When the report was submitted.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An operator task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntry {
    /// Opaque identifier.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Latitude.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude.
    #[serde(default)]
    pub lng: Option<f64>,
    /// Kind of work.
    #[serde(rename = "type")]
    pub task_type: Tag<TaskType>,
    /// Urgency.
    pub priority: Tag<TaskPriority>,
    /// Execution state.
    pub status: Tag<TaskStatus>,
    /// Short title.
    #[serde(default)]
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// When the task was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A progress update logged by a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    /// Opaque identifier.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Latitude.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude.
    #[serde(default)]
    pub lng: Option<f64>,
    /// State of the work.
    pub status: Tag<ProgressStatus>,
    /// Name of the worker who logged the update.
    #[serde(default, alias = "worker")]
    pub worker_name: String,
    /// Notes attached to the update.
    #[serde(default)]
    pub description: Option<String>,
    /// When the update was first logged.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the update last changed.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The three entry collections returned by a map endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDataset {
    /// Citizen reports.
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub reports: Vec<ReportEntry>,
    /// Operator tasks.
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub tasks: Vec<TaskEntry>,
    /// Worker progress updates.
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub progress: Vec<ProgressEntry>,
}

impl MapDataset {
    /// Returns the number of entries in the collection for `data_type`.
    #[must_use]
    pub fn len_of(&self, data_type: DataType) -> usize {
        match data_type {
            DataType::Report => self.reports.len(),
            DataType::Task => self.tasks.len(),
            DataType::Progress => self.progress.len(),
        }
    }

    /// Returns `true` if all three collections are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty() && self.tasks.is_empty() && self.progress.is_empty()
    }

    /// Iterates the collection selected by `data_type` as borrowed entries.
    pub fn entries(&self, data_type: DataType) -> Box<dyn Iterator<Item = EntryRef<'_>> + '_> {
        match data_type {
            DataType::Report => Box::new(self.reports.iter().map(EntryRef::Report)),
            DataType::Task => Box::new(self.tasks.iter().map(EntryRef::Task)),
            DataType::Progress => Box::new(self.progress.iter().map(EntryRef::Progress)),
        }
    }
}

/// A borrowed entry from one of the three collections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryRef<'a> {
    /// A citizen report.
    Report(&'a ReportEntry),
    /// An operator task.
    Task(&'a TaskEntry),
    /// A worker progress update.
    Progress(&'a ProgressEntry),
}

impl<'a> EntryRef<'a> {
    /// Returns the collection this entry belongs to.
    #[must_use]
    pub const fn data_type(self) -> DataType {
        match self {
            Self::Report(_) => DataType::Report,
            Self::Task(_) => DataType::Task,
            Self::Progress(_) => DataType::Progress,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub fn id(self) -> &'a str {
        match self {
            Self::Report(e) => &e.id,
            Self::Task(e) => &e.id,
            Self::Progress(e) => &e.id,
        }
    }

    /// Returns a display title. Progress updates are titled by worker.
    #[must_use]
    pub fn title(self) -> &'a str {
        match self {
            Self::Report(e) => &e.title,
            Self::Task(e) => &e.title,
            Self::Progress(e) => &e.worker_name,
        }
    }

    /// Returns the position, or `None` if either coordinate is missing.
    #[must_use]
    pub fn position(self) -> Option<LatLng> {
        match self {
            Self::Report(e) => LatLng::from_parts(e.lat, e.lng),
            Self::Task(e) => LatLng::from_parts(e.lat, e.lng),
            Self::Progress(e) => LatLng::from_parts(e.lat, e.lng),
        }
    }

    /// Returns the status label of the entry.
    #[must_use]
    pub fn status_label(self) -> &'a str {
        match self {
            Self::Report(e) => e.status.label(),
            Self::Task(e) => e.status.label(),
            Self::Progress(e) => e.status.label(),
        }
    }

    /// Clones the referenced entry.
    #[must_use]
    pub fn to_owned_entry(self) -> Entry {
        match self {
            Self::Report(e) => Entry::Report(e.clone()),
            Self::Task(e) => Entry::Task(e.clone()),
            Self::Progress(e) => Entry::Progress(e.clone()),
        }
    }
}

/// An owned entry, used for the map selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dataType", rename_all = "lowercase")]
pub enum Entry {
    /// A citizen report.
    Report(ReportEntry),
    /// An operator task.
    Task(TaskEntry),
    /// A worker progress update.
    Progress(ProgressEntry),
}

impl Entry {
    /// Borrows the entry.
    #[must_use]
    pub const fn as_entry_ref(&self) -> EntryRef<'_> {
        match self {
            Self::Report(e) => EntryRef::Report(e),
            Self::Task(e) => EntryRef::Task(e),
            Self::Progress(e) => EntryRef::Progress(e),
        }
    }

    /// Returns the collection this entry belongs to.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.as_entry_ref().data_type()
    }
}

impl From<EntryRef<'_>> for Entry {
    fn from(value: EntryRef<'_>) -> Self {
        value.to_owned_entry()
    }
}

/// Accepts identifiers sent either as JSON strings or numbers.
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Uint(n) => n.to_string(),
    })
}

/// Deserializes a list, dropping elements that do not fit `T`.
///
/// One malformed record must not empty the whole map, so each element is
/// decoded on its own and failures are logged and skipped. A `null` list
/// decodes as empty.
fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    let raw = raw.unwrap_or_default();
    let mut entries = Vec::with_capacity(raw.len());

    for (idx, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(entry) => entries.push(entry),
            Err(e) => log::warn!("Skipping malformed map entry at index {idx}: {e}"),
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use munifor_issue_models::ReportType;

    #[test]
    fn deserializes_numeric_ids_and_missing_coordinates() {
        let dataset: MapDataset = serde_json::from_value(serde_json::json!({
            "reports": [
                { "id": 1, "type": "bache", "status": "Pendiente", "lat": 5.0, "lng": 5.0 },
                { "id": "r-2", "type": "bache", "status": "Pendiente" }
            ],
            "tasks": [],
            "progress": []
        }))
        .unwrap();

        assert_eq!(dataset.reports.len(), 2);
        assert_eq!(dataset.reports[0].id, "1");
        assert_eq!(dataset.reports[0].report_type, Tag::Known(ReportType::Pothole));
        assert!(EntryRef::Report(&dataset.reports[0]).position().is_some());
        assert!(EntryRef::Report(&dataset.reports[1]).position().is_none());
    }

    #[test]
    fn skips_malformed_entries_only() {
        let dataset: MapDataset = serde_json::from_value(serde_json::json!({
            "reports": [
                { "id": "ok", "type": "basura", "status": "Revisado" },
                { "type": "basura", "status": "Revisado" },
                "not an object"
            ],
            "tasks": null
        }))
        .unwrap();

        assert_eq!(dataset.reports.len(), 1);
        assert_eq!(dataset.reports[0].id, "ok");
        assert!(dataset.tasks.is_empty());
        assert!(dataset.progress.is_empty());
    }

    #[test]
    fn position_requires_both_finite_coordinates() {
        assert!(LatLng::from_parts(Some(1.0), None).is_none());
        assert!(LatLng::from_parts(None, Some(1.0)).is_none());
        assert!(LatLng::from_parts(Some(f64::NAN), Some(1.0)).is_none());
        assert_eq!(
            LatLng::from_parts(Some(1.0), Some(2.0)),
            Some(LatLng { lat: 1.0, lng: 2.0 })
        );
    }

    #[test]
    fn progress_accepts_worker_alias() {
        let entry: ProgressEntry = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "status": "Finalizado",
            "worker": "Ana"
        }))
        .unwrap();
        assert_eq!(entry.worker_name, "Ana");
        assert_eq!(EntryRef::Progress(&entry).title(), "Ana");
    }

    #[test]
    fn owned_entry_serializes_with_data_type_tag() {
        let entry: ReportEntry = serde_json::from_value(serde_json::json!({
            "id": "r1", "type": "otro", "status": "Aceptado", "title": "Bench"
        }))
        .unwrap();
        let json = serde_json::to_value(Entry::Report(entry)).unwrap();
        assert_eq!(json["dataType"], "report");
        assert_eq!(json["type"], "otro");
    }
}
