#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Municipal issue taxonomy types.
//!
//! Defines the canonical enumerations used across the `MuniFor` map
//! subsystem: citizen report types and statuses, operator task types,
//! priorities and statuses, worker progress statuses, the data-type
//! discriminator that selects one of the three entry collections, user
//! roles and the time-range filter buckets.
//!
//! The backend labels are Spanish and arrive with inconsistent casing
//! (`"bache"`, `"Pendiente"`), so every enum implements [`Taxonomy`],
//! which parses labels case-insensitively. Values that do not match any
//! variant are carried as [`Tag::Unrecognized`] instead of failing the
//! whole payload.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Common behaviour of the label-backed enumerations in this crate.
pub trait Taxonomy: Copy + Eq + Into<&'static str> + 'static {
    /// Human-readable name of the taxonomy, used in error messages.
    const KIND: &'static str;

    /// Returns all variants of this enum.
    fn all() -> &'static [Self];

    /// Returns the canonical wire label for this variant.
    fn label(self) -> &'static str {
        self.into()
    }

    /// Parses a label, ignoring surrounding whitespace and letter case.
    ///
    /// Unlike the derived `FromStr`, this lower-cases non-ASCII letters
    /// too, so `"REPARACIÓN"` resolves to the same variant as
    /// `"Reparación"`.
    fn parse_label(raw: &str) -> Option<Self> {
        let needle = normalize_label(raw);
        Self::all()
            .iter()
            .copied()
            .find(|v| normalize_label(v.label()) == needle)
    }
}

/// Lower-cases and trims a label for comparison.
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parses a label into `T`, failing if it is not part of the taxonomy.
///
/// # Errors
///
/// Returns [`UnknownLabelError`] if no variant of `T` matches `raw`.
pub fn parse_strict<T: Taxonomy>(raw: &str) -> Result<T, UnknownLabelError> {
    T::parse_label(raw).ok_or_else(|| UnknownLabelError {
        kind: T::KIND,
        value: raw.to_string(),
    })
}

/// Error returned when a label does not belong to a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabelError {
    /// Which taxonomy was being parsed.
    pub kind: &'static str,
    /// The label that failed to parse.
    pub value: String,
}

impl std::fmt::Display for UnknownLabelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} {:?}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownLabelError {}

/// A taxonomy value as received from the backend.
///
/// Known labels resolve to a variant of `T`; anything else is kept
/// verbatim so it can still be compared and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag<T> {
    /// A label that maps to a variant of the taxonomy.
    Known(T),
    /// A label outside the taxonomy, stored as received.
    Unrecognized(String),
}

impl<T: Taxonomy> Tag<T> {
    /// Resolves a raw label.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        T::parse_label(raw).map_or_else(|| Self::Unrecognized(raw.to_string()), Self::Known)
    }

    /// Returns the resolved variant, if any.
    #[must_use]
    pub const fn known(&self) -> Option<T> {
        match self {
            Self::Known(v) => Some(*v),
            Self::Unrecognized(_) => None,
        }
    }

    /// Returns the label: canonical for known values, raw otherwise.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Known(v) => v.label(),
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Compares two tags with both sides lower-cased.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Known(a), Self::Known(b)) => a == b,
            _ => normalize_label(self.label()) == normalize_label(other.label()),
        }
    }
}

impl<T: Taxonomy> From<T> for Tag<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

impl<T: Taxonomy> std::fmt::Display for Tag<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl<T: Taxonomy> Serialize for Tag<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de, T: Taxonomy> Deserialize<'de> for Tag<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

macro_rules! taxonomy {
    ($ty:ty, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        impl Taxonomy for $ty {
            const KIND: &'static str = $kind;

            fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }
    };
}

/// Discriminator selecting which entry collection is active.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DataType {
    /// Citizen reports.
    Report,
    /// Operator tasks.
    Task,
    /// Worker progress updates.
    Progress,
}

taxonomy!(DataType, "data type", [Report, Task, Progress]);

/// Kind of problem a citizen reported.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ReportType {
    /// Pothole in the roadway.
    #[serde(rename = "bache")]
    #[strum(serialize = "bache")]
    Pothole,
    /// Broken or missing street lighting.
    #[serde(rename = "alumbrado")]
    #[strum(serialize = "alumbrado")]
    Streetlight,
    /// Uncollected trash or illegal dumping.
    #[serde(rename = "basura")]
    #[strum(serialize = "basura")]
    Trash,
    /// Anything else.
    #[serde(rename = "otro")]
    #[strum(serialize = "otro")]
    Other,
}

taxonomy!(ReportType, "report type", [Pothole, Streetlight, Trash, Other]);

/// Review state of a citizen report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ReportStatus {
    /// Submitted, not yet looked at.
    #[serde(rename = "Pendiente")]
    #[strum(serialize = "Pendiente")]
    Pending,
    /// Seen by an operator.
    #[serde(rename = "Revisado")]
    #[strum(serialize = "Revisado")]
    Reviewed,
    /// Accepted and (usually) converted into a task.
    #[serde(rename = "Aceptado")]
    #[strum(serialize = "Aceptado")]
    Accepted,
    /// The underlying problem has been fixed.
    #[serde(rename = "Completado")]
    #[strum(serialize = "Completado")]
    Completed,
    /// Dismissed by an operator.
    #[serde(rename = "Rechazado")]
    #[strum(serialize = "Rechazado")]
    Rejected,
}

taxonomy!(
    ReportStatus,
    "report status",
    [Pending, Reviewed, Accepted, Completed, Rejected]
);

/// Kind of work a task represents.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum TaskType {
    /// Fixing damaged infrastructure.
    #[serde(rename = "Reparación")]
    #[strum(serialize = "Reparación")]
    Repair,
    /// Scheduled upkeep.
    #[serde(rename = "Mantenimiento")]
    #[strum(serialize = "Mantenimiento")]
    Maintenance,
    /// Waste collection.
    #[serde(rename = "Recolección")]
    #[strum(serialize = "Recolección")]
    Collection,
    /// On-site inspection by a crew leader.
    #[serde(rename = "Supervisión")]
    #[strum(serialize = "Supervisión")]
    Supervision,
}

taxonomy!(TaskType, "task type", [Repair, Maintenance, Collection, Supervision]);

/// Urgency assigned to a task.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum TaskPriority {
    /// Handle first.
    #[serde(rename = "Alta")]
    #[strum(serialize = "Alta")]
    High,
    /// Normal scheduling.
    #[serde(rename = "Media")]
    #[strum(serialize = "Media")]
    Medium,
    /// Whenever a crew is free.
    #[serde(rename = "Baja")]
    #[strum(serialize = "Baja")]
    Low,
}

taxonomy!(TaskPriority, "task priority", [High, Medium, Low]);

/// Execution state of a task.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum TaskStatus {
    /// Not started.
    #[serde(rename = "Pendiente")]
    #[strum(serialize = "Pendiente")]
    Pending,
    /// A crew is working on it.
    #[serde(rename = "En progreso")]
    #[strum(serialize = "En progreso")]
    InProgress,
    /// Done.
    #[serde(rename = "Completado")]
    #[strum(serialize = "Completado")]
    Completed,
}

taxonomy!(TaskStatus, "task status", [Pending, InProgress, Completed]);

/// State of a worker progress update.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ProgressStatus {
    /// Logged but not started.
    #[serde(rename = "Pendiente")]
    #[strum(serialize = "Pendiente")]
    Pending,
    /// Work underway.
    #[serde(rename = "En progreso")]
    #[strum(serialize = "En progreso")]
    InProgress,
    /// Work finished and signed off.
    #[serde(rename = "Finalizado")]
    #[strum(serialize = "Finalizado")]
    Finalized,
}

taxonomy!(ProgressStatus, "progress status", [Pending, InProgress, Finalized]);

/// Role of the signed-in user.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    /// Oversees the whole system.
    #[serde(rename = "administrador")]
    #[strum(serialize = "administrador")]
    Administrator,
    /// Triages reports into tasks.
    #[serde(rename = "operador")]
    #[strum(serialize = "operador")]
    Operator,
    /// Member of a crew.
    #[serde(rename = "trabajador")]
    #[strum(serialize = "trabajador")]
    Worker,
    /// Submits reports.
    #[serde(rename = "ciudadano")]
    #[strum(serialize = "ciudadano")]
    Citizen,
}

taxonomy!(Role, "role", [Administrator, Operator, Worker, Citizen]);

impl Role {
    /// Returns the map endpoint (relative to the API base) this role
    /// reads from.
    #[must_use]
    pub const fn map_endpoint(self) -> &'static str {
        match self {
            Self::Operator => "/map/operator-data",
            Self::Administrator | Self::Worker | Self::Citizen => "/map/data",
        }
    }
}

/// Recency bucket for the time-range filter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TimeRange {
    /// Past 60 minutes.
    LastHour,
    /// Past 24 hours.
    LastDay,
    /// Past 7 days.
    LastWeek,
    /// Past 30 days.
    LastMonth,
    /// Past 365 days.
    LastYear,
    /// No time filtering.
    All,
}

taxonomy!(
    TimeRange,
    "time range",
    [LastHour, LastDay, LastWeek, LastMonth, LastYear, All]
);

impl TimeRange {
    /// Returns the length of the bucket, or `None` for [`Self::All`].
    #[must_use]
    pub fn span(self) -> Option<TimeDelta> {
        match self {
            Self::LastHour => Some(TimeDelta::hours(1)),
            Self::LastDay => Some(TimeDelta::days(1)),
            Self::LastWeek => Some(TimeDelta::days(7)),
            Self::LastMonth => Some(TimeDelta::days(30)),
            Self::LastYear => Some(TimeDelta::days(365)),
            Self::All => None,
        }
    }

    /// Returns the oldest timestamp still inside the bucket relative to
    /// `now`, or `None` when the bucket does not restrict time.
    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.span().map(|span| now - span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_labels_unique<T: Taxonomy + std::fmt::Debug>() {
        let mut seen = std::collections::BTreeSet::new();
        for v in T::all() {
            assert!(
                seen.insert(normalize_label(v.label())),
                "{v:?} shares a label with another {}",
                T::KIND
            );
        }
    }

    #[test]
    fn labels_are_unique_per_taxonomy() {
        assert_labels_unique::<DataType>();
        assert_labels_unique::<ReportType>();
        assert_labels_unique::<ReportStatus>();
        assert_labels_unique::<TaskType>();
        assert_labels_unique::<TaskPriority>();
        assert_labels_unique::<TaskStatus>();
        assert_labels_unique::<ProgressStatus>();
        assert_labels_unique::<Role>();
        assert_labels_unique::<TimeRange>();
    }

    #[test]
    fn parse_label_ignores_case_including_accents() {
        assert_eq!(TaskType::parse_label("REPARACIÓN"), Some(TaskType::Repair));
        assert_eq!(TaskType::parse_label("reparación"), Some(TaskType::Repair));
        assert_eq!(
            ReportStatus::parse_label("  pendiente "),
            Some(ReportStatus::Pending)
        );
        assert_eq!(
            TaskStatus::parse_label("en PROGRESO"),
            Some(TaskStatus::InProgress)
        );
        assert_eq!(ReportType::parse_label("pothole"), None);
    }

    #[test]
    fn display_matches_serde_label() {
        for v in ReportStatus::all() {
            let json = serde_json::to_value(v).unwrap();
            assert_eq!(json, serde_json::Value::String(v.to_string()));
            assert_eq!(v.label(), v.to_string());
        }
        assert_eq!(TimeRange::LastHour.label(), "last-hour");
        assert_eq!(Role::Operator.label(), "operador");
    }

    #[test]
    fn tag_keeps_unrecognized_labels() {
        let tag: Tag<ReportType> = serde_json::from_str("\"Grafiti\"").unwrap();
        assert_eq!(tag, Tag::Unrecognized("Grafiti".to_string()));
        assert_eq!(tag.known(), None);
        assert_eq!(serde_json::to_string(&tag).unwrap(), "\"Grafiti\"");

        let known: Tag<ReportType> = serde_json::from_str("\"BACHE\"").unwrap();
        assert_eq!(known, Tag::Known(ReportType::Pothole));
        assert_eq!(serde_json::to_string(&known).unwrap(), "\"bache\"");
    }

    #[test]
    fn tag_matching_is_case_insensitive() {
        let a: Tag<ReportType> = Tag::Unrecognized("Grafiti".to_string());
        let b: Tag<ReportType> = Tag::Unrecognized("grafiti".to_string());
        assert!(a.matches(&b));
        assert!(!a.matches(&Tag::Known(ReportType::Other)));
        assert!(Tag::parse("Pendiente").matches(&Tag::Known(ReportStatus::Pending)));
    }

    #[test]
    fn parse_strict_reports_kind() {
        let err = parse_strict::<TaskPriority>("urgente").unwrap_err();
        assert_eq!(err.kind, "task priority");
        assert_eq!(err.to_string(), "unknown task priority \"urgente\"");
        assert_eq!(parse_strict::<TaskPriority>("alta"), Ok(TaskPriority::High));
    }

    #[test]
    fn only_operators_read_the_scoped_endpoint() {
        for role in Role::all() {
            let expected = if *role == Role::Operator {
                "/map/operator-data"
            } else {
                "/map/data"
            };
            assert_eq!(role.map_endpoint(), expected);
        }
    }

    #[test]
    fn time_range_cutoffs() {
        let now = DateTime::parse_from_rfc3339("2024-05-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            TimeRange::LastHour.cutoff(now).unwrap().to_rfc3339(),
            "2024-05-10T11:00:00+00:00"
        );
        assert_eq!(
            TimeRange::LastWeek.cutoff(now).unwrap().to_rfc3339(),
            "2024-05-03T12:00:00+00:00"
        );
        assert_eq!(TimeRange::All.cutoff(now), None);
    }
}
