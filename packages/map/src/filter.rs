//! Map data filtering.
//!
//! Selects the collection named by the criteria scope and keeps the
//! entries that match every present criterion. Output order follows the
//! input collection and the result depends only on the arguments.
//!
//! Entries without coordinates are *not* removed here; that guard runs
//! when markers are built so counts still include them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use munifor_issue_models::{Tag, Taxonomy, TimeRange};
use munifor_map_models::{CriteriaScope, EntryRef, FilterCriteria, MapDataset};

/// Reads the timestamp the time-range filter compares against.
///
/// Reports and tasks use their creation time; progress updates use their
/// last update, falling back to creation.
#[must_use]
pub fn default_timestamp(entry: EntryRef<'_>) -> Option<DateTime<Utc>> {
    match entry {
        EntryRef::Report(r) => r.created_at,
        EntryRef::Task(t) => t.created_at,
        EntryRef::Progress(p) => p.updated_at.or(p.created_at),
    }
}

fn tag_matches<T: Taxonomy>(wanted: Option<&Tag<T>>, actual: &Tag<T>) -> bool {
    wanted.is_none_or(|w| w.matches(actual))
}

/// Returns `true` if `entry` belongs to the scope's collection and
/// satisfies its type, status and priority constraints.
#[must_use]
pub fn matches_scope(entry: EntryRef<'_>, scope: &CriteriaScope) -> bool {
    match (scope, entry) {
        (
            CriteriaScope::Report {
                report_type,
                status,
            },
            EntryRef::Report(r),
        ) => {
            tag_matches(report_type.as_ref(), &r.report_type)
                && tag_matches(status.as_ref(), &r.status)
        }
        (
            CriteriaScope::Task {
                task_type,
                priority,
                status,
            },
            EntryRef::Task(t),
        ) => {
            tag_matches(task_type.as_ref(), &t.task_type)
                && tag_matches(priority.as_ref(), &t.priority)
                && tag_matches(status.as_ref(), &t.status)
        }
        (CriteriaScope::Progress { status }, EntryRef::Progress(p)) => {
            tag_matches(status.as_ref(), &p.status)
        }
        _ => false,
    }
}

/// Returns `true` if the entry's timestamp falls inside the bucket.
///
/// Entries without a timestamp only pass when no time restriction applies.
fn within_time_range<F>(
    entry: EntryRef<'_>,
    time_range: Option<TimeRange>,
    now: DateTime<Utc>,
    timestamp: &F,
) -> bool
where
    F: Fn(EntryRef<'_>) -> Option<DateTime<Utc>>,
{
    let Some(cutoff) = time_range.and_then(|range| range.cutoff(now)) else {
        return true;
    };
    timestamp(entry).is_some_and(|ts| ts >= cutoff)
}

/// Filters the dataset using [`default_timestamp`] for time ranges.
#[must_use]
pub fn filter_entries<'a>(
    dataset: &'a MapDataset,
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> Vec<EntryRef<'a>> {
    filter_entries_with(dataset, criteria, now, default_timestamp)
}

/// Filters the dataset with a caller-supplied timestamp accessor.
///
/// Without a scope no collection is selected and the result is empty.
pub fn filter_entries_with<'a, F>(
    dataset: &'a MapDataset,
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
    timestamp: F,
) -> Vec<EntryRef<'a>>
where
    F: Fn(EntryRef<'_>) -> Option<DateTime<Utc>>,
{
    let Some(scope) = criteria.scope.as_ref() else {
        return Vec::new();
    };

    dataset
        .entries(scope.data_type())
        .filter(|entry| matches_scope(*entry, scope))
        .filter(|entry| within_time_range(*entry, criteria.time_range, now, &timestamp))
        .collect()
}

/// Counts filtered entries per status label.
#[must_use]
pub fn count_by_status(entries: &[EntryRef<'_>]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.status_label().to_string()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use munifor_issue_models::{DataType, ReportStatus, TaskPriority};
    use munifor_map_models::RawFilterForm;

    use crate::marker::render_markers;
    use crate::normalize::normalize_filters;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn criteria(json: serde_json::Value) -> FilterCriteria {
        normalize_filters(&serde_json::from_value::<RawFilterForm>(json).unwrap())
    }

    fn single_report() -> MapDataset {
        serde_json::from_value(serde_json::json!({
            "reports": [{ "id": 1, "type": "bache", "status": "Pendiente", "lat": 5, "lng": 5 }],
            "tasks": [],
            "progress": []
        }))
        .unwrap()
    }

    fn ids(entries: &[EntryRef<'_>]) -> Vec<String> {
        entries.iter().map(|e| e.id().to_string()).collect()
    }

    #[test]
    fn matching_status_keeps_the_report() {
        let data = single_report();
        let out = filter_entries(
            &data,
            &criteria(serde_json::json!({ "dataType": "report", "status": "Pendiente" })),
            now(),
        );
        assert_eq!(ids(&out), ["1"]);
    }

    #[test]
    fn other_status_yields_nothing() {
        let data = single_report();
        let out = filter_entries(
            &data,
            &criteria(serde_json::json!({ "dataType": "report", "status": "Completado" })),
            now(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn unpositioned_match_is_counted_but_not_rendered() {
        let data: MapDataset = serde_json::from_value(serde_json::json!({
            "reports": [{ "id": 2, "type": "bache", "status": "Pendiente" }]
        }))
        .unwrap();
        let out = filter_entries(
            &data,
            &criteria(serde_json::json!({ "dataType": "report", "type": "bache", "status": "Pendiente" })),
            now(),
        );
        assert_eq!(ids(&out), ["2"]);
        assert!(render_markers(out).is_empty());
    }

    #[test]
    fn comparison_ignores_case_on_both_sides() {
        let data: MapDataset = serde_json::from_value(serde_json::json!({
            "reports": [
                { "id": "a", "type": "BACHE", "status": "pendiente" },
                { "id": "b", "type": "Grafiti", "status": "Pendiente" }
            ]
        }))
        .unwrap();

        let out = filter_entries(
            &data,
            &criteria(serde_json::json!({ "dataType": "report", "type": "Bache" })),
            now(),
        );
        assert_eq!(ids(&out), ["a"]);

        let out = filter_entries(
            &data,
            &criteria(serde_json::json!({ "dataType": "report", "type": "grafiti" })),
            now(),
        );
        assert_eq!(ids(&out), ["b"]);
    }

    #[test]
    fn no_scope_selects_no_collection() {
        let data = single_report();
        let out = filter_entries(
            &data,
            &criteria(serde_json::json!({ "timeRange": "all" })),
            now(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn task_filter_uses_priority_and_preserves_order() {
        let data: MapDataset = serde_json::from_value(serde_json::json!({
            "tasks": [
                { "id": "t3", "type": "Reparación", "priority": "Alta", "status": "Pendiente" },
                { "id": "t1", "type": "Reparación", "priority": "Baja", "status": "Pendiente" },
                { "id": "t2", "type": "Reparación", "priority": "Alta", "status": "En progreso" }
            ]
        }))
        .unwrap();
        let c = FilterCriteria {
            scope: Some(CriteriaScope::Task {
                task_type: None,
                priority: Some(Tag::Known(TaskPriority::High)),
                status: None,
            }),
            time_range: None,
        };

        let first = filter_entries(&data, &c, now());
        let second = filter_entries(&data, &c, now());
        assert_eq!(ids(&first), ["t3", "t2"]);
        assert_eq!(first, second);
    }

    #[test]
    fn time_range_excludes_old_and_undated_entries() {
        let data: MapDataset = serde_json::from_value(serde_json::json!({
            "reports": [
                { "id": "recent", "type": "otro", "status": "Pendiente", "createdAt": "2024-06-01T11:30:00Z" },
                { "id": "old", "type": "otro", "status": "Pendiente", "createdAt": "2024-05-01T00:00:00Z" },
                { "id": "undated", "type": "otro", "status": "Pendiente" }
            ]
        }))
        .unwrap();

        let hour = criteria(serde_json::json!({ "dataType": "report", "timeRange": "last-hour" }));
        assert_eq!(ids(&filter_entries(&data, &hour, now())), ["recent"]);

        let all = criteria(serde_json::json!({ "dataType": "report", "timeRange": "all" }));
        assert_eq!(
            ids(&filter_entries(&data, &all, now())),
            ["recent", "old", "undated"]
        );
    }

    #[test]
    fn time_comparator_is_pluggable() {
        let data = single_report();
        let c = FilterCriteria {
            scope: Some(CriteriaScope::unfiltered(DataType::Report)),
            time_range: Some(TimeRange::LastDay),
        };
        let fresh = filter_entries_with(&data, &c, now(), |_| Some(now() - TimeDelta::hours(2)));
        assert_eq!(ids(&fresh), ["1"]);
        let stale = filter_entries_with(&data, &c, now(), |_| Some(now() - TimeDelta::days(2)));
        assert!(stale.is_empty());
    }

    #[test]
    fn counts_group_by_status_label() {
        let data: MapDataset = serde_json::from_value(serde_json::json!({
            "reports": [
                { "id": 1, "type": "bache", "status": "Pendiente" },
                { "id": 2, "type": "basura", "status": "Pendiente" },
                { "id": 3, "type": "basura", "status": "Rechazado" }
            ]
        }))
        .unwrap();
        let out = filter_entries(&data, &FilterCriteria::default(), now());
        let counts = count_by_status(&out);
        assert_eq!(counts.get(ReportStatus::Pending.label()), Some(&2));
        assert_eq!(counts.get(ReportStatus::Rejected.label()), Some(&1));
    }
}
