//! Filter form normalization.
//!
//! Produces [`FilterCriteria`] holding only the fields that apply to the
//! chosen data type. Empty or whitespace-only form values are treated as
//! "not selected" and never reach the criteria.

use munifor_issue_models::{DataType, Tag, Taxonomy, TimeRange};
use munifor_map_models::{CriteriaScope, FilterCriteria, RawFilterForm};

/// Returns the trimmed value if it is non-empty.
fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn tag<T: Taxonomy>(value: Option<&String>) -> Option<Tag<T>> {
    present(value).map(Tag::parse)
}

/// Normalizes raw form values into filter criteria.
///
/// - `report` keeps type and status.
/// - `task` keeps type, priority and status.
/// - `progress` moves the progress status into the generic status slot.
/// - An absent or unrecognized data type yields no scope at all.
///
/// A recognized time range is always carried over; unknown labels are
/// dropped.
#[must_use]
pub fn normalize_filters(form: &RawFilterForm) -> FilterCriteria {
    let data_type = present(form.data_type.as_ref()).and_then(|raw| {
        let parsed = DataType::parse_label(raw);
        if parsed.is_none() {
            log::warn!("Ignoring unknown data type {raw:?} in filter form");
        }
        parsed
    });

    let scope = data_type.map(|data_type| match data_type {
        DataType::Report => CriteriaScope::Report {
            report_type: tag(form.entry_type.as_ref()),
            status: tag(form.status.as_ref()),
        },
        DataType::Task => CriteriaScope::Task {
            task_type: tag(form.entry_type.as_ref()),
            priority: tag(form.priority.as_ref()),
            status: tag(form.status.as_ref()),
        },
        DataType::Progress => CriteriaScope::Progress {
            status: tag(form.progress_status.as_ref()),
        },
    });

    let time_range = present(form.time_range.as_ref()).and_then(|raw| {
        let parsed = TimeRange::parse_label(raw);
        if parsed.is_none() {
            log::warn!("Ignoring unknown time range {raw:?} in filter form");
        }
        parsed
    });

    FilterCriteria { scope, time_range }
}
