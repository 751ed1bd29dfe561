//! Filter form input and normalized filter criteria.

use munifor_issue_models::{
    DataType, ProgressStatus, ReportStatus, ReportType, Tag, TaskPriority, TaskStatus, TaskType,
    TimeRange,
};
use serde::{Deserialize, Serialize};

/// Raw values from the map filter form.
///
/// Every field is free text; unselected fields arrive as empty strings or
/// are missing entirely. The progress status uses its own form control,
/// separate from the report/task status select.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFilterForm {
    /// `report`, `task` or `progress`.
    pub data_type: Option<String>,
    /// Report type or task type, depending on `data_type`.
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    /// Report or task status.
    pub status: Option<String>,
    /// Task priority.
    pub priority: Option<String>,
    /// Progress status.
    pub progress_status: Option<String>,
    /// Time-range bucket label.
    pub time_range: Option<String>,
}

/// Narrowing applied to the active collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaScope {
    /// Filter the report collection.
    Report {
        /// Required report type.
        report_type: Option<Tag<ReportType>>,
        /// Required report status.
        status: Option<Tag<ReportStatus>>,
    },
    /// Filter the task collection.
    Task {
        /// Required task type.
        task_type: Option<Tag<TaskType>>,
        /// Required priority.
        priority: Option<Tag<TaskPriority>>,
        /// Required task status.
        status: Option<Tag<TaskStatus>>,
    },
    /// Filter the progress collection.
    Progress {
        /// Required progress status.
        status: Option<Tag<ProgressStatus>>,
    },
}

impl CriteriaScope {
    /// An unnarrowed scope over the collection for `data_type`.
    #[must_use]
    pub const fn unfiltered(data_type: DataType) -> Self {
        match data_type {
            DataType::Report => Self::Report {
                report_type: None,
                status: None,
            },
            DataType::Task => Self::Task {
                task_type: None,
                priority: None,
                status: None,
            },
            DataType::Progress => Self::Progress { status: None },
        }
    }

    /// Returns the collection this scope selects.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Report { .. } => DataType::Report,
            Self::Task { .. } => DataType::Task,
            Self::Progress { .. } => DataType::Progress,
        }
    }
}

/// Normalized, data-type-scoped filter constraints.
///
/// A `None` scope selects no collection at all; filtering with it yields
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "CriteriaWire")]
pub struct FilterCriteria {
    /// Selected collection and its narrowing.
    pub scope: Option<CriteriaScope>,
    /// Recency bucket.
    pub time_range: Option<TimeRange>,
}

impl FilterCriteria {
    /// Criteria that show every entry of `data_type`.
    #[must_use]
    pub const fn for_data_type(data_type: DataType) -> Self {
        Self {
            scope: Some(CriteriaScope::unfiltered(data_type)),
            time_range: None,
        }
    }

    /// Returns the selected collection, if any.
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        self.scope.as_ref().map(CriteriaScope::data_type)
    }
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::for_data_type(DataType::Report)
    }
}

/// Flat JSON shape of [`FilterCriteria`]; absent fields are omitted.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CriteriaWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    data_type: Option<DataType>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    entry_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_range: Option<TimeRange>,
}

impl From<FilterCriteria> for CriteriaWire {
    fn from(criteria: FilterCriteria) -> Self {
        fn text<T: munifor_issue_models::Taxonomy>(tag: Option<Tag<T>>) -> Option<String> {
            tag.map(|t| t.label().to_string())
        }

        let mut wire = Self {
            data_type: criteria.data_type(),
            entry_type: None,
            status: None,
            priority: None,
            time_range: criteria.time_range,
        };

        match criteria.scope {
            Some(CriteriaScope::Report {
                report_type,
                status,
            }) => {
                wire.entry_type = text(report_type);
                wire.status = text(status);
            }
            Some(CriteriaScope::Task {
                task_type,
                priority,
                status,
            }) => {
                wire.entry_type = text(task_type);
                wire.priority = text(priority);
                wire.status = text(status);
            }
            Some(CriteriaScope::Progress { status }) => {
                wire.status = text(status);
            }
            None => {}
        }

        wire
    }
}
