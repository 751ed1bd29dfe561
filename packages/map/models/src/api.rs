//! Request and response bodies exchanged with the backend API.

use munifor_issue_models::ReportStatus;
use serde::{Deserialize, Serialize};

/// Operator decision on a citizen report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportDecision {
    /// Accept the report.
    Accept,
    /// Reject the report.
    Reject,
}

impl ReportDecision {
    /// Endpoint (relative to the API base) that records this decision.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Accept => "/report/accept",
            Self::Reject => "/report/reject",
        }
    }

    /// Status the report ends up in.
    #[must_use]
    pub const fn resulting_status(self) -> ReportStatus {
        match self {
            Self::Accept => ReportStatus::Accepted,
            Self::Reject => ReportStatus::Rejected,
        }
    }
}

/// Body of `PUT /report/accept` and `PUT /report/reject`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewReportRequest {
    /// Report identifier.
    pub id: String,
}

/// Error body of a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Server-provided description.
    pub message: String,
}

/// One failed field in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFieldError {
    /// Field path.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

/// Body of a `400 Bad Request` produced by request validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiValidationErrors {
    /// Every failed field.
    pub errors: Vec<ApiFieldError>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}
