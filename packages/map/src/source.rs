//! Backend access used by the map view.

use async_trait::async_trait;
use munifor_issue_models::Role;
use munifor_map_models::MapDataset;
use munifor_map_models::api::ReportDecision;

/// Read/write access to the map endpoints of the backend.
///
/// The HTTP client implements this; tests supply in-memory fakes.
#[async_trait]
pub trait MapDataSource: Send + Sync {
    /// Error produced by the transport.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the dataset visible to `role`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the request fails or the response
    /// cannot be decoded.
    async fn fetch_map_data(&self, role: Role) -> Result<MapDataset, Self::Error>;

    /// Records an operator decision on a report.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the backend rejects the request.
    async fn review_report(&self, id: &str, decision: ReportDecision) -> Result<(), Self::Error>;
}

/// Why a dataset load produced no data.
#[derive(Debug, thiserror::Error)]
pub enum LoadError<E> {
    /// The owning view was torn down before the fetch finished.
    #[error("load cancelled")]
    Cancelled,

    /// The data source failed.
    #[error(transparent)]
    Source(E),
}
