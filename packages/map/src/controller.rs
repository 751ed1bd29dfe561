//! Map view state.
//!
//! [`MapViewController`] holds three independent slices of state: the
//! fetched dataset, the active filters and the selected entry. Loads are
//! tied to the controller's lifetime through a [`CancellationToken`];
//! once [`MapViewController::teardown`] runs, in-flight fetches are
//! abandoned and late results are discarded instead of committed.

use chrono::{DateTime, Utc};
use munifor_issue_models::{DataType, Role};
use munifor_map_models::api::ReportDecision;
use munifor_map_models::{Entry, EntryRef, FilterCriteria, MapDataset, Marker, RawFilterForm};
use tokio_util::sync::CancellationToken;

use crate::source::{LoadError, MapDataSource};
use crate::{filter, marker, normalize};

/// Errors from controller actions that talk to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The action needs a selected entry.
    #[error("No entry is selected")]
    NothingSelected,

    /// The action only applies to reports.
    #[error("Selected entry is a {data_type}, not a report")]
    NotAReport {
        /// Collection of the selected entry.
        data_type: DataType,
    },

    /// The backend refused the review.
    #[error("Failed to review report {id}: {message}")]
    Review {
        /// Report identifier.
        id: String,
        /// Error reported by the data source.
        message: String,
    },
}

/// Result of committing a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched dataset replaced the previous one.
    Applied,
    /// The fetch failed and the dataset was reset to empty.
    Failed,
    /// The controller was torn down; nothing changed.
    Discarded,
}

/// Ties one fetch to the lifetime of the controller that started it.
#[derive(Debug, Clone)]
pub struct LoadHandle {
    token: CancellationToken,
    role: Role,
}

impl LoadHandle {
    /// Role whose endpoint this load reads.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` once the owning controller has been torn down.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Fetches the dataset for a load, giving up as soon as the load is
/// cancelled.
///
/// # Errors
///
/// Returns [`LoadError::Cancelled`] if the handle is cancelled first, or
/// [`LoadError::Source`] if the data source fails.
pub async fn fetch_dataset<S>(
    source: &S,
    handle: &LoadHandle,
) -> Result<MapDataset, LoadError<S::Error>>
where
    S: MapDataSource + ?Sized,
{
    tokio::select! {
        biased;
        () = handle.token.cancelled() => Err(LoadError::Cancelled),
        result = source.fetch_map_data(handle.role) => result.map_err(LoadError::Source),
    }
}

/// State behind the map view.
#[derive(Debug)]
pub struct MapViewController {
    role: Role,
    dataset: MapDataset,
    loaded: bool,
    filters: FilterCriteria,
    selection: Option<Entry>,
    last_error: Option<String>,
    lifetime: CancellationToken,
}

impl MapViewController {
    /// Creates a controller with an empty dataset, the default report
    /// filter and no selection.
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            dataset: MapDataset::default(),
            loaded: false,
            filters: FilterCriteria::default(),
            selection: None,
            last_error: None,
            lifetime: CancellationToken::new(),
        }
    }

    /// Role the controller fetches data for.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Currently held dataset.
    #[must_use]
    pub const fn dataset(&self) -> &MapDataset {
        &self.dataset
    }

    /// Whether any load has completed (successfully or not).
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Active filters.
    #[must_use]
    pub const fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    /// Selected entry, regardless of the active data type.
    #[must_use]
    pub const fn selection(&self) -> Option<&Entry> {
        self.selection.as_ref()
    }

    /// Message of the last failed load, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether [`Self::teardown`] has run.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.lifetime.is_cancelled()
    }

    /// Starts a load bound to this controller's lifetime.
    #[must_use]
    pub fn begin_load(&self) -> LoadHandle {
        LoadHandle {
            token: self.lifetime.child_token(),
            role: self.role,
        }
    }

    /// Commits the result of a load.
    ///
    /// Results for a cancelled handle are dropped. A failure resets every
    /// collection to empty and records the error for display. Overlapping
    /// loads are applied in the order their results arrive.
    pub fn apply_load<E: std::fmt::Display>(
        &mut self,
        handle: &LoadHandle,
        result: Result<MapDataset, LoadError<E>>,
    ) -> LoadOutcome {
        if handle.is_cancelled() {
            log::debug!("Discarding map data that arrived after teardown");
            return LoadOutcome::Discarded;
        }

        let outcome = match result {
            Ok(dataset) => {
                log::debug!(
                    "Loaded map data: {} reports, {} tasks, {} progress entries",
                    dataset.reports.len(),
                    dataset.tasks.len(),
                    dataset.progress.len()
                );
                self.dataset = dataset;
                self.last_error = None;
                LoadOutcome::Applied
            }
            Err(LoadError::Cancelled) => return LoadOutcome::Discarded,
            Err(LoadError::Source(e)) => {
                log::error!("Failed to load map data: {e}");
                self.dataset = MapDataset::default();
                self.last_error = Some(e.to_string());
                LoadOutcome::Failed
            }
        };

        self.loaded = true;
        self.resync_selection();
        outcome
    }

    /// Fetches and commits the dataset for this controller's role.
    pub async fn refresh<S>(&mut self, source: &S) -> LoadOutcome
    where
        S: MapDataSource + ?Sized,
    {
        let handle = self.begin_load();
        let result = fetch_dataset(source, &handle).await;
        self.apply_load(&handle, result)
    }

    /// Cancels all loads started by this controller.
    pub fn teardown(&self) {
        self.lifetime.cancel();
    }

    /// Replaces the filters.
    ///
    /// The selection survives unless it belongs to a different collection
    /// than the new filters select.
    pub fn apply_filters(&mut self, filters: FilterCriteria) {
        let data_type = filters.data_type();
        let stale = self
            .selection
            .as_ref()
            .is_some_and(|selected| Some(selected.data_type()) != data_type);
        if stale {
            log::debug!("Clearing selection after switching filters to {data_type:?}");
            self.selection = None;
        }
        self.filters = filters;
    }

    /// Normalizes raw form values and applies them as filters.
    pub fn apply_form(&mut self, form: &RawFilterForm) {
        self.apply_filters(normalize::normalize_filters(form));
    }

    /// Selects an entry, replacing any previous selection.
    pub fn select(&mut self, entry: Entry) {
        self.selection = Some(entry);
    }

    /// Selects the entry with `id` from the active collection.
    ///
    /// Returns `false` (leaving the selection unchanged) if no such entry
    /// exists.
    pub fn select_by_id(&mut self, id: &str) -> bool {
        let Some(data_type) = self.filters.data_type() else {
            return false;
        };
        let found = self
            .dataset
            .entries(data_type)
            .find(|e| e.id() == id)
            .map(EntryRef::to_owned_entry);

        match found {
            Some(entry) => {
                self.selection = Some(entry);
                true
            }
            None => false,
        }
    }

    /// Closes the detail panel.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Entry to show in the detail panel.
    ///
    /// Only yields the selection when it matches the active data type, so
    /// a report is never shown under task filters.
    #[must_use]
    pub fn detail(&self) -> Option<&Entry> {
        let data_type = self.filters.data_type()?;
        self.selection
            .as_ref()
            .filter(|entry| entry.data_type() == data_type)
    }

    /// Filtered entries, including ones without coordinates.
    #[must_use]
    pub fn visible_entries(&self, now: DateTime<Utc>) -> Vec<EntryRef<'_>> {
        filter::filter_entries(&self.dataset, &self.filters, now)
    }

    /// Pins for the filtered entries that have coordinates.
    #[must_use]
    pub fn markers(&self, now: DateTime<Utc>) -> Vec<Marker> {
        marker::render_markers(self.visible_entries(now))
    }

    /// Accepts or rejects the selected report, then reloads the dataset.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] if nothing is selected, the selection is
    /// not a report, or the backend refuses the review.
    pub async fn review_selected<S>(
        &mut self,
        source: &S,
        decision: ReportDecision,
    ) -> Result<LoadOutcome, ControllerError>
    where
        S: MapDataSource + ?Sized,
    {
        let id = match self.detail() {
            Some(Entry::Report(report)) => report.id.clone(),
            Some(other) => {
                return Err(ControllerError::NotAReport {
                    data_type: other.data_type(),
                });
            }
            None => return Err(ControllerError::NothingSelected),
        };

        source
            .review_report(&id, decision)
            .await
            .map_err(|e| ControllerError::Review {
                id: id.clone(),
                message: e.to_string(),
            })?;
        log::info!("Report {id} marked {}", decision.resulting_status());

        Ok(self.refresh(source).await)
    }

    /// Points the selection at the freshly loaded copy of the same entry,
    /// or clears it if the entry is gone.
    fn resync_selection(&mut self) {
        let Some(selected) = self.selection.take() else {
            return;
        };
        let (data_type, id) = {
            let r = selected.as_entry_ref();
            (r.data_type(), r.id().to_string())
        };
        self.selection = self
            .dataset
            .entries(data_type)
            .find(|e| e.id() == id)
            .map(EntryRef::to_owned_entry);
    }
}

impl Drop for MapViewController {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}
