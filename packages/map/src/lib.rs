#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map view logic for the `MuniFor` issue map.
//!
//! The pipeline runs leaf to root:
//!
//! 1. [`normalize`] turns raw filter form values into [`FilterCriteria`].
//! 2. [`filter`] selects the active collection from a [`MapDataset`] and
//!    narrows it by type, status, priority and time range.
//! 3. [`classify`] resolves each surviving entry to a
//!    [`MarkerDescriptor`] (fill, border, glyph).
//! 4. [`marker`] drops entries without a position and places the rest as
//!    pins with a fixed geometry, optionally exported as `GeoJSON`.
//!
//! [`controller::MapViewController`] owns the dataset, filter and
//! selection state and fetches data through a [`source::MapDataSource`].
//!
//! [`FilterCriteria`]: munifor_map_models::FilterCriteria
//! [`MapDataset`]: munifor_map_models::MapDataset
//! [`MarkerDescriptor`]: munifor_map_models::MarkerDescriptor

pub mod classify;
pub mod controller;
pub mod filter;
pub mod marker;
pub mod normalize;
pub mod source;

pub use controller::{ControllerError, LoadHandle, LoadOutcome, MapViewController};
pub use source::{LoadError, MapDataSource};
