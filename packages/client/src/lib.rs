#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP client for the `MuniFor` backend.
//!
//! [`ApiClient`] implements [`MapDataSource`] over the backend's REST API:
//! role-dependent map data reads and operator review decisions. Requests
//! carry the bearer token of the injected [`Session`].

pub mod config;
pub mod retry;
pub mod session;

use std::sync::Arc;

use async_trait::async_trait;
use munifor_issue_models::Role;
use munifor_map::MapDataSource;
use munifor_map_models::MapDataset;
use munifor_map_models::api::{ApiFieldError, ReportDecision, ReviewReportRequest};

pub use config::{ClientConfig, ConfigError};
pub use retry::RetryPolicy;
pub use session::{Session, SessionError, UserProfile};

/// Errors from talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not decode.
    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend rejected the session token.
    #[error("Session expired or invalid, please sign in again")]
    Unauthorized,

    /// The backend rejected the request body.
    #[error("Invalid request: {}", format_field_errors(errors))]
    Validation {
        /// Failed fields.
        errors: Vec<ApiFieldError>,
    },

    /// Any other error status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Status code.
        status: u16,
        /// Backend-provided message.
        message: String,
    },
}

fn format_field_errors(errors: &[ApiFieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Authenticated client for the map endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: Arc<Session>,
}

impl ApiClient {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("munifor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            config,
            session,
        })
    }

    /// Settings the client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Session whose token authenticates requests.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[async_trait]
impl MapDataSource for ApiClient {
    type Error = ClientError;

    async fn fetch_map_data(&self, role: Role) -> Result<MapDataset, ClientError> {
        let url = self.config.endpoint_url(role.map_endpoint());
        let auth = self.session.authorization();
        log::debug!("GET {url} as {role}");

        let response = retry::send(
            || self.http.get(&url).header(reqwest::header::AUTHORIZATION, &auth),
            RetryPolicy::from_config(&self.config),
        )
        .await?;

        let body = response.text().await?;
        let dataset: MapDataset = serde_json::from_str(&body)?;
        log::info!(
            "Loaded map data: {} reports, {} tasks, {} progress updates",
            dataset.reports.len(),
            dataset.tasks.len(),
            dataset.progress.len()
        );
        Ok(dataset)
    }

    async fn review_report(&self, id: &str, decision: ReportDecision) -> Result<(), ClientError> {
        let url = self.config.endpoint_url(decision.endpoint());
        let auth = self.session.authorization();
        let body = ReviewReportRequest { id: id.to_string() };
        log::debug!("PUT {url} id={id}");

        retry::send(
            || {
                self.http
                    .put(&url)
                    .header(reqwest::header::AUTHORIZATION, &auth)
                    .json(&body)
            },
            RetryPolicy::NONE,
        )
        .await?;

        log::info!("Report {id} marked {}", decision.resulting_status());
        Ok(())
    }
}
