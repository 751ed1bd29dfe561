#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Development API server for the `MuniFor` map.
//!
//! Serves the map endpoints (`/api/map/data`, `/api/map/operator-data`)
//! and the report review endpoints (`/api/report/accept`,
//! `/api/report/reject`) over an in-memory fixture dataset, so the client
//! and CLI can be exercised without the real backend. Review decisions
//! mutate the in-memory copy only.

mod handlers;
pub mod interactive;
pub mod validate;

use std::path::{Path, PathBuf};

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use munifor_map_models::MapDataset;
use serde::Deserialize;
use tokio::sync::RwLock;

const EMBEDDED_FIXTURE: &str = include_str!("../fixtures/map.json");

/// Errors from starting the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding or running the HTTP server failed, or the fixture could not
    /// be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The fixture file is not valid JSON.
    #[error("Invalid fixture {path}: {source}")]
    Fixture {
        /// Fixture file.
        path: String,
        /// Parse error.
        source: serde_json::Error,
    },

    /// An interactive prompt failed.
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// An environment variable has the wrong format.
    #[error("Invalid value {value:?} for {key}")]
    InvalidEnv {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Data served by the endpoints.
///
/// `operator` is the subset returned by `/map/operator-data`; without it
/// operators see the full dataset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    /// Dataset for `/map/data`.
    #[serde(flatten)]
    pub dataset: MapDataset,
    /// Dataset for `/map/operator-data`.
    #[serde(default)]
    pub operator: Option<MapDataset>,
}

impl Fixture {
    /// Returns the fixture compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Fixture`] if the embedded JSON is malformed.
    pub fn embedded() -> Result<Self, ServerError> {
        serde_json::from_str(EMBEDDED_FIXTURE).map_err(|source| ServerError::Fixture {
            path: "<embedded>".to_string(),
            source,
        })
    }

    /// Reads a fixture file.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| ServerError::Fixture {
            path: path.display().to_string(),
            source,
        })
    }

    /// Dataset served to operators.
    #[must_use]
    pub fn operator_view(&self) -> &MapDataset {
        self.operator.as_ref().unwrap_or(&self.dataset)
    }
}

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Fixture file (`MUNIFOR_FIXTURE`); the embedded fixture otherwise.
    pub fixture: Option<PathBuf>,
    /// Bearer token every request must carry (`MUNIFOR_API_TOKEN`).
    pub api_token: Option<String>,
}

impl ServerConfig {
    /// Reads settings through `lookup`, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidEnv`] if `PORT` is not a port number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ServerError::InvalidEnv {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => 8080,
        };
        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            fixture: lookup("MUNIFOR_FIXTURE").map(PathBuf::from),
            api_token: lookup("MUNIFOR_API_TOKEN").filter(|t| !t.trim().is_empty()),
        })
    }

    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Self::from_lookup`].
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Shared application state.
pub struct AppState {
    /// Served data; review decisions write through this lock.
    pub data: RwLock<Fixture>,
    /// Required bearer token, if any.
    pub api_token: Option<String>,
}

impl AppState {
    /// Wraps a fixture for serving.
    #[must_use]
    pub fn new(fixture: Fixture, api_token: Option<String>) -> Self {
        Self {
            data: RwLock::new(fixture),
            api_token,
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/map/data", web::get().to(handlers::map_data))
            .route("/map/operator-data", web::get().to(handlers::operator_data))
            .route("/report/accept", web::put().to(handlers::accept_report))
            .route("/report/reject", web::put().to(handlers::reject_report)),
    );
}

/// Starts the development API server.
///
/// Loads the fixture named by `MUNIFOR_FIXTURE` (or the embedded one) and
/// serves it until the process is stopped. The caller provides the async
/// runtime (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns [`ServerError`] if the configuration or fixture is invalid, or
/// the HTTP server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;

    let fixture = match &config.fixture {
        Some(path) => {
            log::info!("Loading fixture from {}", path.display());
            Fixture::load(path)?
        }
        None => {
            log::info!("Using embedded fixture");
            Fixture::embedded()?
        }
    };
    log::info!(
        "Serving {} reports, {} tasks, {} progress updates",
        fixture.dataset.reports.len(),
        fixture.dataset.tasks.len(),
        fixture.dataset.progress.len()
    );
    if config.api_token.is_none() {
        log::warn!("MUNIFOR_API_TOKEN not set, requests are not authenticated");
    }

    let state = web::Data::new(AppState::new(fixture, config.api_token.clone()));

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
