//! Subcommand implementations shared by the flag-driven and interactive
//! front ends.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use munifor_client::{ApiClient, ClientConfig, Session, UserProfile};
use munifor_issue_models::Taxonomy;
use munifor_map::marker::markers_to_geojson;
use munifor_map::{LoadOutcome, MapViewController, filter};
use munifor_map_models::RawFilterForm;
use munifor_map_models::api::ReportDecision;

use crate::render;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Builds an authenticated client from config and the stored session.
///
/// # Errors
///
/// Fails if the config is invalid or no session can be found.
pub fn connect(config_path: Option<&Path>) -> CliResult<ApiClient> {
    let config = ClientConfig::load(config_path)?;
    let session = Session::resolve(std::env::var("MUNIFOR_TOKEN").ok(), &config.session_file)?;
    log::debug!("Signed in as {}", session.role());
    Ok(ApiClient::new(config, Arc::new(session))?)
}

/// Creates a controller for the session's role and loads the dataset.
///
/// # Errors
///
/// Fails with the load error message if the backend could not be read.
pub async fn load(client: &ApiClient) -> CliResult<MapViewController> {
    let mut controller = MapViewController::new(client.session().role());
    match controller.refresh(client).await {
        LoadOutcome::Applied => Ok(controller),
        LoadOutcome::Failed | LoadOutcome::Discarded => Err(controller
            .last_error()
            .unwrap_or("map data could not be loaded")
            .into()),
    }
}

/// Prints the filtered entries as a table, or as GeoJSON when `geojson`
/// is set.
///
/// # Errors
///
/// Fails if the GeoJSON cannot be serialized.
pub fn print_map(controller: &MapViewController, geojson: bool) -> CliResult<()> {
    let now = Utc::now();

    if geojson {
        let collection = markers_to_geojson(&controller.markers(now));
        println!("{}", serde_json::to_string_pretty(&collection)?);
        return Ok(());
    }

    let entries = controller.visible_entries(now);
    if entries.is_empty() {
        println!("No entries match the current filters.");
        return Ok(());
    }

    println!("{}", render::header());
    println!("{}", "-".repeat(96));
    for entry in &entries {
        println!("{}", render::entry_line(*entry));
    }

    let on_map = entries.iter().filter(|e| e.position().is_some()).count();
    println!();
    print!("{}", render::status_summary(&filter::count_by_status(&entries)));
    println!("\n{} entries, {on_map} on the map", entries.len());
    Ok(())
}

/// Loads, filters and prints the map; optionally shows one entry.
///
/// # Errors
///
/// Fails if loading fails or `select` names no visible entry.
pub async fn map(
    client: &ApiClient,
    form: &RawFilterForm,
    geojson: bool,
    select: Option<&str>,
) -> CliResult<()> {
    let mut controller = load(client).await?;
    controller.apply_form(form);
    print_map(&controller, geojson)?;

    if let Some(id) = select {
        if !controller.select_by_id(id) {
            let kind = controller
                .filters()
                .data_type()
                .map_or("entry", Taxonomy::label);
            return Err(format!("No {kind} with id {id}").into());
        }
        if let Some(entry) = controller.detail() {
            println!();
            print!("{}", render::detail(entry));
        }
    }
    Ok(())
}

/// Accepts or rejects report `id`.
///
/// # Errors
///
/// Fails if the report cannot be found or the backend refuses.
pub async fn review(client: &ApiClient, id: &str, decision: ReportDecision) -> CliResult<()> {
    let mut controller = load(client).await?;
    if !controller.select_by_id(id) {
        return Err(format!("No report with id {id}").into());
    }
    let outcome = controller.review_selected(client, decision).await?;
    println!("Report {id} marked {}", decision.resulting_status());
    if outcome == LoadOutcome::Failed {
        log::warn!("Map reload after review failed");
    }
    Ok(())
}

/// Stores a session token (and optional profile) for later commands.
///
/// # Errors
///
/// Fails if the token is blank or the session cannot be written.
pub fn login(
    config_path: Option<&Path>,
    token: &str,
    profile: Option<UserProfile>,
) -> CliResult<()> {
    let config = ClientConfig::load(config_path)?;
    let session = Session::new(token, profile)?;
    session.save(&config.session_file)?;
    println!(
        "Session saved to {} (role: {})",
        config.session_file.display(),
        session.role()
    );
    Ok(())
}
