//! Interactive map browser.
//!
//! Loads the map once, then loops: prompt for filters, print the matching
//! entries, optionally inspect one and (for operators) accept or reject a
//! report.

use dialoguer::{Confirm, Input, Select};
use munifor_client::ApiClient;
use munifor_issue_models::{
    DataType, ProgressStatus, ReportStatus, ReportType, Role, TaskPriority, TaskStatus, TaskType,
    Taxonomy, TimeRange,
};
use munifor_map::MapViewController;
use munifor_map_models::api::ReportDecision;
use munifor_map_models::{Entry, RawFilterForm};

use crate::{commands, render};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Prompts for one optional taxonomy value; "Any" maps to `None`.
fn pick<T: Taxonomy>(prompt: &str) -> CliResult<Option<String>> {
    let mut items = vec!["Any"];
    items.extend(T::all().iter().map(|v| v.label()));

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;

    Ok((idx > 0).then(|| items[idx].to_string()))
}

/// Walks the user through the filter form for one data type.
fn prompt_form() -> CliResult<RawFilterForm> {
    let data_types = DataType::all();
    let labels: Vec<&str> = data_types.iter().map(|d| d.label()).collect();
    let idx = Select::new()
        .with_prompt("Show")
        .items(&labels)
        .default(0)
        .interact()?;
    let data_type = data_types[idx];

    let mut form = RawFilterForm {
        data_type: Some(data_type.label().to_string()),
        ..RawFilterForm::default()
    };
    match data_type {
        DataType::Report => {
            form.entry_type = pick::<ReportType>("Report type")?;
            form.status = pick::<ReportStatus>("Status")?;
        }
        DataType::Task => {
            form.entry_type = pick::<TaskType>("Task type")?;
            form.priority = pick::<TaskPriority>("Priority")?;
            form.status = pick::<TaskStatus>("Status")?;
        }
        DataType::Progress => {
            form.progress_status = pick::<ProgressStatus>("Progress status")?;
        }
    }
    form.time_range = pick::<TimeRange>("Time range")?;
    Ok(form)
}

/// Offers accept/reject for the selected report.
async fn offer_review(controller: &mut MapViewController, client: &ApiClient) -> CliResult<()> {
    if controller.role() != Role::Operator || !matches!(controller.detail(), Some(Entry::Report(_))) {
        return Ok(());
    }

    let choices = ["Leave as is", "Accept report", "Reject report"];
    let decision = match Select::new()
        .with_prompt("Review")
        .items(&choices)
        .default(0)
        .interact()?
    {
        1 => ReportDecision::Accept,
        2 => ReportDecision::Reject,
        _ => return Ok(()),
    };

    match controller.review_selected(client, decision).await {
        Ok(_) => println!("Marked {}", decision.resulting_status()),
        Err(e) => eprintln!("{e}"),
    }
    if let Some(error) = controller.last_error() {
        eprintln!("Reload failed: {error}");
    }
    Ok(())
}

/// Runs the interactive browser until the user quits.
///
/// # Errors
///
/// Fails if the initial load fails or a prompt cannot be shown.
pub async fn run(client: &ApiClient) -> CliResult<()> {
    println!("MuniFor map");
    println!();

    let mut controller = commands::load(client).await?;

    loop {
        let form = prompt_form()?;
        controller.apply_form(&form);
        commands::print_map(&controller, false)?;

        let id: String = Input::new()
            .with_prompt("Entry id to inspect (empty to skip)")
            .allow_empty(true)
            .interact_text()?;
        let id = id.trim();
        if !id.is_empty() {
            if controller.select_by_id(id) {
                if let Some(entry) = controller.detail() {
                    print!("{}", render::detail(entry));
                }
                offer_review(&mut controller, client).await?;
                controller.clear_selection();
            } else {
                println!("No entry {id} under these filters.");
            }
        }

        if !Confirm::new()
            .with_prompt("Change filters?")
            .default(true)
            .interact()?
        {
            break;
        }
    }

    controller.teardown();
    Ok(())
}
