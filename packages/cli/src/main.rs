#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the `MuniFor` map.
//!
//! ```text
//! munifor login <token> [--id ID --name NAME --role operador]
//! munifor map [--data-type task] [--type Reparación] [--status Pendiente]
//!             [--priority Alta] [--progress-status Finalizado]
//!             [--time-range last-week] [--geojson] [--select ID]
//! munifor review accept <id>
//! munifor review reject <id>
//! munifor serve [--interactive]
//! ```
//!
//! Running `munifor` with no subcommand enters the interactive browser.

mod commands;
mod interactive;
mod render;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use munifor_client::UserProfile;
use munifor_issue_models::{Role, parse_strict};
use munifor_map_models::RawFilterForm;
use munifor_map_models::api::ReportDecision;

#[derive(Parser)]
#[command(name = "munifor", about = "Browse and review municipal issues on the map")]
struct Cli {
    /// Client config file (TOML) layered over the built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Map filter flags; unset flags do not narrow.
#[derive(Debug, Default, Args)]
struct FilterArgs {
    /// Collection to show: report, task or progress
    #[arg(long)]
    data_type: Option<String>,
    /// Report type or task type
    #[arg(long = "type")]
    entry_type: Option<String>,
    /// Report or task status
    #[arg(long)]
    status: Option<String>,
    /// Task priority
    #[arg(long)]
    priority: Option<String>,
    /// Progress status
    #[arg(long)]
    progress_status: Option<String>,
    /// last-hour, last-day, last-week, last-month, last-year or all
    #[arg(long)]
    time_range: Option<String>,
}

impl From<FilterArgs> for RawFilterForm {
    fn from(args: FilterArgs) -> Self {
        Self {
            data_type: args.data_type,
            entry_type: args.entry_type,
            status: args.status,
            priority: args.priority,
            progress_status: args.progress_status,
            time_range: args.time_range,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Save a session token for later commands
    Login {
        /// Bearer token issued by the backend
        token: String,
        /// User id
        #[arg(long, requires = "role")]
        id: Option<String>,
        /// Display name
        #[arg(long, requires = "role")]
        name: Option<String>,
        /// Role: administrador, operador, trabajador or ciudadano
        #[arg(long)]
        role: Option<String>,
    },
    /// List map entries matching the filters
    Map {
        #[command(flatten)]
        filters: FilterArgs,
        /// Print the map pins as a GeoJSON FeatureCollection
        #[arg(long)]
        geojson: bool,
        /// Show the detail view of one entry
        #[arg(long)]
        select: Option<String>,
    },
    /// Accept or reject a citizen report (operators)
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },
    /// Run the development API server
    Serve {
        /// Prompt for address, port and fixture
        #[arg(long)]
        interactive: bool,
    },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// Accept the report
    Accept {
        /// Report id
        id: String,
    },
    /// Reject the report
    Reject {
        /// Report id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let Some(command) = cli.command else {
        let client = commands::connect(config)?;
        return interactive::run(&client).await;
    };

    match command {
        Commands::Login {
            token,
            id,
            name,
            role,
        } => {
            let profile = match role {
                Some(role) => Some(UserProfile {
                    id: id.unwrap_or_default(),
                    name: name.unwrap_or_default(),
                    role: parse_strict::<Role>(&role)?,
                }),
                None => None,
            };
            commands::login(config, &token, profile)?;
        }
        Commands::Map {
            filters,
            geojson,
            select,
        } => {
            let client = commands::connect(config)?;
            commands::map(&client, &filters.into(), geojson, select.as_deref()).await?;
        }
        Commands::Review { action } => {
            let client = commands::connect(config)?;
            let (id, decision) = match action {
                ReviewAction::Accept { id } => (id, ReportDecision::Accept),
                ReviewAction::Reject { id } => (id, ReportDecision::Reject),
            };
            commands::review(&client, &id, decision).await?;
        }
        Commands::Serve { interactive } => {
            // actix-web runs its own runtime; keep it off the tokio one.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(async move {
                    if interactive {
                        munifor_server::interactive::run().await
                    } else {
                        munifor_server::run_server().await
                    }
                })
            })
            .await??;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_flags_become_raw_form_values() {
        let cli = Cli::try_parse_from([
            "munifor",
            "map",
            "--data-type",
            "task",
            "--type",
            "Reparación",
            "--priority",
            "alta",
            "--time-range",
            "last-week",
        ])
        .unwrap();

        let Some(Commands::Map { filters, geojson, .. }) = cli.command else {
            panic!("expected map command");
        };
        let form = RawFilterForm::from(filters);
        assert!(!geojson);
        assert_eq!(form.data_type.as_deref(), Some("task"));
        assert_eq!(form.entry_type.as_deref(), Some("Reparación"));
        assert_eq!(form.priority.as_deref(), Some("alta"));
        assert_eq!(form.status, None);
        assert_eq!(form.time_range.as_deref(), Some("last-week"));
    }

    #[test]
    fn login_profile_flags_require_role() {
        assert!(Cli::try_parse_from(["munifor", "login", "tok", "--name", "Ana"]).is_err());
        assert!(
            Cli::try_parse_from(["munifor", "login", "tok", "--name", "Ana", "--role", "operador"])
                .is_ok()
        );
    }
}
