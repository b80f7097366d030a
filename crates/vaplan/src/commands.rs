//! Subcommand implementations
//!
//! Each command returns its rendered output; `main` decides where it goes.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use color_eyre::eyre::WrapErr;
use vaplan_core::catalog::{NoteClassifier, parse_payload, try_extract_catalog};
use vaplan_core::model::RiderCatalog;
use vaplan_core::projection::run_projection_with;
use vaplan_core::resolve::resolve_parameters;

use crate::config::ScenarioFile;
use crate::report::{ProjectionReport, render_catalog_text, render_json, render_text};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ProjectArgs {
    /// Carrier rider-data payload (JSON); the built-in product is used without one
    #[arg(short, long)]
    pub payload: Option<PathBuf>,

    /// Scenario file (YAML) with assumptions, policy facts and selection
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,

    /// Rider name, overriding the scenario file
    #[arg(long)]
    pub rider: Option<String>,

    /// Income option, overriding the scenario file
    #[arg(long)]
    pub option: Option<String>,

    /// Activation age to detail instead of the optimal age
    #[arg(long)]
    pub activate_at: Option<u32>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct CatalogArgs {
    /// Carrier rider-data payload (JSON)
    #[arg(short, long)]
    pub payload: PathBuf,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the listing to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Read a payload file and extract its catalog.
///
/// A missing or unreadable file is an error; a payload with no usable riders
/// is not, it just means the fallback product applies.
pub fn load_catalog(path: &Path) -> color_eyre::Result<Option<RiderCatalog>> {
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read payload {}", path.display()))?;

    let outcome = parse_payload(&raw).and_then(|p| try_extract_catalog(&p, &NoteClassifier));
    match outcome {
        Ok(catalog) => {
            tracing::info!(
                payload = %path.display(),
                product = %catalog.product_name,
                riders = catalog.riders.len(),
                "loaded rider catalog"
            );
            Ok(Some(catalog))
        }
        Err(err) => {
            tracing::warn!(payload = %path.display(), "{err}; using the built-in product");
            Ok(None)
        }
    }
}

pub fn run_project(args: &ProjectArgs) -> color_eyre::Result<String> {
    let scenario = match &args.scenario {
        Some(path) => ScenarioFile::load(path)
            .wrap_err_with(|| format!("Failed to load scenario {}", path.display()))?,
        None => ScenarioFile::default(),
    };

    let catalog = match &args.payload {
        Some(path) => load_catalog(path)?,
        None => None,
    };

    // Flags win over the scenario file; with neither, start on the catalog's default rider
    let default_selection = catalog.as_ref().and_then(|c| c.default_selection());
    let rider = args
        .rider
        .as_deref()
        .or(scenario.selection.rider.as_deref())
        .or(default_selection.map(|(rider, _)| rider));
    let option = args
        .option
        .as_deref()
        .or(scenario.selection.option.as_deref());
    let activation_age = args.activate_at.or(scenario.selection.activation_age);

    let params = resolve_parameters(catalog.as_ref(), rider, option);
    tracing::info!(
        product = %params.product_name,
        rider = %params.rider_name,
        option = ?params.selected_option,
        from_api = params.from_api,
        "resolved rider parameters"
    );

    let policy = scenario.policy_facts();
    let projection = run_projection_with(
        &params,
        &scenario.assumptions,
        &policy,
        &scenario.projection,
    );
    let report = ProjectionReport::build(&params, &projection, activation_age);

    match args.format {
        OutputFormat::Text => Ok(render_text(&report)),
        OutputFormat::Json => render_json(&report).wrap_err("Failed to serialize report"),
    }
}

pub fn run_catalog(args: &CatalogArgs) -> color_eyre::Result<String> {
    let catalog = load_catalog(&args.payload)?;
    match args.format {
        OutputFormat::Text => Ok(render_catalog_text(catalog.as_ref())),
        OutputFormat::Json => render_json(&catalog).wrap_err("Failed to serialize catalog"),
    }
}
