//! Command-line front end for the vaplan projection engine
//!
//! Loads a carrier payload and a YAML scenario file, runs the projection and
//! renders a text or JSON report. All file and terminal I/O lives here; the
//! engine in `vaplan_core` never touches either.

pub mod commands;
pub mod config;
pub mod logging;
pub mod report;
pub mod util;

pub use commands::{CatalogArgs, OutputFormat, ProjectArgs, run_catalog, run_project};
pub use config::{ConfigError, ScenarioFile};
pub use logging::init_logging;
