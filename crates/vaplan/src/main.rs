use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use vaplan::util::io::atomic_write;
use vaplan::{CatalogArgs, ProjectArgs, init_logging, run_catalog, run_project};

#[derive(Parser, Debug)]
#[command(name = "vaplan")]
#[command(about = "Income rider projections and activation-age planning for variable annuities")]
struct Args {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project every activation age and report the optimum with its tax schedule
    Project(ProjectArgs),
    /// List the riders and income options found in a payload
    Catalog(CatalogArgs),
}

fn emit(output: Option<&Path>, content: &str) -> color_eyre::Result<()> {
    match output {
        Some(path) => {
            atomic_write(path, content)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("report written to {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    match &args.command {
        Command::Project(project) => {
            let rendered = run_project(project)?;
            emit(project.output.as_deref(), &ensure_newline(rendered))
        }
        Command::Catalog(catalog) => {
            let rendered = run_catalog(catalog)?;
            emit(catalog.output.as_deref(), &ensure_newline(rendered))
        }
    }
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
