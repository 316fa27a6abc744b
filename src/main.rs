use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod aggregate;
mod error;
mod export;
mod load;
mod models;
mod normalize;
mod pipeline;
mod report;
mod rollup;
mod views;

use models::{Category, FailingEmployeeRow};
use pipeline::{Filters, TrainingReport};

#[derive(Parser)]
#[command(name = "training-compliance")]
#[command(about = "Training completion compliance by employee and manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Directory scanned for CSV inputs when --file is not given
    #[arg(long, env = "TRAINING_INPUT_DIR", default_value = "input")]
    input_dir: PathBuf,
    /// Explicit input file
    #[arg(long, env = "TRAINING_INPUT_FILE")]
    file: Option<PathBuf>,
    #[arg(long, default_value_t = load::DEFAULT_DELIMITER as char)]
    delimiter: char,
}

#[derive(Args)]
struct FilterArgs {
    /// Employment categories to include (default: all)
    #[arg(long = "category", value_enum)]
    categories: Vec<Category>,
    /// Managers to include in the failing list (default: all)
    #[arg(long = "manager")]
    managers: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the CSV files available in the input directory
    Files {
        #[arg(long, env = "TRAINING_INPUT_DIR", default_value = "input")]
        input_dir: PathBuf,
    },
    /// List the managers present after category filtering
    Managers {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print category metrics, manager results and the lowest performers
    Summary {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Emit the full report as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export failing employees as a `;`-separated CSV
    Export {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = export::DEFAULT_EXPORT_FILE)]
        out: PathBuf,
    },
}

fn load_and_run(input: &InputArgs, filters: &FilterArgs) -> anyhow::Result<(PathBuf, TrainingReport)> {
    let delimiter = u8::try_from(input.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter {:?} must be a single ASCII character", input.delimiter))?;

    let path = load::resolve_input(input.file.clone(), &input.input_dir)
        .context("failed to choose an input file")?;
    let dataset = load::load_dataset_file(&path, delimiter)
        .with_context(|| format!("failed to load {}", path.display()))?;

    let filters = Filters::from_args(&filters.categories, &filters.managers);
    Ok((path, pipeline::run(&dataset, &filters)))
}

fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Files { input_dir } => {
            let files = load::discover_inputs(&input_dir)
                .with_context(|| format!("failed to list {}", input_dir.display()))?;
            if files.is_empty() {
                println!("No CSV files found in {}.", input_dir.display());
                return Ok(());
            }
            for file in files {
                println!("{}", file.display());
            }
        }
        Commands::Managers { input, filters } => {
            let (_, training) = load_and_run(&input, &filters)?;
            let categories = Filters::from_args(&filters.categories, &[]).categories;
            for manager in views::managers(&training.employees, &categories) {
                println!("{manager}");
            }
        }
        Commands::Summary {
            input,
            filters,
            limit,
            json,
        } => {
            let (_, training) = load_and_run(&input, &filters)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&training)?);
            } else {
                print!("{}", report::build_summary(&training, limit));
            }
        }
        Commands::Report {
            input,
            filters,
            out,
        } => {
            let (path, training) = load_and_run(&input, &filters)?;
            let generated_on = chrono::Local::now().date_naive();
            let output = report::build_report(&path.display().to_string(), generated_on, &training);
            std::fs::write(&out, output)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export {
            input,
            filters,
            out,
        } => {
            let (_, training) = load_and_run(&input, &filters)?;
            let rows: Vec<FailingEmployeeRow> =
                training.failing.iter().map(FailingEmployeeRow::from).collect();
            export::export_failing_file(&out, &rows)?;

            let file = std::fs::File::open(&out)
                .with_context(|| format!("failed to reopen {}", out.display()))?;
            let written = export::read_failing_csv(file)?;
            anyhow::ensure!(
                written == rows,
                "exported file {} does not match the failing employees",
                out.display()
            );
            println!("Exported {} failing employees to {}.", rows.len(), out.display());
        }
    }

    Ok(())
}
