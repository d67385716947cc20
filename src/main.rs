/// Catalog Audit - cross-checks product categories against their `_base` keys
///
/// The main entry point for the audit. It parses command-line arguments, reads
/// the catalog, and prints the consistency report.

use anyhow::Result;
use clap::{Parser, ArgAction};
use log::{info, LevelFilter};
use std::fs::File;
use std::path::{Path, PathBuf};

use catalog_audit::app;
use catalog_audit::config::load_config;
use catalog_audit::utils::output_formatter;
use catalog_audit::ProductExtractor;

/// Command line argument structure
#[derive(Parser, Debug)]
#[command(
    name = "catalog_audit",
    version,
    about = "Cross-checks product categories against their _base keys",
    long_about = "Reads the `export const products = [...]` catalog from a constants module and reports:
- product counts per category and per _base key
- products whose _base does not match their category
- products with no _base at all"
)]
struct Args {
    /// Catalog source file (default: admin/constants/index.mjs)
    #[arg(name = "products_file")]
    products_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Output in markdown format (wrapped in triple backticks)
    #[arg(long = "md", action = ArgAction::SetTrue)]
    md: bool,

    /// Export the analysis to a JSON file
    #[arg(long = "json")]
    json: Option<PathBuf>,

    /// Export the mismatch list to a CSV file
    #[arg(long = "csv")]
    csv: Option<PathBuf>,

    /// Set logging level (default: WARN)
    #[arg(long = "log-level", default_value = "warn")]
    log_level: LevelFilter,

    /// Write log lines to this file instead of stderr
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

/// Main entry point function
fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.log_level, args.log_file.as_deref());

    let config = load_config(args.config.as_deref());
    let products_file = config.resolve_products_file(args.products_file.as_deref());
    let extractor = ProductExtractor::new(config.diagnostic_file.clone());

    let use_markdown = args.md || config.markdown;
    let analysis = match app::run_audit(&products_file, &extractor, use_markdown) {
        Some(analysis) => analysis,
        None => return Ok(()),
    };

    if let Some(json_path) = &args.json {
        output_formatter::export_results_json(&analysis, json_path)?;
        info!("Wrote JSON analysis to {}", json_path.display());
    }

    if let Some(csv_path) = &args.csv {
        output_formatter::create_csv_report(&analysis.category_base_mismatches, csv_path)?;
        info!("Wrote mismatch CSV to {}", csv_path.display());
    }

    Ok(())
}

/// Set up logging with optional file output
fn setup_logging(level: LevelFilter, log_file: Option<&Path>) {
    let mut builder = env_logger::Builder::new();

    builder.filter_level(level);

    builder.format(|buf, record| {
        use std::io::Write;
        use chrono::Local;
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Cannot open log file {}: {}", path.display(), e),
        }
    }

    builder.init();
}
