/// Catalog Audit - cross-checks product categories against their `_base` keys
///
/// This library extracts the hardcoded product catalog from a JavaScript
/// constants module, tallies categories and `_base` routing keys, and reports
/// products whose `_base` does not match their category.

pub mod core;
pub mod utils;

// Re-export main types for convenience
pub use crate::core::analyzer::{analyze_products, AnalysisResult, Mismatch, Tally};
pub use crate::core::extractor::{extract_products, ExtractError, ProductExtractor};
pub use crate::core::record::Record;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extract and analyze a single catalog file
///
/// This is a convenience function for simple use cases. The undecodable-JSON
/// dump, if any, is written to the current directory.
///
/// # Returns
///
/// `None` when no products could be extracted
pub fn analyze_file<P: AsRef<std::path::Path>>(file_path: P) -> Option<AnalysisResult> {
    let products = extract_products(file_path.as_ref());
    if products.is_empty() {
        None
    } else {
        Some(analyze_products(&products))
    }
}

/// Library configuration
pub mod config {
    use std::path::{Path, PathBuf};

    use log::{error, info};
    use serde::Deserialize;

    use crate::core::extractor::DIAGNOSTIC_FILE;

    /// Catalog file analyzed when no path is given
    pub const DEFAULT_PRODUCTS_FILE: &str = "admin/constants/index.mjs";

    /// Settings read from an optional JSON configuration file
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    #[serde(default)]
    pub struct Config {
        /// Catalog file, overridden by the command line argument
        pub products_file: Option<PathBuf>,
        /// Where undecodable JSON is dumped
        pub diagnostic_file: PathBuf,
        /// Wrap the console report in a markdown code block
        pub markdown: bool,
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                products_file: None,
                diagnostic_file: PathBuf::from(DIAGNOSTIC_FILE),
                markdown: false,
            }
        }
    }

    impl Config {
        /// Pick the catalog path: explicit argument, then config, then default
        pub fn resolve_products_file(&self, cli_path: Option<&Path>) -> PathBuf {
            cli_path
                .map(Path::to_path_buf)
                .or_else(|| self.products_file.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PRODUCTS_FILE))
        }
    }

    /// Load configuration from file if provided
    ///
    /// A missing or malformed file is logged and the defaults are used.
    pub fn load_config(config_path: Option<&Path>) -> Config {
        let path = match config_path {
            Some(path) => path,
            None => return Config::default(),
        };

        if !path.exists() {
            error!("Configuration file not found: {}", path.display());
            return Config::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str::<Config>(&text).map_err(|e| e.to_string()));

        match parsed {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                error!("Invalid configuration file {}: {}", path.display(), e);
                Config::default()
            }
        }
    }
}

/// Command-line application functionality
pub mod app {
    use std::path::Path;

    use log::info;

    use crate::core::analyzer::{analyze_products, AnalysisResult};
    use crate::core::extractor::ProductExtractor;
    use crate::utils::output_formatter;

    /// Run the full audit on one catalog file, printing progress and the
    /// report to stdout.
    ///
    /// # Arguments
    ///
    /// * `products_file` - Catalog source to read
    /// * `extractor` - Extractor carrying the diagnostic dump location
    /// * `use_markdown` - Wrap the report in a markdown code block
    ///
    /// # Returns
    ///
    /// The analysis, or `None` when nothing could be extracted
    pub fn run_audit(
        products_file: &Path,
        extractor: &ProductExtractor,
        use_markdown: bool,
    ) -> Option<AnalysisResult> {
        println!("Analyzing products from {}...", products_file.display());
        let products = extractor.extract(products_file);

        if products.is_empty() {
            println!("No products found or could not parse products data.");
            return None;
        }

        println!("Found {} products.", products.len());
        let analysis = analyze_products(&products);
        info!(
            "{} mismatches, {} products missing _base",
            analysis.category_base_mismatches.len(),
            analysis.missing_base.len()
        );

        print!("{}", output_formatter::format_report(&analysis, use_markdown));
        Some(analysis)
    }
}
