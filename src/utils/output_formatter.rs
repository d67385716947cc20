/// Output formatter for analysis results
///
/// This module renders an analysis as the console report and exports it as
/// JSON or CSV side files.

use std::fs::File;
use std::path::Path;
use anyhow::{Result, Context};
use colored::Colorize;

use crate::core::analyzer::{AnalysisResult, Mismatch, Tally};
use crate::core::mapping;

/// Category singled out in the specific category analysis
const FOCUS_CATEGORY: &str = "Beverages";
const FOCUS_BASE: &str = "beverages";

/// Format an analysis as the console report
///
/// # Arguments
///
/// * `analysis` - Result of the analysis pass
/// * `use_markdown` - Whether to wrap the report in markdown triple backticks
///
/// # Returns
///
/// Formatted string for console output
pub fn format_report(analysis: &AnalysisResult, use_markdown: bool) -> String {
    let mut output = String::new();

    if use_markdown {
        output.push_str("```\n");
    }

    output.push_str(&format!("\n{}\n\n", "=== PRODUCT ANALYSIS ===".yellow().bold()));

    output.push_str(&format!("{}\n", "Category Counts:".cyan().bold()));
    output.push_str(&format_counts(&analysis.category_counts));

    output.push_str(&format!("\n{}\n", "Base Value Counts:".cyan().bold()));
    output.push_str(&format_counts(&analysis.base_counts));

    output.push_str(&format!("\n{}\n", "Category-Base Mismatches:".cyan().bold()));
    output.push_str(&format_mismatches(&analysis.category_base_mismatches));

    output.push_str(&format!("{}\n", "Products Missing _base Field:".cyan().bold()));
    if analysis.missing_base.is_empty() {
        output.push_str("  No products missing _base field.\n");
    } else {
        for product in &analysis.missing_base {
            output.push_str(&format!("  {} (ID: {})\n", product.name(), product.id()));
        }
    }

    output.push_str(&format!("\n{}\n\n", "=== SPECIFIC CATEGORY ANALYSIS ===".yellow().bold()));
    output.push_str(&format_focus_category(analysis));
    output.push_str(&format_category_checks(analysis));

    if use_markdown {
        output.push_str("```\n");
    }

    output
}

/// One line per key, highest count first
fn format_counts(counts: &Tally) -> String {
    let mut output = String::new();
    for (key, count) in counts.sorted_desc() {
        output.push_str(&format!("  {}: {}\n", key, count));
    }
    output
}

fn format_mismatches(mismatches: &[Mismatch]) -> String {
    if mismatches.is_empty() {
        return "  No mismatches found.\n".to_string();
    }

    let mut output = String::new();
    for mismatch in mismatches {
        output.push_str(&format!("  Product: {} (ID: {})\n", mismatch.name, mismatch.id));
        output.push_str(&format!("    Category: {}\n", mismatch.category));
        output.push_str(&format!("    Actual _base: {}\n", mismatch.actual_base));
        output.push_str(&format!("    Expected _base: {}\n", mismatch.expected_base));
        output.push('\n');
    }
    output
}

fn format_focus_category(analysis: &AnalysisResult) -> String {
    let category_count = analysis.category_counts.get(FOCUS_CATEGORY);
    let base_count = analysis.base_counts.get(FOCUS_BASE);

    let mut output = String::new();
    output.push_str(&format!("{} category: {} products\n", FOCUS_CATEGORY, category_count));
    output.push_str(&format!("{} _base: {} products\n", FOCUS_BASE, base_count));

    if category_count > base_count {
        output.push_str(&format!(
            "{}\n",
            format!(
                "ISSUE DETECTED: Some {} products have incorrect _base values!",
                FOCUS_CATEGORY
            )
            .red()
            .bold()
        ));
        output.push_str(&format!(
            "This is why they're not showing up in the {} category page.\n",
            FOCUS_BASE
        ));
    }

    output
}

/// Compare category and `_base` counts for every mapped category.
///
/// Only categories whose counts differ are printed.
fn format_category_checks(analysis: &AnalysisResult) -> String {
    let mut output = String::new();

    for (category, base) in mapping::mappings() {
        let category_count = analysis.category_counts.get(category);
        let base_count = analysis.base_counts.get(base);

        if category_count == base_count {
            continue;
        }

        output.push_str(&format!("\n{} category: {} products\n", category, category_count));
        output.push_str(&format!("{} _base: {} products\n", base, base_count));
        if category_count > base_count {
            output.push_str(&format!(
                "{}\n",
                format!("ISSUE DETECTED: Some {} products have incorrect _base values!", category)
                    .red()
                    .bold()
            ));
        }
    }

    output
}

/// Export the analysis to a JSON file
///
/// # Arguments
///
/// * `analysis` - Result of the analysis pass
/// * `output_path` - Path where the JSON file will be written
///
/// # Returns
///
/// Result indicating success or failure
pub fn export_results_json(analysis: &AnalysisResult, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create JSON output file: {}", output_path.display()))?;

    serde_json::to_writer_pretty(file, analysis)
        .context("Failed to write JSON data")?;

    Ok(())
}

/// Write the mismatch list to a CSV file
///
/// # Arguments
///
/// * `mismatches` - Mismatches in source order
/// * `output_path` - Path where the CSV file will be written
///
/// # Returns
///
/// Result indicating success or failure
pub fn create_csv_report(mismatches: &[Mismatch], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create CSV output file: {}", output_path.display()))?;

    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(["ID", "Name", "Category", "Actual Base", "Expected Base"])
        .context("Failed to write CSV header")?;

    for mismatch in mismatches {
        writer.write_record([
            &mismatch.id,
            &mismatch.name,
            &mismatch.category,
            &mismatch.actual_base,
            &mismatch.expected_base,
        ])
        .context("Failed to write CSV record")?;
    }

    // Flush the writer to ensure all data is written
    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzer::analyze_products;
    use crate::core::record::Record;
    use serde_json::json;

    fn analysis_for(value: serde_json::Value) -> AnalysisResult {
        let products: Vec<Record> = serde_json::from_value(value).unwrap();
        analyze_products(&products)
    }

    #[test]
    fn test_sections_appear_in_order() {
        let analysis = analysis_for(json!([
            { "_id": "1", "name": "A", "category": "Beverages", "_base": "beverages" }
        ]));
        let report = format_report(&analysis, false);

        let positions: Vec<usize> = [
            "Category Counts:",
            "Base Value Counts:",
            "Category-Base Mismatches:",
            "Products Missing _base Field:",
            "SPECIFIC CATEGORY ANALYSIS",
        ]
        .iter()
        .map(|heading| report.find(heading).expect(heading))
        .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(report.contains("  No mismatches found."));
        assert!(report.contains("  No products missing _base field."));
        assert!(!report.contains("ISSUE DETECTED"));
    }

    #[test]
    fn test_counts_sorted_descending() {
        let analysis = analysis_for(json!([
            { "_id": "1", "category": "Oral Care", "_base": "oralCare" },
            { "_id": "2", "category": "Skin Care", "_base": "skinCare" },
            { "_id": "3", "category": "Skin Care", "_base": "skinCare" }
        ]));
        let counts = format_counts(&analysis.category_counts);
        assert_eq!(counts, "  Skin Care: 2\n  Oral Care: 1\n");
    }

    #[test]
    fn test_mismatch_block() {
        let analysis = analysis_for(json!([
            { "_id": "2", "name": "B", "category": "Beverages", "_base": "homeCare" },
            { "_id": "3", "name": "C", "category": "Baby Care" }
        ]));
        let report = format_report(&analysis, false);
        assert!(report.contains("  Product: B (ID: 2)\n"));
        assert!(report.contains("    Actual _base: homeCare\n"));
        assert!(report.contains("    Expected _base: beverages\n"));
        assert!(report.contains("  C (ID: 3)\n"));
    }

    #[test]
    fn test_beverages_shortfall_is_flagged() {
        let analysis = analysis_for(json!([
            { "_id": "1", "category": "Beverages", "_base": "beverages" },
            { "_id": "2", "category": "Beverages", "_base": "homeCare" }
        ]));
        let focus = format_focus_category(&analysis);
        assert!(focus.contains("Beverages category: 2 products"));
        assert!(focus.contains("beverages _base: 1 products"));
        assert!(focus.contains("ISSUE DETECTED: Some Beverages products have incorrect _base values!"));
        assert!(focus.contains("beverages category page"));
    }

    #[test]
    fn test_category_checks_only_report_differences() {
        let analysis = analysis_for(json!([
            { "_id": "1", "category": "Oral Care", "_base": "oralCare" },
            { "_id": "2", "category": "Beverages", "_base": "homeCare" }
        ]));
        let checks = format_category_checks(&analysis);

        assert!(!checks.contains("Oral Care category"));
        assert!(checks.contains("Beverages category: 1 products"));
        assert!(checks.contains("ISSUE DETECTED: Some Beverages products"));
        // Home Care has more _base hits than products: counts shown, no issue line
        assert!(checks.contains("Home Care category: 0 products"));
        assert!(checks.contains("homeCare _base: 1 products"));
        assert!(!checks.contains("ISSUE DETECTED: Some Home Care products"));
    }

    #[test]
    fn test_markdown_wrapping() {
        let report = format_report(&AnalysisResult::default(), true);
        assert!(report.starts_with("```\n"));
        assert!(report.ends_with("```\n"));
    }

    #[test]
    fn test_exports() {
        let analysis = analysis_for(json!([
            { "_id": "2", "name": "B, the second", "category": "Beverages", "_base": "homeCare" }
        ]));
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("analysis.json");
        export_results_json(&analysis, &json_path).unwrap();
        let exported: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(exported["category_counts"]["Beverages"], 1);
        assert_eq!(exported["category_base_mismatches"][0]["expected_base"], "beverages");

        let csv_path = dir.path().join("mismatches.csv");
        create_csv_report(&analysis.category_base_mismatches, &csv_path).unwrap();
        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(
            csv_text,
            "ID,Name,Category,Actual Base,Expected Base\n2,\"B, the second\",Beverages,homeCare,beverages\n"
        );
    }
}
