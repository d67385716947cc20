/// Category and `_base` consistency analysis
///
/// This file contains the analysis pass that tallies categories and `_base`
/// keys and flags records whose `_base` disagrees with the category mapping.

use std::collections::HashMap;

use log::debug;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::core::mapping;
use crate::core::record::{Record, MISSING_BASE};

/// Occurrence counts that remember the order keys were first seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `key`
    pub fn increment(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    /// Count for `key`, zero when never seen
    pub fn get(&self, key: &str) -> usize {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }

    /// Entries by descending count; ties keep first-seen order
    pub fn sorted_desc(&self) -> Vec<(&str, usize)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// A record whose `_base` differs from what its category maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub id: String,
    pub name: String,
    pub category: String,
    pub actual_base: String,
    pub expected_base: String,
}

/// Everything one analysis pass produces
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub category_counts: Tally,
    pub base_counts: Tally,
    pub category_base_mismatches: Vec<Mismatch>,
    pub missing_base: Vec<Record>,
}

impl AnalysisResult {
    /// Number of records the analysis covered
    pub fn product_count(&self) -> usize {
        self.category_counts.total()
    }
}

/// Analyze products for category and `_base` inconsistencies.
///
/// Records without a `_base` go to the missing list and are not checked for a
/// mismatch. Records whose category is not in the mapping are only counted.
///
/// # Arguments
///
/// * `products` - Records in source order
///
/// # Returns
///
/// Counts, mismatches and missing-base records; both lists keep input order
pub fn analyze_products(products: &[Record]) -> AnalysisResult {
    let mut analysis = AnalysisResult::default();

    for product in products {
        let category = product.category();
        let base = product.base();

        analysis.category_counts.increment(&category);
        analysis.base_counts.increment(&base);

        if base == MISSING_BASE {
            analysis.missing_base.push(product.clone());
            continue;
        }

        if let Some(expected_base) = mapping::expected_base(&category) {
            if base != expected_base {
                debug!(
                    "Product {} has _base {} but {} expects {}",
                    product.id(),
                    base,
                    category,
                    expected_base
                );
                analysis.category_base_mismatches.push(Mismatch {
                    id: product.id(),
                    name: product.name(),
                    category,
                    actual_base: base,
                    expected_base: expected_base.to_string(),
                });
            }
        }
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> Vec<Record> {
        records(json!([
            { "_id": "1", "name": "A", "category": "Beverages", "_base": "beverages" },
            { "_id": "2", "name": "B", "category": "Beverages", "_base": "homeCare" },
            { "_id": "3", "name": "C", "category": "Baby Care" }
        ]))
    }

    #[test]
    fn test_reference_example() {
        let analysis = analyze_products(&sample());

        assert_eq!(analysis.category_counts.get("Beverages"), 2);
        assert_eq!(analysis.category_counts.get("Baby Care"), 1);
        assert_eq!(analysis.category_counts.len(), 2);

        assert_eq!(analysis.base_counts.get("beverages"), 1);
        assert_eq!(analysis.base_counts.get("homeCare"), 1);
        assert_eq!(analysis.base_counts.get("Missing"), 1);
        assert_eq!(analysis.base_counts.len(), 3);

        assert_eq!(
            analysis.category_base_mismatches,
            vec![Mismatch {
                id: "2".to_string(),
                name: "B".to_string(),
                category: "Beverages".to_string(),
                actual_base: "homeCare".to_string(),
                expected_base: "beverages".to_string(),
            }]
        );

        assert_eq!(analysis.missing_base.len(), 1);
        assert_eq!(analysis.missing_base[0].id(), "3");
    }

    #[test]
    fn test_counts_sum_to_record_count() {
        let products = sample();
        let analysis = analyze_products(&products);
        assert_eq!(analysis.category_counts.total(), products.len());
        assert_eq!(analysis.base_counts.total(), products.len());
        assert_eq!(analysis.product_count(), 3);
    }

    #[test]
    fn test_unknown_category_is_counted_not_checked() {
        let products = records(json!([
            { "_id": "1", "name": "Pan", "category": "Kitchen & Food", "_base": "kitchen" },
            { "_id": "2", "name": "Mystery", "_base": "beverages" }
        ]));
        let analysis = analyze_products(&products);
        assert_eq!(analysis.category_counts.get("Kitchen & Food"), 1);
        assert_eq!(analysis.category_counts.get("Unknown"), 1);
        assert!(analysis.category_base_mismatches.is_empty());
    }

    #[test]
    fn test_missing_never_reported_as_mismatch() {
        let products = records(json!([
            { "_id": "1", "category": "Hair Care" },
            { "_id": "2", "category": "Hair Care", "_base": "skinCare" },
            { "_id": "3", "category": "Oral Care" }
        ]));
        let analysis = analyze_products(&products);
        let missing: Vec<_> = analysis.missing_base.iter().map(|r| r.id()).collect();
        assert_eq!(missing, vec!["1", "3"]);
        let mismatched: Vec<_> = analysis
            .category_base_mismatches
            .iter()
            .map(|m| m.id.clone())
            .collect();
        assert_eq!(mismatched, vec!["2"]);
        assert!(mismatched.iter().all(|id| !missing.contains(id)));
    }

    #[test]
    fn test_mismatches_keep_input_order() {
        let products = records(json!([
            { "_id": "a", "category": "Skin Care", "_base": "hairCare" },
            { "_id": "b", "category": "Skin Care", "_base": "skinCare" },
            { "_id": "c", "category": "Home Care" },
            { "_id": "d", "category": "Beverages", "_base": "babyCare" },
            { "_id": "e", "category": "Stationary", "_base": "stationary" },
            { "_id": "f", "category": "Oral Care" },
            { "_id": "g", "category": "Home Care", "_base": "cleaningDisinfectant" },
            { "_id": "h", "category": "Kitchen & Food", "_base": "kitchen" },
            { "_id": "i", "category": "Personal Care", "_base": "skinCare" }
        ]));
        let analysis = analyze_products(&products);

        let mismatched: Vec<_> = analysis
            .category_base_mismatches
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(mismatched, vec!["a", "d", "g", "i"]);

        let missing: Vec<_> = analysis.missing_base.iter().map(|r| r.id()).collect();
        assert_eq!(missing, vec!["c", "f"]);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let products = sample();
        assert_eq!(analyze_products(&products), analyze_products(&products));
    }

    #[test]
    fn test_sorted_desc_breaks_ties_by_first_seen() {
        let mut tally = Tally::new();
        for key in ["b", "a", "c", "a", "c"] {
            tally.increment(key);
        }
        assert_eq!(tally.sorted_desc(), vec![("a", 2), ("c", 2), ("b", 1)]);
    }

    #[test]
    fn test_tally_serializes_as_ordered_map() {
        let mut tally = Tally::new();
        tally.increment("zeta");
        tally.increment("alpha");
        let json = serde_json::to_string(&tally).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":1}"#);
    }

    #[test]
    fn test_empty_input() {
        let analysis = analyze_products(&[]);
        assert!(analysis.category_counts.is_empty());
        assert!(analysis.base_counts.is_empty());
        assert!(analysis.category_base_mismatches.is_empty());
        assert!(analysis.missing_base.is_empty());
    }
}
