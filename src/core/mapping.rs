/// Category to `_base` mapping
///
/// Each display category in the catalog routes to a category page through a
/// normalized `_base` key. This table is the single source of truth for what
/// that key should be.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Display category name and its expected `_base` key, in report order.
pub const CATEGORY_MAPPINGS: [(&str, &str); 9] = [
    ("Beverages", "beverages"),
    ("Baby Care", "babyCare"),
    ("Hair Care", "hairCare"),
    ("Personal Care", "personalCare"),
    ("Skin Care", "skinCare"),
    ("Home Care", "homeCare"),
    ("Oral Care", "oralCare"),
    ("Cleaning & Disinfectants", "cleaningDisinfectant"),
    ("Stationary", "stationary"),
];

lazy_static! {
    /// Lookup table built once from `CATEGORY_MAPPINGS`
    static ref CATEGORY_LOOKUP: HashMap<&'static str, &'static str> =
        CATEGORY_MAPPINGS.iter().copied().collect();
}

/// Get the `_base` key a product in `category` is expected to carry.
///
/// Returns `None` for categories the mapping does not know about.
pub fn expected_base(category: &str) -> Option<&'static str> {
    CATEGORY_LOOKUP.get(category).copied()
}

/// Iterate the mapping in its declared order
pub fn mappings() -> impl Iterator<Item = (&'static str, &'static str)> {
    CATEGORY_MAPPINGS.iter().copied()
}
