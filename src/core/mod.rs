/// Core module for the catalog audit
///
/// This module contains the extraction of product records from the catalog
/// source, the category mapping, and the consistency analysis.

pub mod analyzer;
pub mod extractor;
pub mod mapping;
pub mod record;
