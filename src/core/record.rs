/// Product records as extracted from the catalog source
///
/// A record keeps every field the source carried. Only the handful of fields
/// the audit reads get typed accessors, and those substitute sentinel values
/// for absent fields so callers never branch on missing data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel for a record without a `category` field
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Sentinel for a record without a `_base` field
pub const MISSING_BASE: &str = "Missing";

/// One product entry from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Wrap an already decoded JSON object
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The `_id` field, or "Unknown"
    pub fn id(&self) -> String {
        self.text_or("_id", "Unknown")
    }

    /// The `name` field, or "Unknown"
    pub fn name(&self) -> String {
        self.text_or("name", "Unknown")
    }

    /// The display `category`, or the `Unknown` sentinel
    pub fn category(&self) -> String {
        self.text_or("category", UNKNOWN_CATEGORY)
    }

    /// The normalized `_base` key, or the `Missing` sentinel
    pub fn base(&self) -> String {
        self.text_or("_base", MISSING_BASE)
    }

    /// Raw access to any field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    // null is treated the same as an absent key
    fn text_or(&self, key: &str, default: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => default.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}
