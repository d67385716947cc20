/// Product catalog extraction
///
/// Pulls the `export const products = [ ... ];` literal out of a JavaScript
/// constants module and turns it into records. This is text surgery, not a
/// parser: it assumes one object per comma-terminated block, each starting
/// with an `_id` key, and no nested braces inside a record. A record holding a
/// nested object will split in the wrong place and usually fail to decode.

use std::io;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{debug, error, info, warn};
use regex::Regex;

use crate::core::record::Record;
use crate::utils::file_utils;

/// Default name of the dump written when the rebuilt JSON does not decode
pub const DIAGNOSTIC_FILE: &str = "problematic_json.json";

lazy_static! {
    static ref PRODUCTS_BLOCK: Regex =
        Regex::new(r"(?s)export\s+const\s+products\s*=\s*\[(.*?)\];").unwrap();
    static ref PRODUCT_ENTRY: Regex =
        Regex::new(r#"(?s)\{\s*["']?_id["']?\s*:.*?\}(?:,|\s*$)"#).unwrap();
}

/// Reasons extraction can come back empty
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Error reading file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not find products array in {}", path.display())]
    NotFound { path: PathBuf },

    /// `dump` is where the rebuilt text was saved, if saving worked
    #[error("Error parsing products JSON: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        dump: Option<PathBuf>,
    },
}

/// Extracts product records from a catalog source file
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    diagnostic_path: PathBuf,
}

impl Default for ProductExtractor {
    fn default() -> Self {
        Self::new(DIAGNOSTIC_FILE)
    }
}

impl ProductExtractor {
    /// Create an extractor that dumps undecodable JSON to `diagnostic_path`
    pub fn new<P: Into<PathBuf>>(diagnostic_path: P) -> Self {
        Self {
            diagnostic_path: diagnostic_path.into(),
        }
    }

    pub fn diagnostic_path(&self) -> &Path {
        &self.diagnostic_path
    }

    /// Extract records, reporting any failure on stdout and returning an
    /// empty list instead of an error.
    pub fn extract(&self, file_path: &Path) -> Vec<Record> {
        match self.try_extract(file_path) {
            Ok(records) => records,
            Err(e) => {
                info!("Extraction from {} failed: {}", file_path.display(), e);
                println!("{}", e);
                if let ExtractError::Decode { dump: Some(dump), .. } = &e {
                    println!("Saved problematic JSON to '{}'", dump.display());
                }
                Vec::new()
            }
        }
    }

    /// Extract records, returning the reason on failure.
    ///
    /// A decode failure still has a side effect: the rebuilt JSON text is
    /// written to the diagnostic path for manual inspection.
    pub fn try_extract(&self, file_path: &Path) -> Result<Vec<Record>, ExtractError> {
        info!("Extracting products from {}", file_path.display());

        let content = file_utils::read_file_content(file_path).map_err(|source| {
            ExtractError::Read {
                path: file_path.to_path_buf(),
                source,
            }
        })?;

        let block = find_products_block(&content).ok_or_else(|| ExtractError::NotFound {
            path: file_path.to_path_buf(),
        })?;

        let block = strip_comments(block);
        let entries = split_entries(&block);
        debug!("Found {} candidate product entries", entries.len());

        let tail = unsplit_tail(&block);
        if tail.contains("_id") {
            warn!(
                "Text after the last recognised product in {} still mentions _id and was skipped: {}",
                file_path.display(),
                tail.trim()
            );
        }

        let normalized: Vec<String> = entries.iter().map(|entry| normalize_entry(entry)).collect();
        let json_text = build_json_array(&normalized);

        match serde_json::from_str::<Vec<Record>>(&json_text) {
            Ok(records) => {
                info!("Decoded {} products", records.len());
                Ok(records)
            }
            Err(source) => {
                let dump = match file_utils::write_diagnostic_file(&self.diagnostic_path, &json_text) {
                    Ok(()) => Some(self.diagnostic_path.clone()),
                    Err(e) => {
                        error!(
                            "Could not save rebuilt JSON to {}: {}",
                            self.diagnostic_path.display(),
                            e
                        );
                        None
                    }
                };
                Err(ExtractError::Decode { source, dump })
            }
        }
    }
}

/// Extract records using the default diagnostic file location
pub fn extract_products(file_path: &Path) -> Vec<Record> {
    ProductExtractor::default().extract(file_path)
}

/// Locate the body of the `products` array, without the brackets.
pub fn find_products_block(content: &str) -> Option<&str> {
    PRODUCTS_BLOCK
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str())
}

/// Remove `//` and `/* */` comments that sit outside string literals.
///
/// The catalog carries marker comments between entries, and one after the
/// last entry would otherwise hide that entry from `split_entries`.
pub fn strip_comments(block: &str) -> String {
    let chars: Vec<char> = block.chars().collect();
    let mut out = String::with_capacity(block.len());
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(q) => {
                out.push(c);
                if c == '\\' {
                    if let Some(&next) = chars.get(i + 1) {
                        out.push(next);
                        i += 1;
                    }
                } else if c == q {
                    quote = None;
                }
            }
            None => match (c, chars.get(i + 1)) {
                ('/', Some('/')) => {
                    while i < chars.len() && chars[i] != '\n' {
                        i += 1;
                    }
                    continue;
                }
                ('/', Some('*')) => {
                    i += 2;
                    while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                        i += 1;
                    }
                    i += 2;
                    continue;
                }
                ('"', _) | ('\'', _) | ('`', _) => {
                    quote = Some(c);
                    out.push(c);
                }
                _ => out.push(c),
            },
        }
        i += 1;
    }

    out
}

/// Split the array body into per-product object texts.
///
/// Each piece runs from an opening `{` followed by `_id:` to the first `},`.
/// The last object in the array usually lacks the comma, so a closing brace at
/// the very end of the body is accepted too.
pub fn split_entries(block: &str) -> Vec<&str> {
    PRODUCT_ENTRY.find_iter(block).map(|m| m.as_str()).collect()
}

/// Text after the last entry `split_entries` recognised
pub fn unsplit_tail(block: &str) -> &str {
    let covered = PRODUCT_ENTRY.find_iter(block).last().map(|m| m.end()).unwrap_or(0);
    &block[covered..]
}

/// Rewrite one JavaScript object literal toward strict JSON.
///
/// Single-quoted strings become double-quoted, bare keys get quoted, and
/// commas directly before `}` or `]` are dropped. String contents are never
/// touched, so `"Pack of 2, Size: 500ml"` survives intact.
pub fn normalize_entry(entry: &str) -> String {
    let text = to_json_text(entry);
    let text = text.trim_end();
    text.strip_suffix(',').unwrap_or(text).trim_end().to_string()
}

/// Join normalized entries into a JSON array literal
pub fn build_json_array(entries: &[String]) -> String {
    format!("[{}]", entries.join(","))
}

#[derive(Clone, Copy, PartialEq)]
enum QuoteState {
    Code,
    Double,
    Single,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// First non-whitespace character at or after `from`
fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars.iter().skip(from).copied().find(|c| !c.is_whitespace())
}

fn to_json_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut state = QuoteState::Code;
    // a key may follow `{`, `,` or the start of the entry
    let mut expect_key = true;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match state {
            QuoteState::Code => match c {
                '"' => {
                    state = QuoteState::Double;
                    expect_key = false;
                    out.push(c);
                }
                '\'' => {
                    state = QuoteState::Single;
                    expect_key = false;
                    out.push('"');
                }
                ',' => {
                    let closes = matches!(next_significant(&chars, i + 1), Some('}') | Some(']'));
                    if !closes {
                        out.push(c);
                    }
                    expect_key = true;
                }
                '{' => {
                    expect_key = true;
                    out.push(c);
                }
                _ if expect_key && is_ident_start(c) => {
                    let start = i;
                    while i + 1 < chars.len() && is_ident_char(chars[i + 1]) {
                        i += 1;
                    }
                    let ident: String = chars[start..=i].iter().collect();
                    if next_significant(&chars, i + 1) == Some(':') {
                        out.push('"');
                        out.push_str(&ident);
                        out.push('"');
                    } else {
                        out.push_str(&ident);
                    }
                    expect_key = false;
                }
                _ => {
                    if !c.is_whitespace() {
                        expect_key = false;
                    }
                    out.push(c);
                }
            },
            QuoteState::Double => match c {
                '\\' => {
                    out.push(c);
                    if let Some(&next) = chars.get(i + 1) {
                        out.push(next);
                        i += 1;
                    }
                }
                '"' => {
                    state = QuoteState::Code;
                    out.push(c);
                }
                _ => out.push(c),
            },
            QuoteState::Single => match c {
                '\\' => {
                    match chars.get(i + 1) {
                        // \' is not a valid JSON escape
                        Some('\'') => out.push('\''),
                        Some(&next) => {
                            out.push('\\');
                            out.push(next);
                        }
                        None => out.push('\\'),
                    }
                    i += 1;
                }
                '"' => out.push_str("\\\""),
                '\'' => {
                    state = QuoteState::Code;
                    out.push('"');
                }
                _ => out.push(c),
            },
        }
        i += 1;
    }

    out
}
