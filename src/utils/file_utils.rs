/// File handling utilities
///
/// This module provides the small amount of file I/O the audit needs: reading
/// the catalog source as text and dumping diagnostic artifacts.

use std::fs;
use std::io;
use std::path::Path;
use log::{debug, warn};

/// Read the content of a text file.
///
/// Fails on a missing file, a permission problem, or content that is not
/// valid UTF-8 (reported by the standard library as `InvalidData`).
///
/// # Arguments
///
/// * `file_path` - Path to the file
///
/// # Returns
///
/// The file content as a string
pub fn read_file_content(file_path: &Path) -> io::Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => {
            debug!("Read {} bytes from {}", content.len(), file_path.display());
            Ok(content)
        }
        Err(e) => {
            if e.kind() == io::ErrorKind::InvalidData {
                warn!("{} is not valid UTF-8 text", file_path.display());
            }
            Err(e)
        }
    }
}

/// Write a diagnostic artifact, replacing any previous one at that path.
pub fn write_diagnostic_file(output_path: &Path, contents: &str) -> io::Result<()> {
    fs::write(output_path, contents)?;
    debug!("Wrote {} bytes to {}", contents.len(), output_path.display());
    Ok(())
}
