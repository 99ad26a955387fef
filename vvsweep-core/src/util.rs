//! Contains a collection of useful utility functions.

use std::ffi::OsStr;
use std::fs::{read, read_dir};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::Result;

/// Create a static deser object from given path using serde.
///
/// Format is selected based on the file extension.
pub fn deser_struct_from_path<T>(file_path: &Path) -> Result<T>
where
    for<'de> T: serde::Deserialize<'de>,
{
    let bytes = read(file_path)?;
    let ext = file_path
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or_default();
    let d: T = match ext {
        "toml" => toml::from_slice(&bytes)?,
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yaml::from_slice(&bytes)?,
        _ => {
            return Err(Error::UnsupportedConfigFormat(
                file_path.to_string_lossy().to_string(),
            ))
        }
    };
    Ok(d)
}

/// Get paths to files in the provided directory whose names start with
/// `prefix` and end with `suffix`.
///
/// Not recursive. Returned paths are sorted by file name.
pub fn find_files_matching(dir: &Path, prefix: &str, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(OsStr::to_str) {
            Some(n) => n,
            None => {
                debug!("skipping non-utf8 file name: {}", path.to_string_lossy());
                continue;
            }
        };
        if name.len() >= prefix.len() + suffix.len()
            && name.starts_with(prefix)
            && name.ends_with(suffix)
        {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Replaces every `{index}` placeholder in the given template.
pub fn expand_index(template: &str, index: u32) -> String {
    template.replace(crate::INDEX_PLACEHOLDER, &index.to_string())
}
