use crate::warn;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

lazy_static! {
    // Same as the `*.pkg.tar*` glob, ignoring case
    static ref PKG_FILENAME: Regex = Regex::new(r"(?i)^.*\.pkg\.tar.*$").unwrap();
}

fn is_package_filename(name: &OsStr) -> bool {
    PKG_FILENAME.is_match(&name.to_string_lossy())
}

/// Find all package files under the given paths, following symlinks
///
/// Fails only if one of the paths can't be accessed at all. Errors deeper in
/// the tree are reported and skipped.
pub fn find_packages<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>> {
    let mut pkgs = Vec::new();
    for root in paths {
        let root = root.as_ref();
        std::fs::metadata(root).context(format!("Failed to scan {}", root.display()))?;

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping {}", err);
                    continue;
                }
            };
            if entry.file_type().is_file() && is_package_filename(entry.file_name()) {
                pkgs.push(entry.into_path());
            }
        }
    }

    Ok(pkgs)
}
