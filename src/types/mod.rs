mod checksum;
mod version;

pub use checksum::Checksum;
pub use version::vercmp;

use std::path::{Path, PathBuf};

/// Metadata of one package in the repository database
///
/// A `PkgMeta` is never modified after construction. Newer metadata for the
/// same package replaces the whole value in the cache.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PkgMeta {
    pub name: String,
    pub version: String,
    /// Path of the package file backing this entry
    pub filename: PathBuf,
    pub description: String,
    pub url: String,
    pub packager: String,
    pub arch: String,
    /// Size of the package file
    pub csize: u64,
    /// Size after installation
    pub isize: u64,
    pub md5sum: String,
    pub sha256sum: String,
    pub builddate: i64,
    pub licenses: Vec<String>,
    pub depends: Vec<String>,
    pub conflicts: Vec<String>,
    pub provides: Vec<String>,
    pub optdepends: Vec<String>,
    pub makedepends: Vec<String>,
}

impl PkgMeta {
    /// `name-version`, also the directory of this package inside the db
    pub fn full_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Base name of the package file, as stored in the FILENAME field
    pub fn file_basename(&self) -> String {
        basename(&self.filename)
    }
}

fn basename(p: &Path) -> String {
    match p.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => p.to_string_lossy().into_owned(),
    }
}
