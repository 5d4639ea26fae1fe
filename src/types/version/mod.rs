mod ord;
mod parse;

use parse::parse_version;

use std::cmp::Ordering;
use std::fmt;

/// pacman style package version: `[epoch:]version[-release]`
#[derive(Clone, Debug)]
pub struct PkgVersion {
    pub epoch: String,
    pub version: String,
    pub release: Option<String>,
}

impl From<&str> for PkgVersion {
    fn from(s: &str) -> Self {
        parse_version(s)
    }
}

impl fmt::Display for PkgVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.epoch != "0" {
            write!(f, "{}:", self.epoch)?;
        }
        f.write_str(&self.version)?;
        if let Some(release) = &self.release {
            write!(f, "-{}", release)?;
        }
        Ok(())
    }
}

/// Compare two version strings the way pacman does
///
/// Returns `Greater` if `a` is newer than `b`.
pub fn vercmp(a: &str, b: &str) -> Ordering {
    // Identical strings never need parsing
    if a == b {
        return Ordering::Equal;
    }
    PkgVersion::from(a).cmp(&PkgVersion::from(b))
}
