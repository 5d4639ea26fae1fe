/// The pacman repository db reader
use super::PkgCache;
use crate::{debug, types::PkgMeta, utils::pacparse};

use anyhow::{bail, format_err, Context, Result};
use flate2::read::GzDecoder;
use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::Read,
    path::Path,
    str::FromStr,
};
use tar::Archive;

type Fields = HashMap<String, Vec<String>>;

/// Read a repository database into a package cache
///
/// FILENAME of each package is resolved against the directory holding the db.
pub fn read_db(db: &Path) -> Result<PkgCache> {
    let f = File::open(db).context(format!("Failed to open database {}", db.display()))?;
    let gzipdecoder = GzDecoder::new(f);
    let mut tar = Archive::new(gzipdecoder);
    let pkg_root = db.parent().unwrap_or_else(|| Path::new(""));

    // Both desc and depends of a package live in the same directory
    let mut dirs: BTreeMap<String, Fields> = BTreeMap::new();
    for file in tar
        .entries()
        .context(format!("Failed to read database {}", db.display()))?
    {
        let mut file = file?;
        if !file.header().entry_type().is_file() {
            continue;
        }
        let path = file.path()?.into_owned();
        let dir = match path.parent() {
            Some(dir) => dir.to_string_lossy().into_owned(),
            None => continue,
        };
        match path.file_name().and_then(|n| n.to_str()) {
            Some("desc") | Some("depends") => {
                let mut content = String::new();
                file.read_to_string(&mut content)?;
                let fields = pacparse::parse_str(&content)
                    .context(format!("Failed to parse {} in {}", path.display(), db.display()))?;
                dirs.entry(dir).or_default().extend(fields);
            }
            _ => debug!("Ignoring {} in database", path.display()),
        }
    }

    let mut cache = PkgCache::with_capacity(dirs.len());
    for (dir, fields) in dirs {
        let meta = fields_to_pkgmeta(fields, pkg_root)
            .context(format!("Bad entry {dir} in database {}", db.display()))?;
        cache.insert(meta);
    }
    Ok(cache)
}

fn fields_to_pkgmeta(mut f: Fields, pkg_root: &Path) -> Result<PkgMeta> {
    // Get name first, for error reporting
    let name = get_first_or_complain("NAME", &mut f)
        .map_err(|e| format_err!("bad metadata: NAME missing ({e})"))?;
    let version = get_first_or_complain("VERSION", &mut f)
        .map_err(|e| format_err!("bad metadata for {name}: {e}"))?;
    let filename = get_first_or_default("FILENAME", &mut f)?;

    Ok(PkgMeta {
        filename: pkg_root.join(filename),
        description: get_first_or_default("DESC", &mut f)?,
        url: get_first_or_default("URL", &mut f)?,
        packager: get_first_or_default("PACKAGER", &mut f)?,
        arch: get_first_or_default("ARCH", &mut f)?,
        csize: get_number("CSIZE", &mut f).map_err(|e| format_err!("bad metadata for {name}: {e}"))?,
        isize: get_number("ISIZE", &mut f).map_err(|e| format_err!("bad metadata for {name}: {e}"))?,
        md5sum: get_first_or_default("MD5SUM", &mut f)?,
        sha256sum: get_first_or_default("SHA256SUM", &mut f)?,
        builddate: get_number("BUILDDATE", &mut f)
            .map_err(|e| format_err!("bad metadata for {name}: {e}"))?,
        licenses: f.remove("LICENSE").unwrap_or_default(),
        depends: f.remove("DEPENDS").unwrap_or_default(),
        conflicts: f.remove("CONFLICTS").unwrap_or_default(),
        provides: f.remove("PROVIDES").unwrap_or_default(),
        optdepends: f.remove("OPTDEPENDS").unwrap_or_default(),
        makedepends: f.remove("MAKEDEPENDS").unwrap_or_default(),
        name,
        version,
    })
}

fn get_first_or_complain(name: &str, f: &mut Fields) -> Result<String> {
    if let Some(mut values) = f.remove(name) {
        if values.len() == 1 {
            Ok(values.remove(0))
        } else {
            bail!("expect 1 value for {name}, found {}", values.len())
        }
    } else {
        bail!("field {name} not found")
    }
}

/// Same as `get_first_or_complain`, but a missing or empty field is fine
fn get_first_or_default(name: &str, f: &mut Fields) -> Result<String> {
    match f.get(name) {
        Some(values) if !values.is_empty() => get_first_or_complain(name, f),
        _ => Ok(String::new()),
    }
}

fn get_number<T>(name: &str, f: &mut Fields) -> Result<T>
where
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    let value = get_first_or_default(name, f)?;
    if value.is_empty() {
        return Ok(T::default());
    }
    value
        .parse()
        .map_err(|e| format_err!("invalid {name} {value}: {e}"))
}
