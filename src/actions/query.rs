use super::RepoError;
use crate::{config::Repo, db::read_db, types::PkgMeta};

use anyhow::Result;
use console::style;

/// Look up packages in the database
///
/// With no names, every package is returned. Otherwise the packages are
/// returned in the order asked, failing on the first name not in the database.
pub fn query_db(repo: &Repo, names: &[String]) -> Result<Vec<PkgMeta>> {
    if !repo.exists() {
        return Err(RepoError::NoDatabase(repo.path.clone()).into());
    }
    let cache = read_db(&repo.path)?;

    if names.is_empty() {
        return Ok(cache.snapshot());
    }
    let mut res = Vec::with_capacity(names.len());
    for name in names {
        match cache.get(name) {
            Some(meta) => res.push(meta.clone()),
            None => return Err(RepoError::NotFound(name.clone()).into()),
        }
    }
    Ok(res)
}

pub fn format_pkg(meta: &PkgMeta) -> String {
    let mut res = String::new();
    let mut field = |key: &str, value: &str| {
        res.push_str(&format!("{}: {}\n", style(format!("{key:<13}")).bold(), value));
    };
    field("Filename", &meta.filename.to_string_lossy());
    field("Name", &meta.name);
    field("Version", &meta.version);
    field("Description", &meta.description);
    field("Architecture", &meta.arch);
    field("URL", &meta.url);
    field("Packager", &meta.packager);
    res
}

pub fn print_pkg(meta: &PkgMeta) {
    println!("{}", format_pkg(meta));
}
