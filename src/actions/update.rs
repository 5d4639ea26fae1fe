use super::verify::verify_pkg;
use crate::{
    config::Repo,
    db::{find_packages, read_db, write_db, PkgCache},
    debug, info, msg, success,
    types::vercmp,
    utils::{lock::RepoLock, pkginfo::load_pkg},
    warn,
};

use anyhow::{Context, Result};
use console::style;
use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

/// What an update did to the database
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// `name-version` of new packages
    pub added: Vec<String>,
    /// `name-version` of packages replacing an older version
    pub updated: Vec<String>,
    /// `name-version` of packages whose file disappeared
    pub removed: Vec<String>,
    /// Package files deleted because of `clean`
    pub deleted: Vec<PathBuf>,
    /// Files that looked like packages but couldn't be read
    pub skipped: Vec<PathBuf>,
    /// Whether a new database has been written
    pub written: bool,
}

fn delete_pkg_file(path: &Path, report: &mut UpdateReport) {
    debug!("Deleting {}", path.display());
    match std::fs::remove_file(path) {
        Ok(()) => report.deleted.push(path.to_owned()),
        Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
    }
}

/// Directory holding the database, which FILENAME entries are relative to
fn db_dir(repo: &Repo) -> Result<PathBuf> {
    let dir = match repo.path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    dir.canonicalize()
        .context(format!("Failed to access {}", dir.display()))
}

fn in_db_dir(path: &Path, db_dir: &Path) -> bool {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    matches!(parent.canonicalize(), Ok(parent) if parent == db_dir)
}

/// Synchronize the database with the package files found under `paths`
///
/// Packages whose file no longer exists are dropped, new packages are added
/// and newer versions replace older ones. With `clean`, package files of
/// superseded versions are deleted from disk.
///
/// The database only stores the file name of a package, so packages outside
/// the database's directory are skipped instead of added.
pub fn update_db<P: AsRef<Path>>(repo: &Repo, paths: &[P], clean: bool) -> Result<UpdateReport> {
    let _lock = RepoLock::acquire(&repo.path)?;
    let mut report = UpdateReport::default();
    let mut dirty = false;

    // Read the existing repo or construct a new package cache
    let mut cache = if !repo.exists() {
        warn!("repo doesn't exist, creating...");
        dirty = true;
        PkgCache::with_capacity(23)
    } else {
        info!("Reading existing database...");
        let mut cache = read_db(&repo.path)?;
        for meta in cache.snapshot() {
            if !verify_pkg(&meta, false).is_empty() {
                msg!(&style("REMOVING").red().to_string(), "{}", meta.full_name());
                cache.remove(&meta.name);
                report.removed.push(meta.full_name());
                dirty = true;
            }
        }
        cache
    };

    if !paths.is_empty() {
        info!("Scanning for new packages...");
        let repo_dir = db_dir(repo)?;
        for path in find_packages(paths)? {
            let meta = match load_pkg(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    report.skipped.push(path);
                    continue;
                }
            };

            let order = cache
                .get(&meta.name)
                .map(|old| vercmp(&meta.version, &old.version));
            let replaces = matches!(order, None | Some(Ordering::Greater));
            if replaces && !in_db_dir(&path, &repo_dir) {
                warn!(
                    "Skipping {}: not in {}, move it next to the database",
                    path.display(),
                    repo_dir.display()
                );
                report.skipped.push(path);
                continue;
            }
            match order {
                None => {
                    msg!(&style("ADDING").green().to_string(), "{}", meta.full_name());
                    report.added.push(meta.full_name());
                    cache.insert(meta);
                    dirty = true;
                }
                Some(Ordering::Greater) => {
                    msg!(&style("UPDATING").cyan().to_string(), "{}", meta.full_name());
                    if let Some(old) = cache.remove(&meta.name) {
                        if clean {
                            delete_pkg_file(&old.filename, &mut report);
                        }
                    }
                    report.updated.push(meta.full_name());
                    cache.insert(meta);
                    dirty = true;
                }
                Some(Ordering::Less) => {
                    // Superseded by what's in the database
                    if clean {
                        delete_pkg_file(&meta.filename, &mut report);
                    }
                }
                Some(Ordering::Equal) => (),
            }
        }
    }

    if dirty {
        info!("Writing database to disk...");
        write_db(&cache, &repo.path)?;
        success!("repo {} updated successfully", repo.path.display());
        report.written = true;
    } else {
        info!("repo {} does not need updating", repo.path.display());
    }

    Ok(report)
}

/// Point `<name>.db` to the database
#[cfg(unix)]
pub fn link_db(repo: &Repo) -> Result<()> {
    let target = match repo.path.file_name() {
        Some(name) => PathBuf::from(name),
        None => return Ok(()),
    };

    match std::fs::symlink_metadata(&repo.link) {
        Ok(m) if m.file_type().is_symlink() => {
            if std::fs::read_link(&repo.link)? == target {
                return Ok(());
            }
            std::fs::remove_file(&repo.link)
                .context(format!("Failed to replace {}", repo.link.display()))?;
        }
        Ok(_) => {
            warn!("{} exists and is not a symlink, leaving it alone", repo.link.display());
            return Ok(());
        }
        Err(_) => (),
    }

    std::os::unix::fs::symlink(&target, &repo.link)
        .context(format!("Failed to link {}", repo.link.display()))?;
    Ok(())
}

#[cfg(not(unix))]
pub fn link_db(_repo: &Repo) -> Result<()> {
    Ok(())
}
