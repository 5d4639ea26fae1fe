use crate::{debug, warn};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsString,
    fs,
    io::{self, prelude::*},
    path::{Path, PathBuf},
};

/// Make sure only one instance of repoman updates a database at one time

#[derive(Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
}

/// Lock file of a database, like `repo.db.tar.gz.lck`
pub fn lock_path(db: &Path) -> PathBuf {
    let mut path = OsString::from(db.as_os_str());
    path.push(".lck");
    PathBuf::from(path)
}

/// Holds the lock of a database until dropped
#[derive(Debug)]
pub struct RepoLock {
    db: PathBuf,
}

impl RepoLock {
    pub fn acquire(db: &Path) -> Result<Self> {
        let lock_path = lock_path(db);
        let lock_info = LockInfo {
            pid: std::process::id(),
        };
        let lock_content = toml::to_string(&lock_info)?;

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => match check(db)? {
                Some(pid) => bail!(
                    "Another instance of repoman is updating {} at PID {}. If it is no longer running, remove {}",
                    db.display(),
                    pid,
                    lock_path.display()
                ),
                None => bail!("Cannot lock because {} already exists", lock_path.display()),
            },
            Err(e) => {
                return Err(e).context(format!("Failed to create lock file {}", lock_path.display()))
            }
        };
        let lock = RepoLock { db: db.to_owned() };
        file.write_all(lock_content.as_bytes())
            .context("Failed to write lock content")?;
        debug!("Locked {}", db.display());

        Ok(lock)
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        if let Err(e) = unlock(&self.db) {
            warn!("{}", e);
        }
    }
}

/// PID of the process holding the lock of `db`, if any
pub fn check(db: &Path) -> Result<Option<u32>> {
    let lock_path = lock_path(db);
    if lock_path.is_file() {
        let lock_content = fs::read_to_string(&lock_path).context("Failed to read lock file")?;
        match toml::from_str::<LockInfo>(&lock_content) {
            Ok(lock_info) => Ok(Some(lock_info.pid)),
            // The owner may not have written its PID yet
            Err(_) => Ok(None),
        }
    } else {
        Ok(None)
    }
}

pub fn unlock(db: &Path) -> Result<()> {
    let lock_path = lock_path(db);
    if lock_path.is_file() {
        fs::remove_file(&lock_path).context("Failed to delete lock file")?;
    } else {
        debug!("Attempt to unlock, but lock file doesn't exist");
    }
    Ok(())
}
