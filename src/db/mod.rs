mod read;
mod scan;
mod write;

pub use read::read_db;
pub use scan::find_packages;
pub use write::{remove_stale_tmp, write_db};

use crate::types::PkgMeta;

use std::collections::BTreeMap;

/// In-memory package cache of a repository database, keyed by package name
///
/// There is at most one entry per name. Entries are never modified in place,
/// a newer entry replaces the old one as a whole.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PkgCache {
    pkgs: BTreeMap<String, PkgMeta>,
}

impl PkgCache {
    pub fn new() -> Self {
        PkgCache {
            pkgs: BTreeMap::new(),
        }
    }

    /// `BTreeMap` doesn't preallocate, the hint only documents the expected size
    pub fn with_capacity(_capacity: usize) -> Self {
        Self::new()
    }

    /// Add a package, returning the entry it replaced, if any
    pub fn insert(&mut self, meta: PkgMeta) -> Option<PkgMeta> {
        self.pkgs.insert(meta.name.clone(), meta)
    }

    pub fn remove(&mut self, name: &str) -> Option<PkgMeta> {
        self.pkgs.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&PkgMeta> {
        self.pkgs.get(name)
    }

    pub fn len(&self) -> usize {
        self.pkgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pkgs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PkgMeta> {
        self.pkgs.values()
    }

    /// Copy of all entries, safe to walk while the cache is being modified
    pub fn snapshot(&self) -> Vec<PkgMeta> {
        self.pkgs.values().cloned().collect()
    }
}

impl FromIterator<PkgMeta> for PkgCache {
    fn from_iter<I: IntoIterator<Item = PkgMeta>>(iter: I) -> Self {
        let mut cache = PkgCache::new();
        for meta in iter {
            cache.insert(meta);
        }
        cache
    }
}
