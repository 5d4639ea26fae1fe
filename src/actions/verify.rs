use super::{RepoError, VerifyError};
use crate::{config::Repo, db::read_db, error, success, types::Checksum, types::PkgMeta};

use anyhow::Result;

/// Check a single package against its backing file
///
/// Without `deep`, only the existence of the file is checked.
pub fn verify_pkg(meta: &PkgMeta, deep: bool) -> Vec<VerifyError> {
    let name = meta.name.clone();
    let path = meta.filename.clone();
    if !path.exists() {
        return vec![VerifyError::Missing { name, path }];
    }
    if !deep {
        return Vec::new();
    }

    let (md5sum, sha256sum) = match Checksum::compute_file(&path) {
        Ok(res) => res,
        Err(e) => {
            return vec![VerifyError::Unreadable {
                name,
                path,
                reason: format!("{e:#}"),
            }]
        }
    };
    let mut res = Vec::new();
    if !md5sum.matches_str(&meta.md5sum) {
        res.push(VerifyError::Md5Mismatch {
            name: name.clone(),
            path: path.clone(),
        });
    }
    if !sha256sum.matches_str(&meta.sha256sum) {
        res.push(VerifyError::Sha256Mismatch { name, path });
    }
    res
}

/// Check every package in the database, returning all problems found
pub fn verify_db(repo: &Repo) -> Result<Vec<VerifyError>> {
    if !repo.exists() {
        return Err(RepoError::NoDatabase(repo.path.clone()).into());
    }
    let cache = read_db(&repo.path)?;

    let mut failures = Vec::new();
    for meta in cache.iter() {
        for failure in verify_pkg(meta, true) {
            error!("{}", failure);
            failures.push(failure);
        }
    }

    if failures.is_empty() {
        success!("repo okay!");
    }
    Ok(failures)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{actions::update_db, testutil};
    use std::fs;

    #[test]
    fn good_repo() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repo::in_dir(dir.path(), "test");
        testutil::make_pkg(dir.path(), "foo", "1.0-1");
        testutil::make_pkg(dir.path(), "bar", "2.0-1");
        update_db(&repo, &[dir.path()], false).unwrap();

        assert_eq!(verify_db(&repo).unwrap(), vec![]);
    }

    #[test]
    fn no_database() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repo::in_dir(dir.path(), "test");
        let err = verify_db(&repo).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RepoError>(),
            Some(&RepoError::NoDatabase(repo.path.clone()))
        );
    }

    #[test]
    fn report_all_problems() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repo::in_dir(dir.path(), "test");
        let foo = testutil::make_pkg(dir.path(), "foo", "1.0-1");
        let bar = testutil::make_pkg(dir.path(), "bar", "2.0-1");
        let baz = testutil::make_pkg(dir.path(), "baz", "3.0-1");
        update_db(&repo, &[dir.path()], false).unwrap();

        // Changed behind our back
        fs::write(&foo, b"tampered").unwrap();
        fs::remove_file(&bar).unwrap();

        let mut failures = verify_db(&repo).unwrap();
        failures.sort_by_key(|f| f.to_string());
        let mut expected = vec![
            VerifyError::Missing {
                name: "bar".to_string(),
                path: bar,
            },
            VerifyError::Md5Mismatch {
                name: "foo".to_string(),
                path: foo.clone(),
            },
            VerifyError::Sha256Mismatch {
                name: "foo".to_string(),
                path: foo,
            },
        ];
        expected.sort_by_key(|f| f.to_string());
        assert_eq!(failures, expected);
        assert!(verify_pkg(read_db(&repo.path).unwrap().get("baz").unwrap(), true).is_empty());
        assert!(baz.exists());
    }

    #[test]
    fn shallow() {
        let dir = tempfile::tempdir().unwrap();
        let path = testutil::make_pkg(dir.path(), "foo", "1.0-1");
        let meta = PkgMeta {
            name: "foo".to_string(),
            version: "1.0-1".to_string(),
            filename: path.clone(),
            md5sum: "wrong".to_string(),
            ..Default::default()
        };
        assert!(verify_pkg(&meta, false).is_empty());
        assert_eq!(verify_pkg(&meta, true).len(), 2);

        fs::remove_file(&path).unwrap();
        assert_eq!(
            verify_pkg(&meta, false),
            vec![VerifyError::Missing {
                name: "foo".to_string(),
                path
            }]
        );
    }
}
