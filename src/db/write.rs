use super::PkgCache;
use crate::{debug, types::PkgMeta, utils::pacparse};

use anyhow::{Context, Result};
use flate2::{write::GzEncoder, Compression};
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use tar::{Builder, EntryType, Header};

const TMP_PREFIX: &str = ".repoman-";
const TMP_SUFFIX: &str = ".tmp";

/// Generate the content of the `desc` file of a package
pub fn desc_file(meta: &PkgMeta) -> String {
    let mut buf = String::with_capacity(512);
    pacparse::write_string(&mut buf, "FILENAME", &meta.file_basename());
    pacparse::write_string(&mut buf, "NAME", &meta.name);
    pacparse::write_string(&mut buf, "VERSION", &meta.version);
    pacparse::write_string(&mut buf, "DESC", &meta.description);
    pacparse::write_int(&mut buf, "CSIZE", meta.csize);
    pacparse::write_int(&mut buf, "ISIZE", meta.isize);
    pacparse::write_string(&mut buf, "MD5SUM", &meta.md5sum);
    pacparse::write_string(&mut buf, "SHA256SUM", &meta.sha256sum);
    pacparse::write_string(&mut buf, "URL", &meta.url);
    pacparse::write_list(&mut buf, "LICENSE", &meta.licenses);
    pacparse::write_string(&mut buf, "ARCH", &meta.arch);
    pacparse::write_int(&mut buf, "BUILDDATE", meta.builddate);
    pacparse::write_string(&mut buf, "PACKAGER", &meta.packager);
    buf
}

/// Generate the content of the `depends` file of a package
pub fn depends_file(meta: &PkgMeta) -> String {
    let mut buf = String::with_capacity(512);
    pacparse::write_list(&mut buf, "DEPENDS", &meta.depends);
    pacparse::write_list(&mut buf, "CONFLICTS", &meta.conflicts);
    pacparse::write_list(&mut buf, "PROVIDES", &meta.provides);
    pacparse::write_list(&mut buf, "OPTDEPENDS", &meta.optdepends);
    pacparse::write_list(&mut buf, "MAKEDEPENDS", &meta.makedepends);
    buf
}

fn append_file<W: Write>(tar: &mut Builder<W>, path: &str, content: &str, now: u64) -> Result<()> {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(now);
    if let Some(gnu) = header.as_gnu_mut() {
        gnu.set_atime(now);
        gnu.set_ctime(now);
    }
    tar.append_data(&mut header, path, content.as_bytes())
        .context(format!("Failed to add {path} to database"))?;
    Ok(())
}

/// Write all packages in the cache into a new database at `db`
///
/// The database is assembled in a temporary file next to `db` and renamed
/// over it once complete, so `db` is either the old or the new database.
pub fn write_db(cache: &PkgCache, db: &Path) -> Result<()> {
    let dir = db_parent(db);
    let tmp = tempfile::Builder::new()
        .prefix(TMP_PREFIX)
        .suffix(TMP_SUFFIX)
        .tempfile_in(dir)
        .context(format!("Failed to create temporary file in {}", dir.display()))?;
    debug!("Writing database to {}", tmp.path().display());

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let encoder = GzEncoder::new(tmp, Compression::default());
    let mut tar = Builder::new(encoder);
    for meta in cache.iter() {
        let dirname = meta.full_name();
        append_file(&mut tar, &format!("{dirname}/desc"), &desc_file(meta), now)?;
        append_file(&mut tar, &format!("{dirname}/depends"), &depends_file(meta), now)?;
    }
    let tmp = tar
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .context("Failed to finish database")?;
    tmp.as_file()
        .sync_all()
        .context("Failed to flush database to disk")?;
    set_permissions(tmp.as_file())?;

    tmp.persist(db)
        .map_err(|e| e.error)
        .context(format!("Failed to move new database into {}", db.display()))?;
    // Make the rename itself durable
    if let Ok(dir) = File::open(dir) {
        dir.sync_all().ok();
    }

    Ok(())
}

fn db_parent(db: &Path) -> &Path {
    match db.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Delete unfinished databases left next to `db` by an interrupted write
///
/// Only call this while holding the lock of `db`.
pub fn remove_stale_tmp(db: &Path) -> Result<Vec<PathBuf>> {
    let dir = db_parent(db);
    let mut removed = Vec::new();
    for entry in std::fs::read_dir(dir).context(format!("Failed to list {}", dir.display()))? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(TMP_PREFIX) && name.ends_with(TMP_SUFFIX) && entry.file_type()?.is_file() {
            let path = entry.path();
            std::fs::remove_file(&path)
                .context(format!("Failed to delete {}", path.display()))?;
            debug!("Removed unfinished database {}", path.display());
            removed.push(path);
        }
    }
    Ok(removed)
}

#[cfg(unix)]
fn set_permissions(f: &File) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    // tempfile creates files with 0600, a database should be world readable
    f.set_permissions(std::fs::Permissions::from_mode(0o644))
        .context("Failed to set permissions of database")?;
    Ok(())
}

#[cfg(not(unix))]
fn set_permissions(_f: &File) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::read_db;
    use flate2::read::GzDecoder;
    use std::{io::Read, path::PathBuf};
    use tar::Archive;

    fn sample(name: &str, version: &str, dir: &Path) -> PkgMeta {
        PkgMeta {
            name: name.to_string(),
            version: version.to_string(),
            filename: dir.join(format!("{name}-{version}-x86_64.pkg.tar.zst")),
            description: format!("The {name} package"),
            url: "https://example.org".to_string(),
            packager: "Someone <someone@example.org>".to_string(),
            arch: "x86_64".to_string(),
            csize: 1234,
            isize: 56789,
            md5sum: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
            sha256sum: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
                .to_string(),
            builddate: 1672531200,
            licenses: vec!["MIT".to_string()],
            depends: vec!["glibc".to_string(), "bar>=1.0".to_string()],
            conflicts: vec![],
            provides: vec!["libfoo.so=1-64".to_string()],
            optdepends: vec!["baz: for extra stuff".to_string()],
            makedepends: vec![],
        }
    }

    #[test]
    fn desc_format() {
        let meta = sample("foo", "1.0-1", Path::new("/srv/repo/x86_64"));
        assert_eq!(
            desc_file(&meta),
            "%FILENAME%\nfoo-1.0-1-x86_64.pkg.tar.zst\n\n\
             %NAME%\nfoo\n\n\
             %VERSION%\n1.0-1\n\n\
             %DESC%\nThe foo package\n\n\
             %CSIZE%\n1234\n\n\
             %ISIZE%\n56789\n\n\
             %MD5SUM%\nd41d8cd98f00b204e9800998ecf8427e\n\n\
             %SHA256SUM%\ne3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\n\n\
             %URL%\nhttps://example.org\n\n\
             %LICENSE%\nMIT\n\n\
             %ARCH%\nx86_64\n\n\
             %BUILDDATE%\n1672531200\n\n\
             %PACKAGER%\nSomeone <someone@example.org>\n\n"
        );
    }

    #[test]
    fn depends_format() {
        let meta = sample("foo", "1.0-1", Path::new("/srv/repo"));
        assert_eq!(
            depends_file(&meta),
            "%DEPENDS%\nglibc\nbar>=1.0\n\n\
             %CONFLICTS%\n\n\
             %PROVIDES%\nlibfoo.so=1-64\n\n\
             %OPTDEPENDS%\nbaz: for extra stuff\n\n\
             %MAKEDEPENDS%\n\n"
        );
    }

    #[test]
    fn archive_layout() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("test.db.tar.gz");
        let cache: PkgCache = vec![sample("foo", "1.0-1", dir.path())]
            .into_iter()
            .collect();
        write_db(&cache, &db).unwrap();

        let mut tar = Archive::new(GzDecoder::new(File::open(&db).unwrap()));
        let mut seen = Vec::new();
        for file in tar.entries().unwrap() {
            let mut file = file.unwrap();
            let header = file.header();
            assert_eq!(header.entry_type(), EntryType::Regular);
            assert_eq!(header.mode().unwrap(), 0o644);
            assert!(header.mtime().unwrap() > 0);
            let path: PathBuf = file.path().unwrap().into_owned();
            let mut content = String::new();
            file.read_to_string(&mut content).unwrap();
            seen.push((path, content));
        }
        let meta = cache.get("foo").unwrap();
        assert_eq!(
            seen,
            vec![
                (PathBuf::from("foo-1.0-1/desc"), desc_file(meta)),
                (PathBuf::from("foo-1.0-1/depends"), depends_file(meta)),
            ]
        );
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("test.db.tar.gz");

        let mut empty_lists = sample("bar", "2:0.1rc1-3", dir.path());
        empty_lists.licenses.clear();
        empty_lists.depends.clear();
        empty_lists.provides.clear();
        empty_lists.optdepends.clear();
        empty_lists.description.clear();
        let mut many = sample("foo", "1.0-1", dir.path());
        many.makedepends = vec!["cmake".to_string(), "cmake".to_string(), "ninja".to_string()];
        many.conflicts = vec!["foo-git".to_string()];

        for cache in [
            PkgCache::new(),
            vec![many.clone()].into_iter().collect(),
            vec![many, empty_lists, sample("baz", "0.0.1-1", dir.path())]
                .into_iter()
                .collect(),
        ] {
            write_db(&cache, &db).unwrap();
            assert_eq!(read_db(&db).unwrap(), cache);
        }
    }

    #[test]
    fn replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("test.db.tar.gz");
        std::fs::write(&db, b"old database").unwrap();

        let cache: PkgCache = vec![sample("foo", "1.0-1", dir.path())]
            .into_iter()
            .collect();
        write_db(&cache, &db).unwrap();
        assert_eq!(read_db(&db).unwrap(), cache);

        // Nothing but the database is left behind
        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(files, vec![std::ffi::OsString::from("test.db.tar.gz")]);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&db).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }
    }

    #[test]
    fn failed_write_keeps_old_db() {
        let dir = tempfile::tempdir().unwrap();
        // The target's directory doesn't exist, so nothing can be written
        let db = dir.path().join("missing/test.db.tar.gz");
        assert!(write_db(&PkgCache::new(), &db).is_err());
        assert!(!db.exists());
    }

    #[test]
    fn stale_tmp_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("test.db.tar.gz");
        write_db(&PkgCache::new(), &db).unwrap();
        let stale = dir.path().join(".repoman-AbC123.tmp");
        std::fs::write(&stale, b"half a database").unwrap();
        let unrelated = dir.path().join("notes.tmp");
        std::fs::write(&unrelated, b"").unwrap();

        assert_eq!(remove_stale_tmp(&db).unwrap(), vec![stale.clone()]);
        assert!(!stale.exists());
        assert!(unrelated.exists());
        assert!(read_db(&db).unwrap().is_empty());
        assert!(remove_stale_tmp(&db).unwrap().is_empty());
    }
}
