//! Helpers for building package files in tests
use flate2::{write::GzEncoder, Compression};
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

pub enum Compress {
    Gzip,
    Xz,
    Zstd,
    None,
}

impl Compress {
    fn extension(&self) -> &'static str {
        match self {
            Compress::Gzip => ".gz",
            Compress::Xz => ".xz",
            Compress::Zstd => ".zst",
            Compress::None => "",
        }
    }
}

pub fn pkginfo(name: &str, version: &str) -> String {
    format!(
        "# Generated by makepkg
pkgname = {name}
pkgbase = {name}
pkgver = {version}
pkgdesc = The {name} package
url = https://example.org/{name}
builddate = 1672531200
packager = Test Packager <test@example.org>
size = 2048
arch = any
license = MIT
depend = glibc
optdepend = bash: for scripts
"
    )
}

/// Create `<name>-<version>-any.pkg.tar.gz` inside `dir`
pub fn make_pkg(dir: &Path, name: &str, version: &str) -> PathBuf {
    make_pkg_with(dir, name, version, Compress::Gzip)
}

pub fn make_pkg_with(dir: &Path, name: &str, version: &str, compress: Compress) -> PathBuf {
    let path = dir.join(format!(
        "{name}-{version}-any.pkg.tar{}",
        compress.extension()
    ));
    let tarball = build_tar(&pkginfo(name, version));
    let f = File::create(&path).unwrap();
    match compress {
        Compress::Gzip => {
            let mut encoder = GzEncoder::new(f, Compression::default());
            encoder.write_all(&tarball).unwrap();
            encoder.finish().unwrap();
        }
        Compress::Xz => {
            let mut encoder = xz2::write::XzEncoder::new(f, 6);
            encoder.write_all(&tarball).unwrap();
            encoder.finish().unwrap();
        }
        Compress::Zstd => {
            let mut encoder = zstd::stream::write::Encoder::new(f, 0).unwrap();
            encoder.write_all(&tarball).unwrap();
            encoder.finish().unwrap();
        }
        Compress::None => {
            let mut f = f;
            f.write_all(&tarball).unwrap();
        }
    }
    path
}

fn build_tar(pkginfo: &str) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    append(&mut builder, ".PKGINFO", pkginfo.as_bytes());
    append(&mut builder, "usr/share/doc/pkg/README", b"nothing to see here\n");
    builder.into_inner().unwrap()
}

fn append(builder: &mut tar::Builder<Vec<u8>>, path: &str, data: &[u8]) {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, path, data).unwrap();
}
