use crate::types::{Checksum, PkgMeta};

use anyhow::{bail, format_err, Context, Result};
use flate2::read::GzDecoder;
use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::space0,
    combinator::rest,
    sequence::{delimited, separated_pair},
    IResult,
};
use std::{
    fs::File,
    io::{prelude::*, BufReader},
    path::Path,
};
use tar::Archive;
use xz2::read::XzDecoder;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Read metadata of a package file, including checksums of the file itself
pub fn load_pkg(path: &Path) -> Result<PkgMeta> {
    let pkginfo = read_pkginfo(path)?;
    let csize = std::fs::metadata(path)
        .context(format!("Failed to stat {}", path.display()))?
        .len();
    let (md5sum, sha256sum) = Checksum::compute_file(path)?;
    parse_pkginfo(&pkginfo, path, csize, md5sum.to_string(), sha256sum.to_string())
        .context(format!("Bad .PKGINFO in {}", path.display()))
}

/// Open a package and pick the decompressor by the magic bytes
fn open_pkg(path: &Path) -> Result<Box<dyn Read>> {
    let f = File::open(path).context(format!("Failed to open package at {}", path.display()))?;
    let mut reader = BufReader::new(f);
    let head: Vec<u8> = reader.fill_buf()?.iter().take(XZ_MAGIC.len()).copied().collect();

    let res: Box<dyn Read> = if head.starts_with(GZIP_MAGIC) {
        Box::new(GzDecoder::new(reader))
    } else if head.starts_with(XZ_MAGIC) {
        Box::new(XzDecoder::new(reader))
    } else if head.starts_with(ZSTD_MAGIC) {
        Box::new(zstd::stream::read::Decoder::with_buffer(reader)?)
    } else {
        // Uncompressed tar
        Box::new(reader)
    };
    Ok(res)
}

fn read_pkginfo(path: &Path) -> Result<String> {
    let mut tar = Archive::new(open_pkg(path)?);
    for file in tar
        .entries()
        .context(format!("{} is not a package", path.display()))?
    {
        let mut file = file?;
        let is_pkginfo = {
            let p = file.header().path()?;
            p == Path::new(".PKGINFO") || p == Path::new("./.PKGINFO")
        };
        if is_pkginfo {
            let mut res = String::new();
            file.read_to_string(&mut res)?;
            return Ok(res);
        }
    }
    bail!("Malformed package {}: .PKGINFO not found", path.display())
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parse a line in .PKGINFO, like `pkgname = foo`
fn parse_line(i: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while1(is_key_char),
        delimited(space0, tag("="), space0),
        rest,
    )(i)
}

fn parse_pkginfo(
    i: &str,
    path: &Path,
    csize: u64,
    md5sum: String,
    sha256sum: String,
) -> Result<PkgMeta> {
    let mut meta = PkgMeta {
        filename: path.to_owned(),
        csize,
        md5sum,
        sha256sum,
        ..Default::default()
    };
    let mut name = None;
    let mut version = None;

    for (no, line) in i.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = match parse_line(line) {
            Ok((_, pair)) => pair,
            Err(e) => bail!("malformed line {}: {e}", no + 1),
        };
        let value = value.to_owned();
        match key {
            "pkgname" => name = Some(value),
            "pkgver" => version = Some(value),
            "pkgdesc" => meta.description = value,
            "url" => meta.url = value,
            "packager" => meta.packager = value,
            "arch" => meta.arch = value,
            "builddate" => {
                meta.builddate = value
                    .parse()
                    .map_err(|e| format_err!("invalid builddate {value}: {e}"))?
            }
            "size" => {
                meta.isize = value
                    .parse()
                    .map_err(|e| format_err!("invalid size {value}: {e}"))?
            }
            "license" => meta.licenses.push(value),
            "depend" => meta.depends.push(value),
            "conflict" => meta.conflicts.push(value),
            "provides" => meta.provides.push(value),
            "optdepend" => meta.optdepends.push(value),
            "makedepend" => meta.makedepends.push(value),
            // We don't care about the rest
            _ => (),
        }
    }

    meta.name = name.ok_or_else(|| format_err!("pkgname missing"))?;
    meta.version = version.ok_or_else(|| format_err!("pkgver missing"))?;
    Ok(meta)
}
