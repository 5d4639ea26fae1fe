use anyhow::{bail, Context, Result};
use md5::Md5;
use sha2::{Digest, Sha256};
use std::{
    fmt::Display,
    fs::File,
    io::{self, Read, Write},
    path::Path,
};

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Checksum {
    Md5(Vec<u8>),
    Sha256(Vec<u8>),
}

/// Feeds the same bytes into both hashers, so a file is only read once
struct DualHasher {
    md5: Md5,
    sha256: Sha256,
}

impl Write for DualHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.md5.update(buf);
        self.sha256.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Checksum {
    pub fn from_md5_str(s: &str) -> Result<Self> {
        if s.len() != 32 {
            bail!("Malformed MD5 string: bad length")
        }
        Ok(Checksum::Md5(hex::decode(s)?))
    }

    pub fn from_sha256_str(s: &str) -> Result<Self> {
        if s.len() != 64 {
            bail!("Malformed Sha256 string: bad length")
        }
        Ok(Checksum::Sha256(hex::decode(s)?))
    }

    /// Compute both the MD5 and the SHA256 checksum of a stream
    pub fn compute_read(mut r: impl Read) -> Result<(Checksum, Checksum)> {
        let mut hasher = DualHasher {
            md5: Md5::new(),
            sha256: Sha256::new(),
        };
        io::copy(&mut r, &mut hasher)?;
        Ok((
            Checksum::Md5(hasher.md5.finalize().to_vec()),
            Checksum::Sha256(hasher.sha256.finalize().to_vec()),
        ))
    }

    pub fn compute_file(path: &Path) -> Result<(Checksum, Checksum)> {
        let file = File::open(path).context(format!(
            "Failed to open {} for computing checksum",
            path.display()
        ))?;
        Self::compute_read(file)
            .context(format!("Failed to read {} for computing checksum", path.display()))
    }

    /// Whether this checksum matches a hex string stored in the database
    ///
    /// A malformed string never matches.
    pub fn matches_str(&self, s: &str) -> bool {
        let stored = match self {
            Checksum::Md5(_) => Checksum::from_md5_str(s),
            Checksum::Sha256(_) => Checksum::from_sha256_str(s),
        };
        match stored {
            Ok(stored) => &stored == self,
            Err(_) => false,
        }
    }
}

impl Display for Checksum {
    /// Lowercase hex, as written into the database
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Checksum::Md5(sum) => f.write_str(&hex::encode(sum)),
            Checksum::Sha256(sum) => f.write_str(&hex::encode(sum)),
        }
    }
}
