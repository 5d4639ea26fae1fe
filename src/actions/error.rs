use std::path::PathBuf;
use thiserror::Error;

/// A problem with a single package found while checking the database
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum VerifyError {
    #[error("couldn't find pkg {name} at {}", .path.display())]
    Missing { name: String, path: PathBuf },
    #[error("md5 sum for pkg {name} at {} is different", .path.display())]
    Md5Mismatch { name: String, path: PathBuf },
    #[error("sha256 sum for pkg {name} at {} is different", .path.display())]
    Sha256Mismatch { name: String, path: PathBuf },
    #[error("couldn't read pkg {name} at {}: {reason}", .path.display())]
    Unreadable {
        name: String,
        path: PathBuf,
        reason: String,
    },
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum RepoError {
    #[error("repo {} doesn't exist", .0.display())]
    NoDatabase(PathBuf),
    #[error("pkg {0} not found")]
    NotFound(String),
}
