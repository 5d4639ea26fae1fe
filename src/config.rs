use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(about, version, author)]
#[clap(mut_arg("version", |a| a.short('v')))]
#[clap(group(ArgGroup::new("action").required(true).args(&["verify", "update", "query"])))]
pub struct Opts {
    /// Verify the contents of the database
    #[clap(short = 'V', long)]
    pub verify: bool,
    /// Update the database
    #[clap(short = 'U', long)]
    pub update: bool,
    /// Query the database
    #[clap(short = 'Q', long)]
    pub query: bool,
    /// Remove superseded package files when updating
    #[clap(short, long)]
    pub clean: bool,
    /// Repo name to use, defaults to the host name
    #[clap(short, long, value_name = "NAME")]
    pub repo: Option<String>,
    /// Print additional debug information
    #[clap(long)]
    pub verbose: bool,
    /// Package names to query, or paths to scan for packages when updating
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Verify,
    Update,
    Query,
}

impl Opts {
    pub fn action(&self) -> Action {
        if self.verify {
            Action::Verify
        } else if self.update {
            Action::Update
        } else {
            Action::Query
        }
    }
}

/// Location of a repository database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    pub name: String,
    /// The database itself, `<name>.db.tar.gz`
    pub path: PathBuf,
    /// Symlink pointing to the database, `<name>.db`
    pub link: PathBuf,
}

impl Repo {
    /// Repository named `name` in the current directory
    pub fn new(name: &str) -> Self {
        Self::in_dir(Path::new(""), name)
    }

    pub fn in_dir(dir: &Path, name: &str) -> Self {
        Repo {
            name: name.to_owned(),
            path: dir.join(format!("{name}.db.tar.gz")),
            link: dir.join(format!("{name}.db")),
        }
    }

    pub fn from_opts(opts: &Opts) -> Result<Self> {
        let name = match &opts.repo {
            Some(name) => name.clone(),
            None => default_repo_name()?,
        };
        Ok(Self::new(&name))
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

pub fn default_repo_name() -> Result<String> {
    let mut buf = [0u8; 256];
    let name = nix::unistd::gethostname(&mut buf).context("Failed to get host name")?;
    Ok(name.to_string_lossy().into_owned())
}
