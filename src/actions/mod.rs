mod error;
mod query;
mod update;
mod verify;

pub use error::{RepoError, VerifyError};
pub use query::{print_pkg, query_db};
pub use update::{link_db, update_db};
pub use verify::verify_db;

use crate::{
    config::{Action, Opts, Repo},
    db, debug, info,
    utils::lock,
    warn,
};

use anyhow::{Context, Result};
use std::path::Path;

/// Release our lock on the database if interrupted, along with any
/// half-written database
fn set_interrupt_handler(repo: &Repo) -> Result<()> {
    let db_path = repo.path.to_owned();
    ctrlc::set_handler(move || {
        if let Ok(Some(pid)) = lock::check(&db_path) {
            if pid == std::process::id() {
                if let Err(e) = db::remove_stale_tmp(&db_path) {
                    warn!("{}", e);
                }
                if let Err(e) = lock::unlock(&db_path) {
                    warn!("{}", e);
                }
            }
        }
        std::process::exit(2);
    })
    .context("Error setting SIGINT handler")
}

/// bool in return type indicates whether every item succeeded
pub fn fullfill_command(opts: &Opts) -> Result<bool> {
    let repo = Repo::from_opts(opts)?;
    debug!("Using repo {} at {}", repo.name, repo.path.display());

    match opts.action() {
        Action::Verify => {
            info!("Verifying repo {}...", repo.name);
            let failures = verify_db(&repo)?;
            Ok(failures.is_empty())
        }
        Action::Update => {
            set_interrupt_handler(&repo)?;
            let paths: Vec<&Path> = opts.targets.iter().map(Path::new).collect();
            update_db(&repo, &paths, opts.clean)?;
            link_db(&repo)?;
            Ok(true)
        }
        Action::Query => {
            let pkgs = query_db(&repo, &opts.targets)?;
            for pkg in pkgs.iter() {
                print_pkg(pkg);
            }
            Ok(true)
        }
    }
}
