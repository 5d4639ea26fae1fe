mod actions;
mod cli;
mod config;
mod db;
mod types;
mod utils;

#[cfg(test)]
mod testutil;

use anyhow::Result;
use clap::Parser;
use config::Opts;

/// Exit codes:
/// 1 => something went wrong
/// 2 => user cancelled operation
fn main() {
    match try_main() {
        Ok(true) => (),
        Ok(false) => std::process::exit(1),
        Err(err) => {
            error!("{}", err.to_string());
            err.chain().skip(1).for_each(|cause| {
                due_to!("{}", cause);
            });
            std::process::exit(1);
        }
    }
}

fn try_main() -> Result<bool> {
    let opts = Opts::parse();
    cli::set_verbose(opts.verbose);
    actions::fullfill_command(&opts)
}
