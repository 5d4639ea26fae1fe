use console::style;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether debug messages should be printed
static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

const PREFIX_LEN: usize = 10;

/// Right-align a prefix so that all messages start at the same column
pub fn gen_prefix(prefix: &str) -> String {
    let len = console::measure_text_width(prefix);
    if len >= PREFIX_LEN {
        format!("{prefix} ")
    } else {
        format!("{}{} ", " ".repeat(PREFIX_LEN - len), prefix)
    }
}

pub fn info_prefix() -> String {
    gen_prefix(&style("INFO").blue().bold().to_string())
}

pub fn success_prefix() -> String {
    gen_prefix(&style("SUCCESS").green().bold().to_string())
}

pub fn warn_prefix() -> String {
    gen_prefix(&style("WARNING").yellow().bold().to_string())
}

pub fn error_prefix() -> String {
    gen_prefix(&style("ERROR").red().bold().to_string())
}

pub fn due_to_prefix() -> String {
    gen_prefix(&style("DUE TO").yellow().bold().to_string())
}

pub fn debug_prefix() -> String {
    gen_prefix(&style("DEBUG").dim().to_string())
}

/// Plain message with a custom prefix
#[macro_export]
macro_rules! msg {
    ($prefix:expr, $($arg:tt)+) => {
        println!("{}{}", $crate::cli::gen_prefix($prefix), format!($($arg)+))
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        println!("{}{}", $crate::cli::info_prefix(), format!($($arg)+))
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        println!("{}{}", $crate::cli::success_prefix(), format!($($arg)+))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        eprintln!("{}{}", $crate::cli::warn_prefix(), format!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        eprintln!("{}{}", $crate::cli::error_prefix(), format!($($arg)+))
    };
}

#[macro_export]
macro_rules! due_to {
    ($($arg:tt)+) => {
        eprintln!("{}{}", $crate::cli::due_to_prefix(), format!($($arg)+))
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        if $crate::cli::is_verbose() {
            println!("{}{}", $crate::cli::debug_prefix(), format!($($arg)+))
        }
    };
}
