//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber
///
/// `NUTRI_LOG` takes precedence over the level picked from the flags.
pub fn init_logging(global: &GlobalOpts) {
    let level = if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_env("NUTRI_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("nutri={}", level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
