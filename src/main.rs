//! gitpgm CLI entry point.

use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level comes from `GITPGM_LOG` (e.g. `GITPGM_LOG=gitpgm=debug`),
/// defaulting to warnings only. Logs go to stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("GITPGM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    gitpgm::cli::run()
}
