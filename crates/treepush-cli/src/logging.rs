//! Diagnostic logging setup.
//!
//! User-facing lines go through [`crate::output`]; this only wires `tracing`
//! to stderr for `-v` runs and `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides `verbosity`.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,treepush_core={level},treepush_github={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
