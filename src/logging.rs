//! Logging initialization
//!
//! Diagnostics go to stderr so they never mix with command output on
//! stdout. `RUST_LOG` takes precedence over `--verbose`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when neither `RUST_LOG` nor `--verbose` is given
const DEFAULT_LEVEL: &str = "warn";

/// Level used with `--verbose`
const VERBOSE_LEVEL: &str = "debug";

/// Filter directive for the given verbosity, before `RUST_LOG` is applied
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LEVEL
    } else {
        DEFAULT_LEVEL
    }
}

/// Installs the global subscriber. Call once, from `main`.
pub fn init_logging(verbose: bool) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(verbose)));

    // A subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
