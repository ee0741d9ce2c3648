//! Tracing setup for binaries, tests and the Python binding

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a global fmt subscriber
///
/// `RUST_LOG` is honoured; without it the crate logs at `info`. Safe to call
/// more than once, only the first call installs anything.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = match "euro_economy_core=info".parse() {
            Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
            Err(_) => EnvFilter::from_default_env(),
        };

        // Another subscriber may already be installed by the host process.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}
