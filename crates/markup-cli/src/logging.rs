//! Tracing setup for the `markup` binary.
//!
//! The subscriber is only installed when `MARKUP_LOG` (or `RUST_LOG`) is set.
//! Output goes to stderr so it never mixes with documents written to stdout.
//!
//! ```bash
//! MARKUP_LOG=trace markup check doc.xml
//! MARKUP_LOG="markup_parser=debug" markup fmt doc.xml
//! ```

use tracing_subscriber::EnvFilter;

const LOG_VAR: &str = "MARKUP_LOG";

/// `MARKUP_LOG` takes precedence over `RUST_LOG`.
fn build_filter() -> Option<EnvFilter> {
    if let Ok(val) = std::env::var(LOG_VAR) {
        return Some(EnvFilter::builder().parse_lossy(val));
    }
    std::env::var("RUST_LOG")
        .is_ok()
        .then(EnvFilter::from_default_env)
}

pub fn init_tracing() {
    let Some(filter) = build_filter() else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
