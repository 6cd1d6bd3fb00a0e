//! Log output setup.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().with_current_span(false).init();
    } else {
        builder.init();
    }
}
