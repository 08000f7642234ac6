use std::sync::Once;
use tracing::Level;

static INIT: Once = Once::new();

/// Installs the global tracing subscriber. Safe to call more than once, and a
/// no-op when the host application already set one up.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .try_init();
    });
}
