use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

static INIT: OnceLock<()> = OnceLock::new();

/// Installs the global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` wins over `default_level` when set.
pub(crate) fn init(default_level: &str) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        let subscriber = Registry::default().with(filter).with(
            fmt::layer()
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr),
        );
        // A subscriber may already be set, e.g. in tests.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Filter level for the `-v`/`-q` flags.
pub(crate) fn level(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}
