// Tracing setup. Filter directives come from `DASHBOARD_LOG`, default `info`.
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceCell<()> = OnceCell::new();

/// Install the global subscriber. Safe to call more than once; only the
/// first call has an effect.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env("DASHBOARD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
        if let Err(e) = fmt().with_env_filter(filter).try_init() {
            eprintln!("Tracing subscriber already installed: {}", e);
        }
    });
}
