use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "lead_router.log";
const DEFAULT_FILTER: &str = "lead_router=info,info";

/// Install the global subscriber.
///
/// Per-lead events (repaired rows, corrected model values, fallbacks with the raw response)
/// go to `logs/lead_router.log` as JSON lines, rotated daily, so a run can be audited lead by
/// lead. The console gets the same events in readable form. `RUST_LOG` overrides the filter.
pub fn init_logging() {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("could not create {LOG_DIR}/: {e}");
    }

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(LOG_DIR, LOG_FILE));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Tests and the server may both call this; only the first install wins.
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_target(true).with_writer(std::io::stdout))
        .try_init()
        .is_ok();

    if installed {
        // The writer flushes on drop; the subscriber lives for the whole process.
        std::mem::forget(guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_does_not_panic() {
        init_logging();
        init_logging();
        tracing::info!(leads = 0, "logging initialized twice");
    }
}
