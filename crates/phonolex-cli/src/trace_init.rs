//! JSON span log for `phonotool --trace-dir`. Without the `trace` feature
//! the flag is accepted and ignored.

#[cfg(feature = "trace")]
use std::path::Path;
#[cfg(feature = "trace")]
use std::sync::Once;

#[cfg(feature = "trace")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "trace")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "trace")]
const TRACE_FILE: &str = "phonotool-trace.jsonl";

#[cfg(feature = "trace")]
static INIT: Once = Once::new();

/// `RUST_LOG` if set, else debug events from the lookup crate.
#[cfg(feature = "trace")]
fn lookup_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("phonolex_core=debug"))
}

/// Append `get_best_match` and `back_trace` spans, with their timings, to
/// `TRACE_FILE` in `log_dir`. Only the first call has an effect.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: &Path) {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .json()
            .with_writer(tracing_appender::rolling::never(log_dir, TRACE_FILE))
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_env_filter(lookup_filter())
            .init();
    });
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: &std::path::Path) {}
