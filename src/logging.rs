//! Logging abstraction
//!
//! Provides crate-level logging macros backed by `tracing`:
//! - `log_error!`, `log_warn!`, `log_info!`, `log_debug!`, `log_trace!`
//!
//! Events are emitted under the `start_verify` target. Nothing is printed
//! until a subscriber is installed, either by the embedding harness or by
//! [`init_logging`].

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[doc(hidden)]
pub use tracing as __tracing;

/// Install a formatted subscriber on stderr.
///
/// `default_filter` (e.g. `"start_verify=debug"`) applies unless `RUST_LOG`
/// is set. Calling this more than once keeps the first subscriber.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::error!(target: "start_verify", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::warn!(target: "start_verify", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::info!(target: "start_verify", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::debug!(target: "start_verify", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::trace!(target: "start_verify", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_expand_without_subscriber() {
        let count = 3;
        crate::log_debug!("visited {} waypoints", count);
        crate::log_info!(count, "structured field");
        crate::log_warn!("warning");
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        super::init_logging("start_verify=debug");
        super::init_logging("start_verify=trace");
        crate::log_trace!("after init");
    }
}
