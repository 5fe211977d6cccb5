//! Tracing adapter: forwards the domain's `OperationLogger` port and
//! `set_log_fn` callback to `tracing`.
//!
//! Single entry point for all structured logging in this crate; `tracing`
//! remains an implementation detail the domain never depends on. Register at
//! startup with `toolgate_domain::infra::logging::set_log_fn(tracing_log_fn)`.

use std::sync::OnceLock;

use toolgate_domain::ports::{LogLevel, OperationLogger};
use toolgate_domain::utils::{parse_error_details_level, ErrorDetailsLevel};

static ERROR_DETAIL_LEVEL: OnceLock<ErrorDetailsLevel> = OnceLock::new();

fn detail_allowed(level: LogLevel) -> bool {
    match ERROR_DETAIL_LEVEL.get().copied().unwrap_or_default() {
        ErrorDetailsLevel::Off => false,
        ErrorDetailsLevel::Debug => !matches!(level, LogLevel::Trace),
        ErrorDetailsLevel::Trace => true,
    }
}

/// Log function suitable for `toolgate_domain::infra::logging::set_log_fn`.
/// Forwards level, context, message and optional detail to `tracing::event!`;
/// `detail` is dropped when it exceeds the configured
/// [`ErrorDetailsLevel`] (set once via [`init`]).
pub fn tracing_log_fn(level: LogLevel, context: &str, message: &str, detail: Option<&dyn std::fmt::Display>) {
    let detail = detail.filter(|_| detail_allowed(level));
    macro_rules! emit {
        ($lvl:expr) => {
            if let Some(d) = detail {
                tracing::event!($lvl, context = %context, detail = %d, "{}", message);
            } else {
                tracing::event!($lvl, context = %context, "{}", message);
            }
        };
    }
    match level {
        LogLevel::Error => emit!(tracing::Level::ERROR),
        LogLevel::Warn => emit!(tracing::Level::WARN),
        LogLevel::Info => emit!(tracing::Level::INFO),
        LogLevel::Debug => emit!(tracing::Level::DEBUG),
        LogLevel::Trace => emit!(tracing::Level::TRACE),
    }
}

/// Adapter that implements the domain [`OperationLogger`] port by forwarding
/// to `tracing`. Registered in DI wherever an `Arc<dyn OperationLogger>` is
/// required (e.g. the server's call-audit path, §6).
#[derive(Debug, Default)]
pub struct TracingOperationLogger;

impl TracingOperationLogger {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OperationLogger for TracingOperationLogger {
    fn log(&self, level: LogLevel, context: &str, message: &str, detail: Option<&dyn std::fmt::Display>) {
        tracing_log_fn(level, context, message, detail);
    }
}

/// Installs a `tracing-subscriber` global default writing to stdout, honoring
/// `RUST_LOG`, and wires the domain log facade so `toolgate_domain::info!`
/// et al. reach it. `error_detail_level` (`"off"|"debug"|"trace"`) caps how
/// much `detail` the log facade attaches to events.
pub fn init(default_directive: &str, error_detail_level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = fmt().with_env_filter(filter).try_init();
    let _ = ERROR_DETAIL_LEVEL.set(parse_error_details_level(error_detail_level));
    toolgate_domain::infra::logging::set_log_fn(tracing_log_fn);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_log_fn_does_not_panic_with_or_without_detail() {
        tracing_log_fn(LogLevel::Info, "ctx", "message", None);
        tracing_log_fn(LogLevel::Error, "ctx", "message", Some(&"detail"));
    }
}
