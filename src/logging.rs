//! Tracing subscriber setup for host applications and tests.
//!
//! The crate itself only emits `tracing` events; nothing is printed unless
//! a subscriber is installed, either by the host or through
//! [`init_tracing`].

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::EnvFilter;

/// Filter used when neither environment variable is set.
pub const DEFAULT_FILTER: &str = "flexcanvas=info";

/// Crate-specific filter variable, read before `RUST_LOG`.
pub const LOG_ENV: &str = "FLEXCANVAS_LOG";

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Build the filter from `FLEXCANVAS_LOG`, then `RUST_LOG`, then the default.
pub fn env_filter() -> EnvFilter {
    let directives = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    match EnvFilter::try_new(&directives) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(DEFAULT_FILTER),
    }
}

/// Install a formatted subscriber.
///
/// Idempotent. Returns true only for the call that installed it; false if
/// this crate or the host already set a global subscriber.
pub fn init_tracing() -> bool {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return false;
    }
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_thread_names(true)
        .try_init()
        .is_ok()
}
