//! Monotonic time injection for request/response latency measurement.

use std::time::Instant;

/// Supplies the monotonic clock readings used to timestamp outstanding
/// requests. Injected as a collaborator so tests can pin latencies to known
/// values.
#[cfg_attr(test, mockall::automock)]
pub trait TimeSource {
    /// Current monotonic time.
    fn monotonic_now(&self) -> Instant;
}

/// [`TimeSource`] backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn monotonic_now(&self) -> Instant {
        Instant::now()
    }
}
