//! Clock protocol definitions.

/// One reading of both page clocks, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockReading {
    /// Wall clock (`Date.now()`), milliseconds since the Unix epoch.
    pub wall_ms: f64,
    /// Monotonic clock (`performance.now()`), milliseconds since time origin.
    pub monotonic_ms: f64,
}

/// The real, unmodified clock underneath any override.
pub trait ClockSource: Send + Sync {
    fn wall_ms(&self) -> f64;
    fn monotonic_ms(&self) -> f64;

    fn read(&self) -> ClockReading {
        ClockReading {
            wall_ms: self.wall_ms(),
            monotonic_ms: self.monotonic_ms(),
        }
    }
}
