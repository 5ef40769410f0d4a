//! Progress reporting seam.
//!
//! The classification pipeline never talks to a process-global logger.
//! Callers inject an [`Observer`] and decide where progress lines go:
//! the daemon forwards them to `tracing`, tests capture them, library
//! embedders can drop them entirely.

use std::sync::Mutex;

/// Sink for human-readable progress events emitted during loading,
/// matching and inference.
pub trait Observer: Send + Sync {
    /// Normal progress message.
    fn info(&self, message: &str);

    /// Degraded-mode message (remote fetch failed, AI unavailable, ...).
    fn warn(&self, message: &str);
}

/// Forwards events to the `tracing` subscriber installed by the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Discards every event. Useful for embedders that only want the
/// returned analysis.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn info(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}
}

/// Records events in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct CapturingObserver {
    infos: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl CapturingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All info messages seen so far, in emission order.
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// All warning messages seen so far, in emission order.
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// True if any captured warning contains `needle`.
    pub fn warned_about(&self, needle: &str) -> bool {
        self.warnings().iter().any(|w| w.contains(needle))
    }
}

impl Observer for CapturingObserver {
    fn info(&self, message: &str) {
        if let Ok(mut infos) = self.infos.lock() {
            infos.push(message.to_string());
        }
    }

    fn warn(&self, message: &str) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(message.to_string());
        }
    }
}
