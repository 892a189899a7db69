//! Core types shared across the fetch-and-install pipeline.
//!
//! Holds the error types ([`error`]) and the [`LogSink`] abstraction that the
//! installer reports through. The sink replaces global logging for
//! operator-facing output: the engine writes exactly one line per major
//! transition (install start, skip reasons, per-skipped-encrypted-entry
//! notices, final success or failure) and never depends on the sink
//! buffering, blocking, or filtering. Diagnostic output goes through
//! `tracing` separately.

pub mod error;

pub use error::{ErrorContext, Result, ToolfetchError, user_friendly_error};

/// Destination for ordered, human-readable progress lines.
///
/// Supplied by the caller of [`crate::installer::Installer::install`]. Lines
/// arrive in the order events happen; implementations must accept them
/// without filtering expectations.
pub trait LogSink {
    /// Record one human-readable line.
    fn line(&mut self, line: &str);
}

/// Sink that forwards lines to `tracing` at info level.
///
/// The default choice for embedding the installer in a larger service that
/// already has a tracing subscriber installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn line(&mut self, line: &str) {
        tracing::info!("{line}");
    }
}

/// Sink that prints lines to stdout, used by the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn line(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Sink that collects lines in memory.
///
/// Useful for tests and for callers that want to surface the install log
/// after the fact.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    /// Collected lines, oldest first.
    pub lines: Vec<String>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogSink for MemorySink {
    fn line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
