//! Logging sinks passed explicitly into every operation.
//!
//! The core never touches process-wide logger state. Each operation receives a
//! `&dyn LogSink` and reports per-file events through it; the caller decides
//! whether those land in a terminal, a `tracing` subscriber, or a GUI log view.
//!
//! ```
//! use sortwise::logging::{Level, LogSink, MemorySink};
//!
//! let sink = MemorySink::new();
//! sink.warn("Could not find file 'a.txt' to revert.");
//! assert_eq!(sink.count(Level::Warn), 1);
//! ```

use colored::*;
use indicatif::ProgressBar;
use std::sync::Mutex;

use crate::output::OutputFormatter;

/// Severity of a logged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Destination for the events emitted by plan, apply, revert and cleanup.
pub trait LogSink: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    /// Reports batch progress. `done` counts processed entries out of `total`.
    fn progress(&self, _done: usize, _total: usize) {}
}

/// Forwards events to the `tracing` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!(target: "sortwise", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "sortwise", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "sortwise", "{}", message);
    }
}

/// Colored terminal output with a progress bar for batch operations.
///
/// Every event is also forwarded to [`TracingSink`], so a `RUST_LOG`
/// subscriber sees the same stream.
pub struct ConsoleSink {
    bar: ProgressBar,
    quiet: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            bar: OutputFormatter::create_progress_bar(0),
            quiet: false,
        }
    }

    /// A console sink that only prints warnings and errors.
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::new()
        }
    }

    fn print(&self, line: String) {
        // Printing while the bar is drawn would tear it.
        self.bar.suspend(|| eprintln!("{}", line));
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for ConsoleSink {
    fn info(&self, message: &str) {
        TracingSink.info(message);
        if !self.quiet {
            self.print(format!("  {}", message));
        }
    }

    fn warn(&self, message: &str) {
        TracingSink.warn(message);
        self.print(format!("{} {}", "⚠".yellow(), message));
    }

    fn error(&self, message: &str) {
        TracingSink.error(message);
        self.print(format!("{} {}", "✗".red(), message));
    }

    fn progress(&self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        self.bar.set_length(total as u64);
        self.bar.set_position(done as u64);
        if done >= total {
            self.bar.finish_and_clear();
        }
    }
}

/// Collects events in memory.
///
/// Useful for tests and for front-ends that render the log themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((level, message.to_string()));
        }
    }

    /// Returns a copy of every recorded event, oldest first.
    pub fn events(&self) -> Vec<(Level, String)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of recorded events with the given level.
    pub fn count(&self, level: Level) -> usize {
        self.events()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    /// True if any event at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.events()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.info("first");
        sink.warn("second");
        sink.error("third");

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], (Level::Info, "first".to_string()));
        assert_eq!(events[2].0, Level::Error);
    }

    #[test]
    fn test_memory_sink_contains() {
        let sink = MemorySink::new();
        sink.warn("Could not find file 'a.txt' to revert.");

        assert!(sink.contains(Level::Warn, "a.txt"));
        assert!(!sink.contains(Level::Error, "a.txt"));
    }

    #[test]
    fn test_sink_is_object_safe() {
        let sinks: Vec<Box<dyn LogSink>> = vec![Box::new(TracingSink), Box::new(MemorySink::new())];
        for sink in &sinks {
            sink.info("hello");
            sink.progress(1, 2);
        }
    }
}
