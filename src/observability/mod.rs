//! Observability subsystem
//!
//! Structured JSON logging of typed events. Output goes to stderr; stdout
//! belongs to CLI responses.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use chocan::observability::{log_event, Event};
//!
//! log_event(Event::TableWritten, &[("table", "members"), ("rows", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // Verifies no panic
        log_event(Event::ConfigLoaded, &[("data_dir", "/tmp/test")]);
        log_event(Event::TableCorrupt, &[]);
    }
}
