//! Observable events
//!
//! Every log line names one of these.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    ConfigLoaded,
    WorkspaceInitialized,

    // Table storage
    TableLoaded,
    TableWritten,
    TableCorrupt,

    // Record store
    RecordsAdded,
    RecordUpdated,
    RecordRemoved,
    RecordRejected,
    IdGenerated,

    // Domain
    ServiceRecorded,
    MemberSuspensionChanged,

    // Reports
    ReportWritten,
    ReportSkipped,

    // CLI
    CommandComplete,
    CommandFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::WorkspaceInitialized => "WORKSPACE_INITIALIZED",

            Event::TableLoaded => "TABLE_LOADED",
            Event::TableWritten => "TABLE_WRITTEN",
            Event::TableCorrupt => "TABLE_CORRUPT",

            Event::RecordsAdded => "RECORDS_ADDED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::RecordRemoved => "RECORD_REMOVED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::IdGenerated => "ID_GENERATED",

            Event::ServiceRecorded => "SERVICE_RECORDED",
            Event::MemberSuspensionChanged => "MEMBER_SUSPENSION_CHANGED",

            Event::ReportWritten => "REPORT_WRITTEN",
            Event::ReportSkipped => "REPORT_SKIPPED",

            Event::CommandComplete => "COMMAND_COMPLETE",
            Event::CommandFailed => "COMMAND_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::TableLoaded | Event::IdGenerated => Severity::Trace,
            Event::RecordRejected | Event::ReportSkipped | Event::CommandFailed => Severity::Warn,
            Event::TableCorrupt => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_upper_snake() {
        for event in [Event::TableWritten, Event::ReportSkipped, Event::CommandFailed] {
            assert!(event
                .as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_corruption_is_error() {
        assert_eq!(Event::TableCorrupt.severity(), Severity::Error);
        assert_eq!(Event::TableLoaded.severity(), Severity::Trace);
    }
}
