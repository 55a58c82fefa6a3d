//! Observable events
//!
//! Events are explicit and typed. Each carries the severity it is logged at.

use std::fmt;

use super::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Schema compiler
    /// Model compiled from its declarations
    ModelCompiled,

    // Construction
    /// Record constructed
    RecordConstructed,
    /// Construction failed
    ConstructionRejected,

    // Loader
    /// Model directory loaded
    ModelsLoaded,
    /// Model file could not be read or declared
    ModelFileRejected,
    /// CLI configuration loaded
    ConfigLoaded,

    // CLI
    /// Command started
    CommandStart,
    /// Command finished successfully
    CommandComplete,
    /// Command failed
    CommandFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ModelCompiled => "MODEL_COMPILED",
            Event::RecordConstructed => "RECORD_CONSTRUCTED",
            Event::ConstructionRejected => "CONSTRUCTION_REJECTED",
            Event::ModelsLoaded => "MODELS_LOADED",
            Event::ModelFileRejected => "MODEL_FILE_REJECTED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CommandStart => "COMMAND_START",
            Event::CommandComplete => "COMMAND_COMPLETE",
            Event::CommandFailed => "COMMAND_FAILED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::RecordConstructed => Severity::Trace,
            Event::ModelCompiled
            | Event::ModelsLoaded
            | Event::ConfigLoaded
            | Event::CommandStart
            | Event::CommandComplete => Severity::Info,
            Event::ConstructionRejected | Event::ModelFileRejected => Severity::Warn,
            Event::CommandFailed => Severity::Error,
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
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ModelCompiled,
            Event::RecordConstructed,
            Event::ConstructionRejected,
            Event::ModelsLoaded,
            Event::ModelFileRejected,
            Event::ConfigLoaded,
            Event::CommandStart,
            Event::CommandComplete,
            Event::CommandFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_rejections_are_warnings() {
        assert_eq!(Event::ConstructionRejected.severity(), Severity::Warn);
        assert_eq!(Event::RecordConstructed.severity(), Severity::Trace);
        assert_eq!(Event::CommandFailed.severity(), Severity::Error);
    }
}
