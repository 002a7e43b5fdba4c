use std::error::Error;
use std::sync::Mutex;

/// Logging broker: receives every normalized service failure exactly once,
/// at the point where it is wrapped.
pub trait FailureLog: Send + Sync {
    fn error(&self, failure: &dyn Error);
    fn critical(&self, failure: &dyn Error);
}

/// Emits failures as `tracing` error events.
pub struct TracingFailureLog;

impl FailureLog for TracingFailureLog {
    fn error(&self, failure: &dyn Error) {
        tracing::error!(failure = %failure, "service failure");
    }

    fn critical(&self, failure: &dyn Error) {
        tracing::error!(failure = %failure, severity = "critical", "service failure");
    }
}

/// Severity a failure was recorded at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Critical,
}

/// Captures failures for assertion in tests and doc examples.
#[derive(Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FailureLog for RecordingLog {
    fn error(&self, failure: &dyn Error) {
        self.entries
            .lock()
            .unwrap()
            .push((Severity::Error, failure.to_string()));
    }

    fn critical(&self, failure: &dyn Error) {
        self.entries
            .lock()
            .unwrap()
            .push((Severity::Critical, failure.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "boom")
        }
    }

    impl Error for Boom {}

    #[test]
    fn recording_log_keeps_severity_and_message() {
        let log = RecordingLog::new();
        log.error(&Boom);
        log.critical(&Boom);

        assert_eq!(
            log.entries(),
            vec![
                (Severity::Error, "boom".to_string()),
                (Severity::Critical, "boom".to_string()),
            ]
        );
    }
}
