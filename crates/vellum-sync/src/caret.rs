//! Caret-report arming: at most one geometry report per focus session.

/// Tracks whether the current focus session has already produced a caret
/// report. Armed on construction and re-armed on blur; set only by a
/// successful report, so a focus-in that finds no selection leaves the
/// session armed.
#[derive(Debug, Default)]
pub struct CaretReporter {
    sent: bool,
}

impl CaretReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called on focus-in. True when a report should be scheduled.
    pub fn focus_gained(&mut self) -> bool {
        !self.sent
    }

    /// Record a successful report; suppresses the rest of the session.
    pub fn mark_sent(&mut self) {
        self.sent = true;
    }

    /// Called on blur; re-arms for the next session.
    pub fn blur(&mut self) {
        self.sent = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_once_per_session() {
        let mut reporter = CaretReporter::new();
        assert!(reporter.focus_gained());
        reporter.mark_sent();
        assert!(!reporter.focus_gained());
    }

    #[test]
    fn test_blur_rearms() {
        let mut reporter = CaretReporter::new();
        reporter.mark_sent();
        reporter.blur();
        assert!(reporter.focus_gained());
    }

    #[test]
    fn test_failed_report_leaves_session_armed() {
        let mut reporter = CaretReporter::new();
        assert!(reporter.focus_gained());
        // No mark_sent: the selection query came back empty.
        assert!(reporter.focus_gained());
    }
}
