//! Session state tracking
//!
//! Maintains:
//! - Current catalog position
//! - Phase of the check/next cycle
//! - The last sentence that was checked
//! - Running totals for the end-of-session summary

use std::time::Instant;

/// Where the session is in the check/next cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the user to type a translation
    AwaitingAnswer,
    /// Answer checked, feedback on screen
    Checked,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::AwaitingAnswer => "awaiting an answer",
            Phase::Checked => "checked",
        }
    }
}

/// Transient, in-memory session state
#[derive(Clone, Debug)]
pub struct SessionState {
    pub current_index: Option<usize>,
    pub phase: Phase,
    pub last_checked_source_text: Option<String>,
    /// Answers checked this session
    pub checks: u32,
    /// Correct answers this session
    pub correct: u32,
    pub start_time: Option<Instant>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState {
            current_index: None,
            phase: Phase::AwaitingAnswer,
            last_checked_source_text: None,
            checks: 0,
            correct: 0,
            start_time: None,
        }
    }

    /// Start the session timer
    pub fn start(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
    }

    /// Get session duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Record a checked answer and move to `Checked`
    pub fn record_check(&mut self, source_text: &str, correct: bool) {
        self.checks += 1;
        if correct {
            self.correct += 1;
        }
        self.last_checked_source_text = Some(source_text.to_string());
        self.phase = Phase::Checked;
    }

    /// Point at a new sentence and wait for an answer
    pub fn advance(&mut self, index: usize) {
        self.current_index = Some(index);
        self.phase = Phase::AwaitingAnswer;
    }

    /// Share of correct answers this session (0.0-1.0)
    pub fn session_accuracy(&self) -> f64 {
        if self.checks == 0 {
            0.0
        } else {
            self.correct as f64 / self.checks as f64
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            checks: self.checks,
            correct: self.correct,
            accuracy: self.session_accuracy(),
            duration_secs: self.duration_secs(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// End-of-session figures
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub checks: u32,
    pub correct: u32,
    pub accuracy: f64,
    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_awaits_answer() {
        let state = SessionState::new();
        assert_eq!(state.phase, Phase::AwaitingAnswer);
        assert_eq!(state.current_index, None);
        assert_eq!(state.session_accuracy(), 0.0);
    }

    #[test]
    fn test_check_then_advance() {
        let mut state = SessionState::new();
        state.advance(3);
        state.record_check("Olá", true);
        assert_eq!(state.phase, Phase::Checked);
        assert_eq!(state.last_checked_source_text.as_deref(), Some("Olá"));

        state.advance(1);
        assert_eq!(state.phase, Phase::AwaitingAnswer);
        assert_eq!(state.current_index, Some(1));
        assert_eq!(state.last_checked_source_text.as_deref(), Some("Olá"));
    }

    #[test]
    fn test_session_accuracy() {
        let mut state = SessionState::new();
        state.record_check("a", true);
        state.record_check("b", false);
        state.record_check("c", true);
        state.record_check("d", true);
        let summary = state.summary();
        assert_eq!((summary.checks, summary.correct), (4, 3));
        assert_eq!(summary.accuracy, 0.75);
    }
}
