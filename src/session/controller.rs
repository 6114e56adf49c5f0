//! Session controller: drives the check/next cycle
//!
//! `AwaitingAnswer --check--> Checked --next--> AwaitingAnswer`
//!
//! `next` is also allowed while awaiting an answer (skip). There is no
//! terminal state; the shell ends the session by dropping the controller.

use super::answer::{answers_match, Feedback};
use super::state::{Phase, SessionState, SessionSummary};
use crate::catalog::{Catalog, SentencePair};
use crate::error::{Result, TrainerError};
use crate::ledger::{Ledger, LedgerStore};
use crate::selector::Selector;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

/// Owns the catalog, ledger and transient state of one session
pub struct SessionController<R = StdRng> {
    catalog: Catalog,
    ledger: Ledger,
    store: LedgerStore,
    selector: Selector<R>,
    state: SessionState,
}

impl<R: Rng> SessionController<R> {
    pub fn new(catalog: Catalog, ledger: Ledger, store: LedgerStore, selector: Selector<R>) -> Self {
        SessionController {
            catalog,
            ledger,
            store,
            selector,
            state: SessionState::new(),
        }
    }

    /// Pick the first sentence unless one is already current
    pub fn start(&mut self) -> Result<usize> {
        if let Some(index) = self.state.current_index {
            return Ok(index);
        }
        let index = self.selector.pick(&self.catalog, &self.ledger)?;
        self.state.advance(index);
        self.state.start();
        info!(sentences = self.catalog.len(), "session started");
        Ok(index)
    }

    /// Check `submitted` against the current sentence, record and persist
    /// the result.
    ///
    /// On a persistence failure the in-memory ledger and state already hold
    /// the result; only the write is lost.
    pub fn check(&mut self, submitted: &str) -> Result<Feedback> {
        if self.state.phase != Phase::AwaitingAnswer {
            return Err(TrainerError::InvalidTransition {
                action: "check",
                phase: self.state.phase.as_str(),
            });
        }
        let index = self.start()?;
        let pair = self
            .catalog
            .get(index)
            .cloned()
            .ok_or(TrainerError::EmptyCatalog)?;

        let correct = answers_match(submitted, &pair.target_text);
        if let Some(position) = self.ledger.position(&pair.source_text) {
            self.ledger.record_result(position, correct);
        }
        self.state.record_check(&pair.source_text, correct);
        debug!(index, correct, "answer checked");

        self.store.persist(&mut self.ledger)?;

        Ok(if correct {
            Feedback::Correct
        } else {
            Feedback::Incorrect {
                expected: pair.target_text,
            }
        })
    }

    /// Move to a freshly picked sentence
    pub fn next(&mut self) -> Result<usize> {
        let index = self.selector.pick(&self.catalog, &self.ledger)?;
        self.state.advance(index);
        self.state.start();
        Ok(index)
    }

    #[allow(dead_code)]
    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index
    }

    pub fn current_pair(&self) -> Option<&SentencePair> {
        self.state.current_index.and_then(|i| self.catalog.get(i))
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Source text of the most recently checked sentence
    pub fn last_checked(&self) -> Option<&str> {
        self.state.last_checked_source_text.as_deref()
    }

    #[allow(dead_code)]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn summary(&self) -> SessionSummary {
        self.state.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerColumns;
    use tempfile::TempDir;

    fn controller(dir: &TempDir, pairs: &[(&str, &str)]) -> SessionController {
        let catalog = Catalog::new(pairs.iter().map(|(s, t)| SentencePair::new(*s, *t)).collect());
        let store = LedgerStore::new(dir.path().join("desempenho.csv"), LedgerColumns::default());
        let ledger = store.load_or_init(&catalog).unwrap();
        SessionController::new(catalog, ledger, store, Selector::seeded(3))
    }

    /// Keep calling `next` until the sentence at `index` is current
    fn go_to(ctl: &mut SessionController, index: usize) {
        while ctl.current_index() != Some(index) {
            ctl.next().unwrap();
        }
    }

    #[test]
    fn test_correct_then_incorrect() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(&dir, &[("Olá", "Hello"), ("Bom dia", "Good morning")]);
        ctl.start().unwrap();

        go_to(&mut ctl, 0);
        assert_eq!(ctl.check("hello").unwrap(), Feedback::Correct);
        assert_eq!(ctl.ledger().lookup("Olá").unwrap().successes, 1);

        go_to(&mut ctl, 1);
        assert_eq!(
            ctl.check("bom dia").unwrap(),
            Feedback::Incorrect {
                expected: "Good morning".to_string()
            }
        );
        assert_eq!(ctl.ledger().lookup("Bom dia").unwrap().failures, 1);
        assert_eq!(ctl.last_checked(), Some("Bom dia"));
    }

    #[test]
    fn test_padded_answer_is_correct() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(&dir, &[("Olá", "hello")]);
        ctl.start().unwrap();
        assert!(ctl.check("  Hello  ").unwrap().is_correct());
    }

    #[test]
    fn test_check_persists_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(&dir, &[("Sim", "Yes")]);
        ctl.start().unwrap();
        ctl.check("no").unwrap();

        let store = LedgerStore::new(dir.path().join("desempenho.csv"), LedgerColumns::default());
        let reloaded = store.load_or_init(ctl.catalog()).unwrap();
        let entry = reloaded.lookup("Sim").unwrap();
        assert_eq!((entry.successes, entry.failures, entry.accuracy), (0, 1, 0.0));
    }

    #[test]
    fn test_double_check_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(&dir, &[("Sim", "Yes")]);
        ctl.start().unwrap();
        ctl.check("yes").unwrap();

        let err = ctl.check("yes").unwrap_err();
        assert!(matches!(err, TrainerError::InvalidTransition { action: "check", .. }));
        assert_eq!(ctl.ledger().entries()[0].successes, 1);
    }

    #[test]
    fn test_next_clears_checked_marker() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(&dir, &[("Sim", "Yes"), ("Não", "No")]);
        ctl.start().unwrap();
        ctl.check("?").unwrap();
        assert_eq!(ctl.phase(), Phase::Checked);

        ctl.next().unwrap();
        assert_eq!(ctl.phase(), Phase::AwaitingAnswer);
        assert!(ctl.current_pair().is_some());
    }

    #[test]
    fn test_skip_while_awaiting() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(&dir, &[("Sim", "Yes"), ("Não", "No")]);
        ctl.start().unwrap();
        ctl.next().unwrap();
        assert_eq!(ctl.phase(), Phase::AwaitingAnswer);
        assert_eq!(ctl.summary().checks, 0);
    }

    #[test]
    fn test_start_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(&dir, &[("a", "a"), ("b", "b"), ("c", "c")]);
        let first = ctl.start().unwrap();
        assert_eq!(ctl.start().unwrap(), first);
    }

    #[test]
    fn test_empty_catalog_cannot_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(&dir, &[]);
        assert!(matches!(ctl.start().unwrap_err(), TrainerError::EmptyCatalog));
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(vec![SentencePair::new("Sim", "Yes")]);
        let target = dir.path().join("ledger");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("x"), "").unwrap();
        let store = LedgerStore::new(&target, LedgerColumns::default());
        let ledger = Ledger::fresh(&catalog);
        let mut ctl = SessionController::new(catalog, ledger, store, Selector::seeded(1));
        ctl.start().unwrap();

        let err = ctl.check("yes").unwrap_err();
        assert!(matches!(err, TrainerError::PersistenceFailure { .. }));
        assert_eq!(ctl.ledger().entries()[0].successes, 1);
        assert_eq!(ctl.phase(), Phase::Checked);
    }
}
