//! Next-word prediction from an n-gram frequency store.
//!
//! For each call the predictor looks the preceding words up in the store,
//! using the longest context first and dropping the oldest word until either
//! enough candidates were found or no context is left. When part of the next
//! word has been typed, candidates must start with it, with one of its
//! misspellings, or with a one-character-longer spelling of either.
use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use self::worker::PredictionWorker;
use crate::predictor::prediction::Prediction;
use crate::store::{self, FrequencyStore, StoreError, StoreMetadata};
use crate::types::Score;

pub mod prediction;
mod worker;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PredictorConfig {
    /// Number of preceding words used as context.
    pub max_context: usize,
    /// Factor applied to stored scores per context word.
    pub context_multiplier: Score,
    /// Smallest per-context-word factor. At 0, candidates found without
    /// context all score 0 and are ordered by wordform alone.
    pub min_context_weight: Score,
    /// Factor applied when a candidate equals the typed word.
    pub full_word_multiplier: Score,
    /// Shortest prefix that gets single-character wildcard variants.
    pub min_wildcard_len: usize,
    /// Shortest prefix looked up among alternate surface forms.
    pub min_cross_prefix_len: usize,
    /// Re-case predictions to match the typed prefix.
    pub case_handling: bool,
}

impl PredictorConfig {
    pub const fn default() -> PredictorConfig {
        PredictorConfig {
            max_context: 4,
            context_multiplier: 10,
            min_context_weight: 1,
            full_word_multiplier: 2,
            min_wildcard_len: 3,
            min_cross_prefix_len: 2,
            case_handling: true,
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        PredictorConfig::default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    /// `predict` was called before a store was opened.
    #[error("Predictor has no store; call initialize first")]
    NotInitialized,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the store handle and answers prediction requests.
///
/// Predictions from several threads run against the store concurrently;
/// opening and closing the store waits for them to finish.
pub struct Predictor {
    config: PredictorConfig,
    store: RwLock<Option<Box<dyn FrequencyStore>>>,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl Predictor {
    pub fn new(config: PredictorConfig) -> Predictor {
        Predictor {
            config,
            store: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Opens the store at `location`. Does nothing if a store is already
    /// open.
    pub fn initialize(&self, location: &Path) -> Result<(), PredictorError> {
        let mut store = self.store.write();
        if store.is_some() {
            log::debug!("Store already open; ignoring {}", location.display());
            return Ok(());
        }

        *store = Some(store::open(location)?);
        log::info!("Opened store at {}", location.display());
        Ok(())
    }

    /// Uses an already opened store. Returns `false`, dropping `store`, if
    /// one is open already.
    pub fn initialize_with(&self, store: Box<dyn FrequencyStore>) -> bool {
        let mut current = self.store.write();
        if current.is_some() {
            return false;
        }

        *current = Some(store);
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.store.read().is_some()
    }

    pub fn metadata(&self) -> Option<StoreMetadata> {
        self.store.read().as_ref().and_then(|s| s.metadata().cloned())
    }

    /// Closes the store. The predictor can be initialized again later.
    pub fn cleanup(&self) {
        if self.store.write().take().is_some() {
            log::info!("Closed store");
        }
    }

    /// Predicts the word being typed.
    ///
    /// `context` holds the preceding words, oldest first, followed by the
    /// part of the next word typed so far (empty at the start of a word).
    /// At most `max_results` predictions are returned, best first.
    pub fn predict<S: AsRef<str>>(
        &self,
        context: &[S],
        max_results: usize,
    ) -> Result<Vec<Prediction>, PredictorError> {
        let guard = self.store.read();
        let store = guard.as_deref().ok_or(PredictorError::NotInitialized)?;

        if max_results == 0 {
            return Ok(vec![]);
        }

        let worker = PredictionWorker::new(store, &self.config, context, max_results);
        match worker.predict() {
            Ok(predictions) => Ok(predictions),
            Err(StoreError::Unavailable(reason)) => {
                log::warn!("Store unavailable, no predictions: {}", reason);
                Ok(vec![])
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::store::{NgramQuery, Row, TableStore};

    fn predictor(store: TableStore) -> Predictor {
        let predictor = Predictor::new(PredictorConfig::default());
        assert!(predictor.initialize_with(Box::new(store)));
        predictor
    }

    fn values(predictions: &[Prediction]) -> Vec<&str> {
        predictions.iter().map(|p| p.value()).collect()
    }

    /// Counts the queries made against a store.
    struct Recording {
        inner: TableStore,
        ngram_calls: Arc<AtomicUsize>,
    }

    impl FrequencyStore for Recording {
        fn ngrams(&self, query: &NgramQuery) -> Result<Vec<Row>, StoreError> {
            self.ngram_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.ngrams(query)
        }

        fn cross_wordforms(&self, query: &NgramQuery) -> Result<Vec<Row>, StoreError> {
            self.inner.cross_wordforms(query)
        }
    }

    struct Failing(fn() -> StoreError);

    impl FrequencyStore for Failing {
        fn ngrams(&self, _query: &NgramQuery) -> Result<Vec<Row>, StoreError> {
            Err((self.0)())
        }

        fn cross_wordforms(&self, _query: &NgramQuery) -> Result<Vec<Row>, StoreError> {
            Err((self.0)())
        }
    }

    #[test]
    fn longer_context_wins() {
        let store = TableStore::from_rows(
            vec![("da iawn", "bore", 100), ("iawn", "bore", 50), ("iawn", "braf", 500)],
            vec![],
        );
        let predictor = predictor(store);

        let predictions = predictor.predict(&["da", "iawn", ""], 5).unwrap();
        assert_eq!(values(&predictions), vec!["bore", "braf"]);
        assert_eq!(predictions[0].context_len, 2);
        assert_eq!(predictions[0].score, 2000);
        assert_eq!(predictions[1].context_len, 1);
    }

    #[test]
    fn prefix_filters_candidates() {
        let store = TableStore::from_rows(
            vec![("", "bore", 100), ("", "braf", 500), ("", "yn", 1000), ("", "fory", 1)],
            vec![],
        );
        let predictor = predictor(store);

        let predictions = predictor.predict(&["bo"], 5).unwrap();
        assert_eq!(values(&predictions), vec!["bore", "fory"]);

        let predictions = predictor.predict(&["Bo"], 5).unwrap();
        assert_eq!(values(&predictions)[0], "Bore");
    }

    #[test]
    fn wildcard_finds_missing_letter() {
        let store = TableStore::from_rows(vec![("", "bore", 100)], vec![]);
        let predictor = predictor(store);

        assert_eq!(values(&predictor.predict(&["bre"], 5).unwrap()), vec!["bore"]);
        assert!(predictor.predict(&["br"], 5).unwrap().is_empty());
    }

    #[test]
    fn full_word_ranks_first() {
        let store = TableStore::from_rows(
            vec![("da", "bore", 10), ("da", "boreau", 12)],
            vec![],
        );
        let predictor = predictor(store);

        let predictions = predictor.predict(&["da", "bore"], 5).unwrap();
        assert_eq!(values(&predictions), vec!["bore", "boreau"]);
        assert_eq!(predictions[0].score, 200);
        assert_eq!(predictions[1].score, 120);
    }

    #[test]
    fn cross_wordforms_keep_larger_key() {
        let store = TableStore::from_rows(
            vec![("yn", "fory", 30), ("yn", "bore", 20), ("", "bore", 40)],
            vec![("bore", "fore", 5)],
        );
        let predictor = predictor(store);

        let predictions = predictor.predict(&["yn", "fo"], 5).unwrap();
        assert_eq!(values(&predictions), vec!["fory", "bore"]);
        assert_eq!(predictions[0].score, 300);
        assert_eq!(predictions[1].context_len, 0);
        assert_eq!(predictions[1].score, 450);
    }

    #[test]
    fn short_prefix_skips_cross_wordforms() {
        let store = TableStore::from_rows(vec![("", "bore", 40)], vec![("bore", "fore", 5)]);
        let predictor = predictor(store);
        assert!(predictor.predict(&["f"], 5).unwrap().is_empty());
    }

    #[test]
    fn result_cap() {
        let rows = (0..50)
            .map(|i| ("", format!("gair{}", i), i as Score))
            .map(|(c, w, s)| (c.to_string(), w, s))
            .collect::<Vec<_>>();
        let predictor = predictor(TableStore::from_rows(rows, vec![]));

        for max in [0, 1, 3, 10, 100].iter() {
            let predictions = predictor.predict(&[""], *max).unwrap();
            assert!(predictions.len() <= *max);
        }
        assert_eq!(predictor.predict(&[""], 3).unwrap()[0].value(), "gair49");
    }

    #[test]
    fn deterministic() {
        let store = TableStore::from_rows(
            vec![("", "ac", 10), ("", "am", 10), ("", "at", 10), ("", "a", 10)],
            vec![],
        );
        let predictor = predictor(store);

        let first = predictor.predict(&["a"], 10).unwrap();
        for _ in 0..10 {
            assert_eq!(predictor.predict(&["a"], 10).unwrap(), first);
        }
        assert_eq!(values(&first), vec!["a", "ac", "am", "at"]);
    }

    #[test]
    fn relaxation_terminates() {
        let calls = Arc::new(AtomicUsize::new(0));
        let predictor = Predictor::new(PredictorConfig::default());
        predictor.initialize_with(Box::new(Recording {
            inner: TableStore::default(),
            ngram_calls: Arc::clone(&calls),
        }));

        for (words, expected) in [(0usize, 1usize), (1, 2), (3, 4), (4, 5), (9, 5)].iter() {
            calls.store(0, Ordering::SeqCst);
            let mut context = vec!["gair"; *words];
            context.push("");
            assert!(predictor.predict(&context[..], 5).unwrap().is_empty());
            assert_eq!(calls.load(Ordering::SeqCst), *expected);
            assert!(calls.load(Ordering::SeqCst) <= words + 1);
        }
    }

    #[test]
    fn lifecycle() {
        let predictor = Predictor::new(PredictorConfig::default());
        assert!(matches!(
            predictor.predict(&[""], 5),
            Err(PredictorError::NotInitialized)
        ));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            predictor.initialize(&dir.path().join("missing")),
            Err(PredictorError::Store(StoreError::Io { .. }))
        ));
        assert!(!predictor.is_initialized());

        std::fs::write(dir.path().join("ngrams.tsv"), "\tyn\t10\n").unwrap();
        predictor.initialize(dir.path()).unwrap();
        predictor.initialize(dir.path()).unwrap();
        assert!(!predictor.initialize_with(Box::new(TableStore::default())));
        assert_eq!(values(&predictor.predict(&[""], 5).unwrap()), vec!["yn"]);

        predictor.cleanup();
        assert!(!predictor.is_initialized());
        assert!(matches!(
            predictor.predict(&[""], 5),
            Err(PredictorError::NotInitialized)
        ));
    }

    #[test]
    fn unavailable_store_gives_no_predictions() {
        let predictor = Predictor::new(PredictorConfig::default());
        predictor.initialize_with(Box::new(Failing(|| StoreError::Unavailable("gone".into()))));
        assert!(predictor.predict(&["da", ""], 5).unwrap().is_empty());
    }

    #[test]
    fn contract_violation_fails_the_call() {
        let predictor = Predictor::new(PredictorConfig::default());
        predictor.initialize_with(Box::new(Failing(|| {
            StoreError::ContractViolation("score".into())
        })));
        assert!(matches!(
            predictor.predict(&["da", ""], 5),
            Err(PredictorError::Store(StoreError::ContractViolation(_)))
        ));
        assert!(predictor.is_initialized());
    }

    #[test]
    fn shared_between_threads() {
        let store = TableStore::from_rows(vec![("", "yn", 10), ("", "a", 5)], vec![]);
        let predictor = Arc::new(predictor(store));

        let handles = (0..4)
            .map(|_| {
                let predictor = Arc::clone(&predictor);
                std::thread::spawn(move || predictor.predict(&[""], 5).unwrap())
            })
            .collect::<Vec<_>>();

        for handle in handles {
            assert_eq!(values(&handle.join().unwrap()), vec!["yn", "a"]);
        }
    }

    #[test]
    fn large_scores_saturate() {
        let store = TableStore::from_rows(
            vec![("da iawn", "bore", Score::MAX / 4), ("iawn", "braf", 7)],
            vec![],
        );
        let predictor = predictor(store);

        let predictions = predictor.predict(&["da", "iawn", ""], 5).unwrap();
        assert_eq!(values(&predictions), vec!["bore", "braf"]);
        assert_eq!(predictions[0].score, Score::MAX);
        assert_eq!(predictions[1].score, 70);

        let predictions = predictor.predict(&["da", "iawn", "bore"], 5).unwrap();
        assert_eq!(predictions[0].score, Score::MAX);
    }

    #[test]
    fn zero_context_weight_orders_by_wordform() {
        let store = TableStore::from_rows(
            vec![("", "braf", 500), ("", "bore", 100), ("nos", "da", 3)],
            vec![],
        );
        let mut config = PredictorConfig::default();
        config.min_context_weight = 0;
        let predictor = Predictor::new(config);
        predictor.initialize_with(Box::new(store));

        let predictions = predictor.predict(&[""], 5).unwrap();
        assert_eq!(values(&predictions), vec!["bore", "braf"]);
        assert!(predictions.iter().all(|p| p.score == 0));

        let predictions = predictor.predict(&["nos", ""], 5).unwrap();
        assert_eq!(values(&predictions), vec!["da", "bore", "braf"]);
        assert_eq!(predictions[0].score, 30);
    }

    #[test]
    fn forms_differing_in_case_count_once() {
        let store = TableStore::from_rows(
            vec![("da", "bore", 50), ("da", "Bore", 40), ("", "bord", 10)],
            vec![],
        );
        let predictor = predictor(store);

        let predictions = predictor.predict(&["da", "Bo"], 2).unwrap();
        assert_eq!(values(&predictions), vec!["Bore", "Bord"]);
        assert_eq!(predictions[0].score, 400);
        assert_eq!(predictions[1].context_len, 0);
    }

    /// Answers a query only once a second query is in progress.
    struct Rendezvous(std::sync::Barrier);

    impl FrequencyStore for Rendezvous {
        fn ngrams(&self, _query: &NgramQuery) -> Result<Vec<Row>, StoreError> {
            self.0.wait();
            Ok(vec![])
        }

        fn cross_wordforms(&self, _query: &NgramQuery) -> Result<Vec<Row>, StoreError> {
            Ok(vec![])
        }
    }

    #[test]
    fn predictions_run_concurrently() {
        let predictor = Arc::new(Predictor::new(PredictorConfig::default()));
        predictor.initialize_with(Box::new(Rendezvous(std::sync::Barrier::new(2))));

        let handles = (0..2)
            .map(|_| {
                let predictor = Arc::clone(&predictor);
                std::thread::spawn(move || predictor.predict(&[""], 5).unwrap())
            })
            .collect::<Vec<_>>();

        for handle in handles {
            assert!(handle.join().unwrap().is_empty());
        }
    }
}
