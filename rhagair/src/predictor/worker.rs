use hashbrown::HashMap;
use itertools::Itertools;
use smol_str::SmolStr;

use super::PredictorConfig;
use crate::predictor::prediction::{Prediction, RankKey};
use crate::spelling;
use crate::store::{glob, FrequencyStore, NgramQuery, Row, StoreError};
use crate::tokenizer::case_handling::{normalize, CaseMutation};
use crate::types::{Magnitude, Score};
use crate::wildcard;

#[inline(always)]
fn with_wildcards(member: &str, min_len: usize, patterns: &mut Vec<String>) {
    patterns.push(glob::prefix(member));
    if member.chars().count() >= min_len {
        patterns.extend(wildcard::expand(member).into_iter().map(|p| p + "*"));
    }
}

/// Patterns for the word being typed, its normalized form and the
/// misspellings that lead to it.
fn prefix_patterns(prefix: &str, config: &PredictorConfig) -> Vec<String> {
    let mut patterns = vec![];

    let members = std::iter::once(SmolStr::new(prefix))
        .chain(std::iter::once(normalize(prefix)))
        .chain(spelling::generate(prefix, prefix).into_iter().map(|v| v.mistake))
        .filter(|m| !m.is_empty())
        .unique();

    for member in members {
        with_wildcards(&member, config.min_wildcard_len, &mut patterns);
    }

    patterns.into_iter().unique().collect()
}

/// Patterns matched against alternate surface forms: only the literal
/// prefix and its wildcard expansions.
fn cross_patterns(prefix: &str, config: &PredictorConfig) -> Vec<String> {
    let mut patterns = vec![];
    with_wildcards(prefix, config.min_wildcard_len, &mut patterns);
    patterns
}

pub(crate) struct PredictionWorker<'a> {
    store: &'a dyn FrequencyStore,
    config: &'a PredictorConfig,
    prefix: SmolStr,
    window: Vec<SmolStr>,
    max_results: usize,
}

impl<'a> PredictionWorker<'a> {
    pub(crate) fn new<S: AsRef<str>>(
        store: &'a dyn FrequencyStore,
        config: &'a PredictorConfig,
        context: &[S],
        max_results: usize,
    ) -> PredictionWorker<'a> {
        let (prefix, preceding) = match context.split_last() {
            Some((last, rest)) => (SmolStr::new(last.as_ref()), rest),
            None => (SmolStr::default(), &[][..]),
        };

        let preceding = preceding
            .iter()
            .map(|w| w.as_ref())
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>();
        let start = preceding.len().saturating_sub(config.max_context);
        let window = preceding[start..].iter().map(|w| SmolStr::new(w)).collect();

        PredictionWorker {
            store,
            config,
            prefix,
            window,
            max_results,
        }
    }

    #[inline(always)]
    fn weighted(&self, row: &Row, magnitude: Magnitude) -> Score {
        let context_weight = (-magnitude).max(self.config.min_context_weight);
        let mut score = row
            .score
            .saturating_mul(context_weight)
            .saturating_mul(self.config.context_multiplier);
        if !self.prefix.is_empty() && normalize(&row.wordform) == normalize(&self.prefix) {
            score = score.saturating_mul(self.config.full_word_multiplier);
        }
        score
    }

    fn query(&self, patterns: &[String], remaining: usize) -> NgramQuery {
        NgramQuery {
            context: SmolStr::from(self.window.join(" ")),
            patterns: patterns.to_vec(),
            exact: Some(self.prefix.clone()).filter(|p| !p.is_empty()),
            limit: remaining,
        }
    }

    pub(crate) fn predict(mut self) -> Result<Vec<Prediction>, StoreError> {
        log::trace!("Beginning predict for {:?} after {:?}", self.prefix, self.window);

        let (primary, secondary) = if self.prefix.is_empty() {
            (vec![], None)
        } else {
            let secondary = if self.prefix.chars().count() >= self.config.min_cross_prefix_len {
                Some(cross_patterns(&self.prefix, self.config))
            } else {
                None
            };
            (prefix_patterns(&self.prefix, self.config), secondary)
        };

        let mutation = if self.config.case_handling {
            CaseMutation::of(&self.prefix)
        } else {
            CaseMutation::None
        };

        // Keyed by the form shown to the user, so forms differing only in
        // case count once.
        let mut best: HashMap<SmolStr, RankKey> = HashMap::new();

        loop {
            let magnitude = -(self.window.len() as Magnitude);

            let rows = self
                .store
                .ngrams(&self.query(&primary, self.max_results - best.len()))?;
            log::debug!(
                "context {:?}: {} rows from ngrams",
                self.window.join(" "),
                rows.len()
            );

            for row in rows {
                let key = RankKey {
                    magnitude,
                    score: self.weighted(&row, magnitude),
                };

                best.entry(mutation.apply(&row.wordform))
                    .and_modify(|entry| {
                        if key < *entry {
                            *entry = key
                        }
                    })
                    .or_insert(key);
            }

            let remaining = self.max_results.saturating_sub(best.len());
            if let (Some(patterns), true) = (secondary.as_ref(), remaining > 0) {
                let rows = self.store.cross_wordforms(&self.query(patterns, remaining))?;
                log::debug!(
                    "context {:?}: {} rows from cross_wordforms",
                    self.window.join(" "),
                    rows.len()
                );

                for row in rows {
                    let key = RankKey {
                        magnitude,
                        score: self.weighted(&row, magnitude),
                    };

                    best.entry(mutation.apply(&row.wordform))
                        .and_modify(|entry| {
                            if key > *entry {
                                *entry = key
                            }
                        })
                        .or_insert(key);
                }
            }

            if best.len() >= self.max_results || self.window.is_empty() {
                break;
            }

            self.window.remove(0);
        }

        let mut out = best.into_iter().collect::<Vec<_>>();
        out.sort_by(|(a, a_key), (b, b_key)| a_key.presentation_cmp(b_key).then_with(|| a.cmp(b)));
        out.truncate(self.max_results);

        Ok(out
            .into_iter()
            .map(|(value, key)| Prediction::new(value, key))
            .collect())
    }
}
