//! A predicted next word.
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::types::{Magnitude, Score};

/// Rank of a candidate while predictions are being collected.
///
/// Keys compare by magnitude first, then by weighted score. A more negative
/// magnitude means the candidate was found with a longer context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RankKey {
    pub magnitude: Magnitude,
    pub score: Score,
}

impl RankKey {
    /// Final presentation order: longest context first, then highest
    /// score.
    pub fn presentation_cmp(&self, other: &RankKey) -> Ordering {
        self.magnitude
            .cmp(&other.magnitude)
            .then_with(|| other.score.cmp(&self.score))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A predicted word-form
pub struct Prediction {
    /// the predicted word-form
    pub value: SmolStr,
    /// weighted score of the prediction
    pub score: Score,
    /// number of context words the prediction was found with
    pub context_len: usize,
}

impl Prediction {
    pub(crate) fn new(value: SmolStr, key: RankKey) -> Prediction {
        Prediction {
            value,
            score: key.score,
            context_len: key.magnitude.unsigned_abs() as usize,
        }
    }

    /// gets the predicted word-form
    pub fn value(&self) -> &str {
        &self.value
    }

    /// gets the weighted score
    pub fn score(&self) -> Score {
        self.score
    }
}
