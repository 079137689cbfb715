//! Plausible misspellings of a correct Welsh word.
//!
//! Learners and fast typists confuse mutated initial consonants, vowel
//! digraphs that sound alike, and doubled consonants. The variants produced
//! here widen the prefix search so that a predicted word can still be found
//! when the user typed one of these forms.
use std::collections::BTreeSet;

use serde::Serialize;
use smol_str::SmolStr;

use crate::tokenizer::case_handling::normalize;
use crate::tokenizer::digraph::tokenize;

/// A misspelt form together with the correct form it stands for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SpellingVariant {
    pub mistake: SmolStr,
    pub correct: SmolStr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Initial,
    Final,
    Anywhere,
}

struct Rule {
    pattern: &'static str,
    anchor: Anchor,
    /// The match is skipped when one of these follows it directly.
    unless_followed_by: &'static [&'static str],
    replacements: &'static [&'static str],
}

const fn rule(pattern: &'static str, anchor: Anchor, replacements: &'static [&'static str]) -> Rule {
    Rule {
        pattern,
        anchor,
        unless_followed_by: &[],
        replacements,
    }
}

const fn initial_unless(
    pattern: &'static str,
    unless_followed_by: &'static [&'static str],
    replacements: &'static [&'static str],
) -> Rule {
    Rule {
        pattern,
        anchor: Anchor::Initial,
        unless_followed_by,
        replacements,
    }
}

use Anchor::*;

static RULES: &[Rule] = &[
    // Mutated initial consonants
    initial_unless("t", &["h"], &["d", "nh"]),
    initial_unless("c", &["h"], &["g", "ngh"]),
    initial_unless("p", &["h"], &["b", "mh"]),
    rule("b", Initial, &["f", "m"]),
    initial_unless("d", &["d"], &["dd", "n"]),
    rule("g", Initial, &["ng", ""]),
    rule("m", Initial, &["f"]),
    initial_unless("r", &["h"], &["rh"]),
    // Consonant digraphs heard as single letters or as each other
    rule("ch", Anywhere, &["c"]),
    rule("dd", Anywhere, &["th"]),
    rule("th", Anywhere, &["dd"]),
    rule("ff", Anywhere, &["f"]),
    rule("ll", Anywhere, &["l"]),
    rule("rh", Anywhere, &["r"]),
    rule("ph", Anywhere, &["ff"]),
    // Vowel digraphs
    rule("ae", Anywhere, &["ai", "au", "ay"]),
    rule("ai", Anywhere, &["ae", "au", "ay"]),
    rule("au", Anywhere, &["ae", "ai", "ay"]),
    rule("ay", Anywhere, &["ae", "ai", "au"]),
    rule("ei", Anywhere, &["eu", "ey"]),
    rule("eu", Anywhere, &["ei", "ey"]),
    rule("ey", Anywhere, &["ei", "eu"]),
    rule("oe", Anywhere, &["oi", "oy"]),
    rule("oi", Anywhere, &["oe", "oy"]),
    rule("oy", Anywhere, &["oe", "oi"]),
    rule("wy", Anywhere, &["wi"]),
    // Spoken plural endings
    rule("au", Final, &["a", "e"]),
];

impl Rule {
    /// Byte offset of the first place this rule applies to `word`.
    fn find(&self, word: &str) -> Option<usize> {
        let allowed = |at: usize| {
            let rest = &word[at + self.pattern.len()..];
            !self.unless_followed_by.iter().any(|f| rest.starts_with(f))
        };

        match self.anchor {
            Initial => Some(0).filter(|_| word.starts_with(self.pattern)).filter(|&at| allowed(at)),
            Final => word
                .strip_suffix(self.pattern)
                .map(|head| head.len())
                .filter(|&at| allowed(at)),
            Anywhere => word
                .match_indices(self.pattern)
                .map(|(at, _)| at)
                .find(|&at| allowed(at)),
        }
    }
}

/// Produces the misspellings of `wordform` that should still lead to it.
///
/// `lemma` picks the rule set used when splitting the word for the
/// deletion variants. The correct side of every pair is the normalized
/// `wordform`.
pub fn generate(wordform: &str, lemma: &str) -> BTreeSet<SpellingVariant> {
    let correct = normalize(wordform);
    let mut out = BTreeSet::new();

    for rule in RULES.iter() {
        let at = match rule.find(&correct) {
            Some(at) => at,
            None => continue,
        };

        let (head, tail) = correct.split_at(at);
        let tail = &tail[rule.pattern.len()..];

        for replacement in rule.replacements.iter() {
            let mistake = [head, *replacement, tail].concat();
            if mistake != correct.as_str() {
                out.insert(SpellingVariant {
                    mistake: SmolStr::from(mistake),
                    correct: correct.clone(),
                });
            }
        }
    }

    let units = tokenize(&correct, lemma);
    if units.len() > 2 {
        for skip in 1..units.len() - 1 {
            let mistake: SmolStr = units
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, unit)| unit.as_str())
                .collect();

            out.insert(SpellingVariant {
                mistake,
                correct: correct.clone(),
            });
        }
    }

    out
}
