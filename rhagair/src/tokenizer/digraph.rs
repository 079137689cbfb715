//! Splitting Welsh words into orthographic units.
//!
//! Welsh writes several single sounds with two letters (`ch`, `dd`, `ff`,
//! `ng`, `ll`, `ph`, `rh`, `th`). Whether a letter pair is a digraph or two
//! separate letters depends on the word: `Bangor` is `B-a-n-g-o-r`, while
//! `llong` is `ll-o-ng`. The rule set is chosen from the lemma.
use smol_str::SmolStr;

/// Digraphs in the order they are tried at each position.
pub const DIGRAPHS: [&str; 8] = ["ch", "dd", "ff", "ng", "ll", "ph", "rh", "th"];

/// Letters after which an interior `rh` is still a single unit.
const RH_TRIGGERS: [char; 5] = ['d', 'l', 'm', 'n', 't'];

/// Lemmas in which `rh` is a digraph wherever it occurs.
const NO_RH_SPLIT: &[&str] = &[
    "arhythmia",
    "arhythmig",
    "dirhwystr",
    "dirheswm",
    "dirhagfarn",
    "dirhodd",
    "gwrthrhyfel",
];

/// Lemmas in which an interior `n` + `g` are two letters.
const NG_SPLIT: &[&str] = &[
    "Bangor",
    "Llangefni",
    "Llangollen",
    "Llangrannog",
    "Llangynog",
    "Rhosllannerchrugog",
    "angor",
    "angori",
    "cangarŵ",
    "ffwngladdwr",
    "jyngl",
    "mangre",
    "mwnglawdd",
    "tangnefedd",
    "ungoes",
];

const NG_SPLIT_PREFIXES: &[&str] = &[
    "angio",
    "bwngler",
    "byngalo",
    "dyngar",
    "dyngas",
    "gwangalon",
    "mening",
];

/// Roots that keep `n` and `g` apart when a `g` follows them directly.
const NG_SPLIT_ROOTS: &[&str] = &[
    "llan", "blaen", "bon", "bron", "brown", "bryn", "calon", "cefn", "gwahan", "gwyn", "hunan",
    "llun", "mein", "mewn", "mwyn", "pan", "pen", "sein", "swyn", "teyrn", "un", "union",
];

/// Endings that, after an `n`, start a new morpheme with `g`.
const NG_SPLIT_ENDINGS: &[&str] = &["groen", "gar", "garwch", "gyfrif"];

/// The rule set used to split a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TokenizerVariant {
    /// Every digraph is a unit anywhere in the word.
    NoRhSplit,
    /// `rh` is only a unit at the start of the word or after `d`, `l`, `m`,
    /// `n` or `t`.
    Default,
    /// As [`TokenizerVariant::Default`], and `ng` is only a unit at either
    /// end of the word.
    NgSplit,
}

fn is_ng_split_lemma(lemma: &str) -> bool {
    if NG_SPLIT.contains(&lemma) {
        return true;
    }

    if NG_SPLIT_PREFIXES.iter().any(|p| lemma.starts_with(p)) {
        return true;
    }

    if lemma.starts_with("tang") && !lemma.starts_with("tangiad") {
        return true;
    }

    if NG_SPLIT_ROOTS
        .iter()
        .any(|root| lemma.strip_prefix(root).map_or(false, |rest| rest.starts_with('g')))
    {
        return true;
    }

    NG_SPLIT_ENDINGS.iter().any(|ending| {
        lemma
            .strip_suffix(ending)
            .map_or(false, |head| head.ends_with('n'))
    })
}

/// Picks the rule set for a lemma.
pub fn select_variant(lemma: &str) -> TokenizerVariant {
    if NO_RH_SPLIT.contains(&lemma) {
        TokenizerVariant::NoRhSplit
    } else if is_ng_split_lemma(lemma) {
        TokenizerVariant::NgSplit
    } else {
        TokenizerVariant::Default
    }
}

impl TokenizerVariant {
    /// Whether `digraph` may be read as one unit starting at char index
    /// `pos` of `chars`.
    fn allows(self, digraph: &str, chars: &[char], pos: usize) -> bool {
        match (self, digraph) {
            (TokenizerVariant::NoRhSplit, _) => true,
            (_, "rh") => {
                pos == 0
                    || chars[pos - 1]
                        .to_lowercase()
                        .any(|c| RH_TRIGGERS.contains(&c))
            }
            (TokenizerVariant::NgSplit, "ng") => pos == 0 || pos + 2 == chars.len(),
            _ => true,
        }
    }

    /// Splits `word` into units using this rule set.
    pub fn tokenize(self, word: &str) -> Vec<SmolStr> {
        let chars: Vec<char> = word.chars().collect();
        let mut units = Vec::with_capacity(chars.len());
        let mut pos = 0;

        while pos < chars.len() {
            let digraph = if pos + 1 < chars.len() {
                DIGRAPHS.iter().find(|d| {
                    let mut expected = d.chars();
                    matches_ignore_case(chars[pos], expected.next())
                        && matches_ignore_case(chars[pos + 1], expected.next())
                        && self.allows(d, &chars, pos)
                })
            } else {
                None
            };

            let width = if digraph.is_some() { 2 } else { 1 };
            units.push(chars[pos..pos + width].iter().copied().collect::<SmolStr>());
            pos += width;
        }

        units
    }
}

#[inline(always)]
fn matches_ignore_case(ch: char, expected: Option<char>) -> bool {
    match expected {
        Some(e) => ch == e || ch.to_lowercase().eq(std::iter::once(e)),
        None => false,
    }
}

/// Splits `word` into orthographic units, choosing the rule set from `lemma`.
///
/// The concatenation of the returned units is always equal to `word`.
pub fn tokenize(word: &str, lemma: &str) -> Vec<SmolStr> {
    select_variant(lemma).tokenize(word)
}

/// Splits a word that is its own lemma.
#[inline]
pub fn tokenize_word(word: &str) -> Vec<SmolStr> {
    tokenize(word, word)
}
