use smol_str::SmolStr;
use unic_segment::{WordBoundIndices, Words};

pub mod case_handling;
pub mod digraph;

pub use self::digraph::{select_variant, tokenize, tokenize_word, TokenizerVariant};

#[inline(always)]
fn is_word(s: &str) -> bool {
    s.chars().any(|ch| ch.is_alphanumeric())
}

pub trait Tokenize {
    fn word_bound_indices(&self) -> WordBoundIndices;

    /// Words of the text, oldest first.
    fn words(&self) -> Vec<SmolStr>;

    /// Words of the text followed by the word being typed.
    ///
    /// If the text ends between words, the last element is empty.
    fn context_words(&self) -> Vec<SmolStr>;
}

impl Tokenize for str {
    fn word_bound_indices(&self) -> WordBoundIndices {
        WordBoundIndices::new(self)
    }

    fn words(&self) -> Vec<SmolStr> {
        Words::new(self, |s| is_word(s)).map(SmolStr::new).collect()
    }

    fn context_words(&self) -> Vec<SmolStr> {
        let mut words = self.words();

        let ends_in_word = self
            .word_bound_indices()
            .last()
            .map_or(false, |(_, s)| is_word(s));
        if !ends_in_word {
            words.push(SmolStr::default());
        }

        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words() {
        assert_eq!("Bore da, sut wyt ti?".words(), vec!["Bore", "da", "sut", "wyt", "ti"]);
        assert_eq!("mynd i'r dre".words(), vec!["mynd", "i'r", "dre"]);
        assert_eq!("mae’n braf".words(), vec!["mae’n", "braf"]);
        assert!("  ".words().is_empty());
    }

    #[test]
    fn punctuation_is_not_a_word() {
        assert_eq!("bore - da".words(), vec!["bore", "da"]);
        assert_eq!("' ’ - -- da".words(), vec!["da"]);
        assert_eq!("bore - da ".context_words(), vec!["bore", "da", ""]);
        assert_eq!("bore - da".context_words(), vec!["bore", "da"]);
        assert_eq!("bore -".context_words(), vec!["bore", ""]);
        assert_eq!("bore '".context_words(), vec!["bore", ""]);
    }

    #[test]
    fn context_words() {
        assert_eq!("da iawn ".context_words(), vec!["da", "iawn", ""]);
        assert_eq!("da iaw".context_words(), vec!["da", "iaw"]);
        assert_eq!("".context_words(), vec![""]);
        assert_eq!("Diolch.".context_words(), vec!["Diolch", ""]);
    }
}
