//! Single-character wildcard variants for fuzzy prefix search.
use crate::store::glob::escape_char;

/// The glob marker matching exactly one character.
pub const WILDCARD: char = '?';

/// Inserts one wildcard at each interior position of `s`.
///
/// For a string of `n` characters this yields `n - 2` patterns, the `i`-th
/// with the wildcard between characters `i - 1` and `i`. The literal
/// characters are glob-escaped, so the patterns can be handed to a store
/// as they are (append `*` for a prefix search). Strings shorter than
/// three characters have no interior positions.
pub fn expand(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 3 {
        return vec![];
    }

    (1..chars.len() - 1)
        .map(|gap| {
            let mut out = String::with_capacity(s.len() + 1);
            for (i, &ch) in chars.iter().enumerate() {
                if i == gap {
                    out.push(WILDCARD);
                }
                escape_char(ch, &mut out);
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::glob::matches;

    #[test]
    fn interior_positions() {
        assert_eq!(expand("bor"), vec!["b?or"]);
        assert_eq!(expand("bore"), vec!["b?ore", "bo?re"]);
        assert!(expand("bo").is_empty());
        assert!(expand("").is_empty());
    }

    #[test]
    fn counts_characters() {
        assert_eq!(expand("ŵyr"), vec!["ŵ?yr"]);
    }

    #[test]
    fn tolerates_one_extra_character() {
        let patterns: Vec<String> = expand("bre").into_iter().map(|p| p + "*").collect();
        assert!(patterns.iter().any(|p| matches(p, "bore")));
        assert!(!patterns.iter().any(|p| matches(p, "bre")));
    }

    #[test]
    fn escapes_literals() {
        assert_eq!(expand("a*c"), vec!["a?[*]c"]);
    }
}
