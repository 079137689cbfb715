use smol_str::SmolStr;

/// Accented letters and the base letter they fold to.
const DIACRITICS: &[(char, char)] = &[
    ('á', 'a'), ('à', 'a'), ('â', 'a'), ('ä', 'a'), ('ã', 'a'), ('å', 'a'),
    ('é', 'e'), ('è', 'e'), ('ê', 'e'), ('ë', 'e'),
    ('í', 'i'), ('ì', 'i'), ('î', 'i'), ('ï', 'i'),
    ('ó', 'o'), ('ò', 'o'), ('ô', 'o'), ('ö', 'o'), ('õ', 'o'),
    ('ú', 'u'), ('ù', 'u'), ('û', 'u'), ('ü', 'u'),
    ('ẃ', 'w'), ('ẁ', 'w'), ('ŵ', 'w'), ('ẅ', 'w'),
    ('ý', 'y'), ('ỳ', 'y'), ('ŷ', 'y'), ('ÿ', 'y'),
    ('ç', 'c'), ('ñ', 'n'), ('ś', 's'), ('ź', 'z'), ('ń', 'n'),
    ('Á', 'A'), ('À', 'A'), ('Â', 'A'), ('Ä', 'A'), ('Ã', 'A'), ('Å', 'A'),
    ('É', 'E'), ('È', 'E'), ('Ê', 'E'), ('Ë', 'E'),
    ('Í', 'I'), ('Ì', 'I'), ('Î', 'I'), ('Ï', 'I'),
    ('Ó', 'O'), ('Ò', 'O'), ('Ô', 'O'), ('Ö', 'O'), ('Õ', 'O'),
    ('Ú', 'U'), ('Ù', 'U'), ('Û', 'U'), ('Ü', 'U'),
    ('Ẃ', 'W'), ('Ẁ', 'W'), ('Ŵ', 'W'), ('Ẅ', 'W'),
    ('Ý', 'Y'), ('Ỳ', 'Y'), ('Ŷ', 'Y'), ('Ÿ', 'Y'),
    ('Ç', 'C'), ('Ñ', 'N'), ('Ś', 'S'), ('Ź', 'Z'), ('Ń', 'N'),
];

#[inline(always)]
pub fn lower_case(s: &str) -> SmolStr {
    s.chars()
        .map(|c| c.to_lowercase().collect::<String>())
        .collect::<SmolStr>()
}

#[inline(always)]
pub fn upper_case(s: &str) -> SmolStr {
    s.chars()
        .map(|c| c.to_uppercase().collect::<String>())
        .collect::<SmolStr>()
}

#[inline(always)]
pub fn upper_first(s: &str) -> SmolStr {
    let mut c = s.chars();
    match c.next() {
        None => SmolStr::new(""),
        Some(f) => SmolStr::from(f.to_uppercase().collect::<String>() + c.as_str()),
    }
}

#[inline(always)]
fn strip_char(ch: char) -> char {
    DIACRITICS
        .iter()
        .find(|(accented, _)| *accented == ch)
        .map(|(_, base)| *base)
        .unwrap_or(ch)
}

/// Replaces accented letters with their base letter, keeping case.
pub fn strip_diacritics(s: &str) -> SmolStr {
    s.chars().map(strip_char).collect()
}

/// Folds a word to the form used for matching: no diacritics, lower case.
pub fn normalize(s: &str) -> SmolStr {
    lower_case(&strip_diacritics(s))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMutation {
    FirstCaps,
    AllCaps,
    None,
}

impl CaseMutation {
    /// Detects how the user capitalised what they typed.
    ///
    /// All caps needs at least two letters, otherwise a single capital is
    /// treated as a capitalised first letter.
    pub fn of(word: &str) -> CaseMutation {
        let first_upper = word.chars().next().map_or(false, char::is_uppercase);
        if !first_upper {
            return CaseMutation::None;
        }

        let (count, all_upper) = word
            .chars()
            .filter(|c| c.is_alphabetic())
            .fold((0, true), |(n, upper), ch| (n + 1, upper && ch.is_uppercase()));

        if all_upper && count > 1 {
            CaseMutation::AllCaps
        } else {
            CaseMutation::FirstCaps
        }
    }

    /// Re-cases a prediction to match the input.
    pub fn apply(self, value: &str) -> SmolStr {
        match self {
            CaseMutation::FirstCaps => upper_first(value),
            CaseMutation::AllCaps => upper_case(value),
            CaseMutation::None => SmolStr::new(value),
        }
    }
}
