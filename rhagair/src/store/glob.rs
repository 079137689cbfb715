//! Glob patterns with the semantics of SQLite's `GLOB` operator.
//!
//! `*` matches any run of characters, `?` exactly one, and `[...]` one
//! character from a class (`[^...]` negates it). Matching is
//! case-sensitive.

/// Makes every character of `literal` match only itself.
pub fn escape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for ch in literal.chars() {
        escape_char(ch, &mut out);
    }
    out
}

#[inline(always)]
pub(crate) fn escape_char(ch: char, out: &mut String) {
    match ch {
        '*' | '?' | '[' => {
            out.push('[');
            out.push(ch);
            out.push(']');
        }
        _ => out.push(ch),
    }
}

/// A pattern matching every string that starts with `literal`.
pub fn prefix(literal: &str) -> String {
    let mut out = escape(literal);
    out.push('*');
    out
}

/// Parses a class at the start of `p` (which begins with `[`) and tests
/// `ch` against it. Returns whether it matched and the pattern length
/// consumed, or `None` if the class is unterminated.
fn match_class(p: &[char], ch: char) -> Option<(bool, usize)> {
    let mut i = 1;
    let negated = p.get(i) == Some(&'^');
    if negated {
        i += 1;
    }

    let mut matched = false;
    let mut first = true;
    while i < p.len() {
        let c = p[i];
        if c == ']' && !first {
            return Some((matched != negated, i + 1));
        }
        first = false;

        if p.get(i + 1) == Some(&'-') && p.get(i + 2).map_or(false, |&hi| hi != ']') {
            let hi = p[i + 2];
            matched |= c <= ch && ch <= hi;
            i += 3;
        } else {
            matched |= c == ch;
            i += 1;
        }
    }

    None
}

/// Tests whether `text` matches `pattern` as a whole.
pub fn matches(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() {
            let step = match p[pi] {
                '*' => {
                    backtrack = Some((pi, ti));
                    pi += 1;
                    continue;
                }
                '?' => Some(1),
                '[' => match match_class(&p[pi..], t[ti]) {
                    Some((true, len)) => Some(len),
                    Some((false, _)) => None,
                    None if t[ti] == '[' => Some(1),
                    None => None,
                },
                c if c == t[ti] => Some(1),
                _ => None,
            };

            if let Some(len) = step {
                pi += len;
                ti += 1;
                continue;
            }
        }

        match backtrack {
            Some((star, from)) => {
                pi = star + 1;
                ti = from + 1;
                backtrack = Some((star, from + 1));
            }
            None => return false,
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}
