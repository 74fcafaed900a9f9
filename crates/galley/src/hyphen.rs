//! Liang hyphenation over a fixed pattern table.
//!
//! Patterns are the classic interleaved form: letters with inter-letter
//! digit weights, `.` anchoring a word boundary. A break is legal where
//! the maximum weight over all matching patterns is odd. Pattern
//! *compilation* from .tex pattern files is out of scope; the built-in
//! table is a compact English subset, process-wide and read-only after
//! first use.

use std::collections::HashMap;
use std::sync::OnceLock;

/// No break in the first `LEFT_MIN` or last `RIGHT_MIN` letters of a word.
pub const LEFT_MIN: usize = 2;
pub const RIGHT_MIN: usize = 3;

/// The built-in English subset.
const DEFAULT_PATTERNS: &[&str] = &[
    ".hy3ph", "he2n", "hena4", "hen5at", "1na", "n2at", "1tio", "2io", "o2n", "1ba", "1be",
    "1ca", "1co", "1cu", "1da", "1de", "1di", "1do", "4du.", "1fa", "1fi", "1ga", "1ge", "1gi",
    "1go", "1la", "1le", "1li", "1lo", "1lu", "1ma", "1me", "1mi", "1mo", "1mu", "1pa", "1pe",
    "1po", "1ra", "1re", "1ri", "1ro", "1ru", "1sa", "1se", "1si", "1so", "1su", "1ta", "1te",
    "1to", "1tu", "1va", "1vi", "1vo", "2ss", "s2t", "2ck", "c2k1", "4tion", "ti2o", "2tl",
    "m2p", "2mp.", "com1", "con1", "per1", "pro1", "wo2", "4ing.", "4ed.", "4er.", "4ers.",
];

/// A compiled pattern table.
pub struct Patterns {
    /// Pattern letters (with boundary dots) to weights. `weights[i]` sits
    /// before `letters[i]`; one trailing weight follows the last letter.
    map: HashMap<Vec<u8>, Vec<u8>>,
    max_len: usize,
}

impl Patterns {
    pub fn from_patterns(patterns: &[&str]) -> Patterns {
        let mut map = HashMap::new();
        let mut max_len = 0;
        for p in patterns {
            let mut letters = Vec::new();
            let mut weights = vec![0u8];
            for b in p.bytes() {
                if b.is_ascii_digit() {
                    if let Some(w) = weights.last_mut() {
                        *w = b - b'0';
                    }
                } else {
                    letters.push(b.to_ascii_lowercase());
                    weights.push(0);
                }
            }
            max_len = max_len.max(letters.len());
            map.insert(letters, weights);
        }
        Patterns { map, max_len }
    }

    /// The process-wide English table.
    pub fn english() -> &'static Patterns {
        static TABLE: OnceLock<Patterns> = OnceLock::new();
        TABLE.get_or_init(|| Patterns::from_patterns(DEFAULT_PATTERNS))
    }

    /// Legal break positions in `word`, as letter counts from the start
    /// ("hy-phen-ation" is `[2, 6]`). Non-alphabetic words never break.
    pub fn break_points(&self, word: &str) -> Vec<usize> {
        let n = word.chars().count();
        if n < LEFT_MIN + RIGHT_MIN || !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return Vec::new();
        }
        // Dotted, lowercased byte form: ".word."
        let mut dotted = Vec::with_capacity(n + 2);
        dotted.push(b'.');
        dotted.extend(word.bytes().map(|b| b.to_ascii_lowercase()));
        dotted.push(b'.');

        // points[i] = weight at the position after letter i of the word.
        let mut points = vec![0u8; n + 1];
        for start in 0..dotted.len() {
            let longest = self.max_len.min(dotted.len() - start);
            for len in 1..=longest {
                if let Some(weights) = self.map.get(&dotted[start..start + len]) {
                    for (k, w) in weights.iter().enumerate() {
                        // weights[k] sits before dotted[start + k]; letter j
                        // of the word is dotted[j + 1].
                        let pos = (start + k) as isize - 1;
                        if (0..=n as isize).contains(&pos) {
                            let pos = pos as usize;
                            points[pos] = points[pos].max(*w);
                        }
                    }
                }
            }
        }

        (LEFT_MIN..=n - RIGHT_MIN)
            .filter(|i| points[*i] % 2 == 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_weights_break_even_weights_inhibit() {
        let p = Patterns::from_patterns(&["1na", "1tio"]);
        assert_eq!(p.break_points("nation"), vec![2]); // na-tion

        let inhibited = Patterns::from_patterns(&["1ti", "2tio"]);
        assert_eq!(inhibited.break_points("rations"), Vec::<usize>::new());
    }

    #[test]
    fn boundary_anchored_patterns() {
        let p = Patterns::from_patterns(&[".re1"]);
        assert_eq!(p.break_points("remake"), vec![2]);
        // The anchored pattern does not fire mid-word.
        assert_eq!(p.break_points("caremake"), Vec::<usize>::new());
    }

    #[test]
    fn left_and_right_minimums() {
        let p = Patterns::from_patterns(&["a1b"]);
        // Break position 1 violates LEFT_MIN.
        assert_eq!(p.break_points("abcdef"), Vec::<usize>::new());
        // Position within the last three letters violates RIGHT_MIN.
        assert_eq!(p.break_points("ccabc"), Vec::<usize>::new());
        // Exactly RIGHT_MIN letters remain: allowed.
        assert_eq!(p.break_points("ccabcc"), vec![3]);
    }

    #[test]
    fn the_canonical_word() {
        assert_eq!(
            Patterns::english().break_points("hyphenation"),
            vec![2, 6] // hy-phen-ation
        );
    }

    #[test]
    fn short_and_nonalphabetic_words_never_break() {
        let p = Patterns::english();
        assert!(p.break_points("the").is_empty());
        assert!(p.break_points("co2").is_empty());
        assert!(p.break_points("").is_empty());
    }
}
