use std::fmt::Debug;

use indexmap::IndexMap;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};

/// Upper bound on stemming passes per word
const MAX_STEM_PASSES: usize = 8;

/// Tokenizer
/// Lower-cases text, splits it on alphabetic runs and reduces every run to
/// its English (Porter2) stem.
///
/// A single Porter2 pass is not idempotent (`early` -> `earli` -> `ear`), so
/// each word is stemmed until the output stops changing. Re-tokenizing a
/// term therefore always returns the same term.
///
/// Digits and punctuation only separate words, they never become terms.
/// Empty or non-alphabetic input yields an empty sequence.
///
/// # Examples
/// ```
/// use park_recommender::Tokenizer;
/// let tokenizer = Tokenizer::new();
/// assert_eq!(tokenizer.tokenize("Roller-coasters!"), vec!["roller", "coaster"]);
/// ```
pub struct Tokenizer {
    stemmer: Stemmer,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Split `text` into stemmed terms, in order of appearance
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        lowered
            .split(|c: char| !c.is_alphabetic())
            .filter(|word| !word.is_empty())
            .map(|word| self.stem(word))
            .collect()
    }

    /// Stem `word` to a fixed point
    fn stem(&self, word: &str) -> String {
        let mut current = word.to_string();
        for _ in 0..MAX_STEM_PASSES {
            let next = self.stemmer.stem(&current);
            if next == current.as_str() {
                break;
            }
            current = next.into_owned();
        }
        current
    }

    /// Tokenize `text` straight into a term frequency map
    pub fn term_frequency(&self, text: &str) -> TermFrequency {
        let mut freq = TermFrequency::new();
        freq.add_terms(&self.tokenize(text));
        freq
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer").field("algorithm", &"english").finish()
    }
}

/// TermFrequency struct
/// Counts how many times each term occurs in a piece of text
/// (a review, a park's aggregated reviews, or a query).
///
/// Terms keep their first-insertion order.
/// A term that was never added has an implicit count of 0.
///
/// # Examples
/// ```
/// use park_recommender::TermFrequency;
/// let mut term_freq = TermFrequency::new();
/// term_freq.add_term("ride");
/// term_freq.add_term("zoo");
/// term_freq.add_term("ride");
///
/// assert_eq!(term_freq.term_count("ride"), 2);
/// assert_eq!(term_freq.term_count("coaster"), 0);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TermFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    term_count: IndexMap<Box<str>, u32>,
}

/// Implementation for adding terms
impl TermFrequency {
    /// Create a new TermFrequency
    pub fn new() -> Self {
        TermFrequency {
            term_count: IndexMap::new(),
        }
    }

    /// Add a term
    ///
    /// # Arguments
    /// * `term` - term to add
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        self.add_term_count(term, 1)
    }

    /// Add multiple terms
    ///
    /// # Arguments
    /// * `terms` - Slice of terms to add
    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    /// Add `count` occurrences of a term at once
    #[inline]
    pub fn add_term_count(&mut self, term: &str, count: u32) -> &mut Self {
        if count == 0 {
            return self;
        }
        if let Some(existing) = self.term_count.get_mut(term) {
            *existing += count;
        } else {
            self.term_count.insert(Box::from(term), count);
        }
        self
    }

    /// Merge every count of `other` into self
    pub fn add_terms_from_freq(&mut self, other: &TermFrequency) -> &mut Self {
        for (term, &count) in other.term_count.iter() {
            self.add_term_count(term, count);
        }
        self
    }
}

/// Lookups
impl TermFrequency {
    /// Occurrence count of `term`, 0 when absent
    #[inline]
    pub fn term_count(&self, term: &str) -> u32 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    #[inline]
    pub fn contains_term(&self, term: &str) -> bool {
        self.term_count.contains_key(term)
    }

    /// Number of distinct terms
    #[inline]
    pub fn term_num(&self) -> usize {
        self.term_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_count.is_empty()
    }

    /// Iterate `(term, count)` in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.term_count.iter().map(|(term, &count)| (term.as_ref(), count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_stems() {
        let tokenizer = Tokenizer::new();
        assert_eq!(
            tokenizer.tokenize("Thrilling RIDES and Coasters"),
            vec!["thrill", "ride", "and", "coaster"]
        );
    }

    #[test]
    fn tokenize_splits_on_digits_and_punctuation() {
        let tokenizer = Tokenizer::new();
        assert_eq!(tokenizer.tokenize("zoo,kids...2024rides"), vec!["zoo", "kid", "ride"]);
    }

    #[test]
    fn tokenize_empty_and_non_alphabetic_input() {
        let tokenizer = Tokenizer::new();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("  123 !! -- 4.5 ").is_empty());
    }

    #[test]
    fn tokenize_is_idempotent_on_stems() {
        let tokenizer = Tokenizer::new();
        for word in [
            "rides", "coasters", "thrilling", "running", "parks", "water",
            "only", "early", "ugly", "agreed", "university", "universe", "scary",
        ] {
            let once = tokenizer.tokenize(word);
            assert_eq!(once.len(), 1);
            let twice = tokenizer.tokenize(&once[0]);
            assert_eq!(once, twice, "stem of {word} is not stable");
        }
    }

    #[test]
    fn multi_pass_stems_reach_a_fixed_point() {
        let tokenizer = Tokenizer::new();
        let words = "only early ugly agreed university";
        let once = tokenizer.tokenize(words);
        assert_eq!(once.len(), 5);
        assert_eq!(tokenizer.tokenize(&once.join(" ")), once);
        // both spellings land on the same term
        assert_eq!(tokenizer.tokenize("early"), tokenizer.tokenize("earli"));
    }

    #[test]
    fn term_frequency_counts_and_defaults_to_zero() {
        let mut freq = TermFrequency::new();
        freq.add_terms(&["ride", "zoo", "ride"]);
        assert_eq!(freq.term_count("ride"), 2);
        assert_eq!(freq.term_count("zoo"), 1);
        assert_eq!(freq.term_count("coaster"), 0);
        assert_eq!(freq.term_num(), 2);
        assert_eq!(freq.iter().collect::<Vec<_>>(), vec![("ride", 2), ("zoo", 1)]);
    }

    #[test]
    fn term_frequency_merge_and_zero_count() {
        let mut a = TermFrequency::new();
        a.add_terms(&["zoo", "kid"]);
        let mut b = TermFrequency::new();
        b.add_term("kid").add_term_count("pet", 3).add_term_count("ghost", 0);
        a.add_terms_from_freq(&b);
        assert_eq!(a.term_count("kid"), 2);
        assert_eq!(a.term_count("pet"), 3);
        assert!(!a.contains_term("ghost"));
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![("zoo", 1), ("kid", 2), ("pet", 3)]);
    }
}
