use indexmap::IndexMap;
use nalgebra::DMatrix;

use crate::vectorizer::{
    corpus::{IdfTable, Vocabulary},
    token::TermFrequency,
};

/// term -> weight, for one park
pub type WeightedTerms = IndexMap<Box<str>, f64>;

/// Term weighting strategy
/// Turns a raw occurrence count into a matrix cell value.
///
/// Two strategies exist:
/// - `RawCount`: the count itself (input of the latent factorization)
/// - `TfIdf`: count x IDF weight (input of direct lexical scoring)
pub trait TermWeighting {
    fn weight(&self, term: &str, count: u32) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RawCount;

impl TermWeighting for RawCount {
    #[inline]
    fn weight(&self, _term: &str, count: u32) -> f64 {
        count as f64
    }
}

/// Unknown terms weigh 0
#[derive(Debug, Clone, Copy)]
pub struct TfIdf<'a>(pub &'a IdfTable);

impl TermWeighting for TfIdf<'_> {
    #[inline]
    fn weight(&self, term: &str, count: u32) -> f64 {
        count as f64 * self.0.weight_or_zero(term)
    }
}

/// Weigh every term of `freq`
pub fn weighted_terms<W: TermWeighting>(freq: &TermFrequency, weighting: &W) -> WeightedTerms {
    freq.iter()
        .map(|(term, count)| (Box::from(term), weighting.weight(term, count)))
        .collect()
}

/// Dense park x term matrix
/// Row `r` is `term_frequencies[r]`, column `c` is the `c`-th vocabulary term.
/// Terms outside the vocabulary are dropped.
pub fn weighted_matrix<W: TermWeighting>(
    term_frequencies: &[TermFrequency],
    vocabulary: &Vocabulary,
    weighting: &W,
) -> DMatrix<f64> {
    let mut mat = DMatrix::zeros(term_frequencies.len(), vocabulary.len());
    for (row, freq) in term_frequencies.iter().enumerate() {
        for (term, count) in freq.iter() {
            if let Some(col) = vocabulary.column_of(term) {
                mat[(row, col)] = weighting.weight(term, count);
            }
        }
    }
    mat
}

/// Raw term-frequency matrix
pub fn term_park_matrix(term_frequencies: &[TermFrequency], vocabulary: &Vocabulary) -> DMatrix<f64> {
    weighted_matrix(term_frequencies, vocabulary, &RawCount)
}

/// TF-IDF weighted matrix, same shape as [`term_park_matrix`]
pub fn tfidf_matrix(
    term_frequencies: &[TermFrequency],
    vocabulary: &Vocabulary,
    idf: &IdfTable,
) -> DMatrix<f64> {
    weighted_matrix(term_frequencies, vocabulary, &TfIdf(idf))
}
