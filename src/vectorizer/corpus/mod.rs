use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use tracing::debug;

use crate::{
    catalog::Park,
    utils::math::l2_norm,
    vectorizer::{
        tfidf::{weighted_terms, TfIdf, WeightedTerms},
        token::TermFrequency,
        ParkRows,
    },
};

/// Total number of reviews across the candidate parks.
/// Reviews, not parks, are the documents of the IDF statistics.
pub fn document_count(parks: &[&Park]) -> u64 {
    parks.iter().map(|p| p.reviews.len() as u64).sum()
}

/// Per-park raw term counts, row-aligned with `parks`
pub fn term_frequencies(parks: &[&Park]) -> Vec<TermFrequency> {
    parks.par_iter().map(|p| p.term_frequency()).collect()
}

/// Per-park TF x IDF weights, row-aligned with `term_frequencies`
pub fn tfidf_frequencies(term_frequencies: &[TermFrequency], idf: &IdfTable) -> Vec<WeightedTerms> {
    let weighting = TfIdf(idf);
    term_frequencies
        .par_iter()
        .map(|freq| weighted_terms(freq, &weighting))
        .collect()
}

/// Vocabulary
/// Sorted set of every distinct term in the candidate parks' reviews.
/// Sorted order defines the column order of the term-park matrices.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: IndexSet<Box<str>>,
}

impl Vocabulary {
    pub fn from_parks(parks: &[&Park]) -> Self {
        let mut terms: Vec<&str> = parks
            .iter()
            .flat_map(|p| p.reviews.iter())
            .flat_map(|r| r.terms().iter().map(|(term, _)| term))
            .collect();
        terms.sort_unstable();
        terms.dedup();
        Self {
            terms: terms.into_iter().map(Box::from).collect(),
        }
    }

    #[inline]
    pub fn column_of(&self, term: &str) -> Option<usize> {
        self.terms.get_index_of(term)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.as_ref())
    }
}

/// IdfTable
/// term -> `document_count / reviews containing the term`.
///
/// Only terms that occur in at least one review have an entry, so every
/// weight is >= 1. Absence means "unknown term" and scores as zero.
#[derive(Debug, Clone, Default)]
pub struct IdfTable {
    weights: IndexMap<Box<str>, f64>,
}

impl IdfTable {
    pub fn from_parks(parks: &[&Park], doc_num: u64) -> Self {
        let mut doc_freq: IndexMap<Box<str>, u64> = IndexMap::new();
        for review in parks.iter().flat_map(|p| p.reviews.iter()) {
            // a review's term map holds each term once
            for (term, _) in review.terms().iter() {
                *doc_freq.entry(Box::from(term)).or_insert(0) += 1;
            }
        }
        let weights = doc_freq
            .into_iter()
            .map(|(term, count)| (term, doc_num as f64 / count as f64))
            .collect();
        Self { weights }
    }

    #[inline]
    pub fn weight(&self, term: &str) -> Option<f64> {
        self.weights.get(term).copied()
    }

    /// Weight of `term`, 0 for an unknown term
    #[inline]
    pub fn weight_or_zero(&self, term: &str) -> f64 {
        self.weight(term).unwrap_or(0.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub row: usize,
    pub count: u32,
}

/// InvertedIndex
/// term -> postings `(park row, occurrences in that park's reviews)`,
/// postings ordered by row.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: IndexMap<Box<str>, Vec<Posting>>,
}

impl InvertedIndex {
    /// Single pass over parks in row order; consecutive hits of the same park merge
    pub fn from_parks(parks: &[&Park]) -> Self {
        let mut postings: IndexMap<Box<str>, Vec<Posting>> = IndexMap::new();
        for (row, park) in parks.iter().enumerate() {
            for review in &park.reviews {
                for (term, count) in review.terms().iter() {
                    let list = postings.entry(Box::from(term)).or_default();
                    match list.last_mut() {
                        Some(last) if last.row == row => last.count += count,
                        _ => list.push(Posting { row, count }),
                    }
                }
            }
        }
        Self { postings }
    }

    /// Postings of `term`; empty for an unknown term
    #[inline]
    pub fn postings(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(|p| p.as_slice()).unwrap_or(&[])
    }
}

/// CorpusStats
/// Every text statistic of one candidate set, row-aligned through `rows`.
#[derive(Debug, Clone, Default)]
pub struct CorpusStats {
    pub rows: ParkRows,
    pub doc_num: u64,
    pub vocabulary: Vocabulary,
    pub idf: IdfTable,
    /// raw counts, the vector-space / SVD input
    pub term_frequencies: Vec<TermFrequency>,
    /// TF x IDF weights, the direct lexical scoring input
    pub tfidf_frequencies: Vec<WeightedTerms>,
    pub inverted_index: InvertedIndex,
    /// L2 norm of each park's TF x IDF vector
    pub park_norms: Vec<f64>,
}

impl CorpusStats {
    pub fn build(parks: &[&Park]) -> Self {
        let rows = ParkRows::from_parks(parks);
        let doc_num = document_count(parks);
        let vocabulary = Vocabulary::from_parks(parks);
        let idf = IdfTable::from_parks(parks, doc_num);
        let term_frequencies = term_frequencies(parks);
        let tfidf_frequencies = tfidf_frequencies(&term_frequencies, &idf);
        let inverted_index = InvertedIndex::from_parks(parks);
        let park_norms = tfidf_frequencies
            .iter()
            .map(|weights| l2_norm(weights.values().copied()))
            .collect();
        debug!(
            parks = rows.len(),
            reviews = doc_num,
            vocabulary = vocabulary.len(),
            "corpus statistics built"
        );
        Self {
            rows,
            doc_num,
            vocabulary,
            idf,
            term_frequencies,
            tfidf_frequencies,
            inverted_index,
            park_norms,
        }
    }

    #[inline]
    pub fn park_num(&self) -> usize {
        self.rows.len()
    }
}
