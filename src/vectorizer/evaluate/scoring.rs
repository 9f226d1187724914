use std::fmt::Debug;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    utils::{
        math::{l2_norm, safe_div},
        sort::{argmax_first, cmp_desc},
    },
    vectorizer::{corpus::CorpusStats, token::TermFrequency},
};

/// Lexical similarity algorithms
/// The two formulas are intentionally different and both are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityAlgorithm {
    /// Union-size normalized overlap
    /// sum(q * idf * p * idf) / (|q| + |p| - common), counted in distinct terms.
    /// A length-penalized overlap score, not a cosine: there is no square-root norm.
    UnionOverlap,
    /// True cosine similarity over IDF-weighted term vectors,
    /// accumulated through the inverted index
    #[default]
    #[serde(rename = "cosine")]
    CosineSimilarity,
}

/// Structure to store search results
pub struct Hits<K> {
    /// (key, score)
    pub list: Vec<(K, f64)>,
}

impl<K> Hits<K> {
    pub fn new(list: Vec<(K, f64)>) -> Self {
        Hits { list }
    }

    /// Sort results by descending score
    /// Stable: equal scores keep their current order. NaN scores are removed.
    pub fn sort_by_score(&mut self) -> &mut Self {
        self.list.retain(|(_, s)| !s.is_nan());
        self.list.sort_by(|a, b| cmp_desc(a.1, b.1));
        self
    }

    /// First entry with the maximum score, in current order
    pub fn best(&self) -> Option<&(K, f64)> {
        let scores: Vec<f64> = self.list.iter().map(|(_, s)| *s).collect();
        argmax_first(&scores).map(|idx| &self.list[idx])
    }

    /// Keep only the first `n` entries
    pub fn truncate(&mut self, n: usize) -> &mut Self {
        self.list.truncate(n);
        self
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl<K> Debug for Hits<K>
where
    K: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            writeln!(f, "Hits [")?;
            for (key, score) in &self.list {
                writeln!(f, "    {:?}: {:.6}", key, score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.list).finish()
        }
    }
}

impl CorpusStats {
    /// Score every candidate park (by row) against the query term counts.
    /// Every row gets a score; rows without shared terms score 0.
    pub fn similarity(&self, query: &TermFrequency, algorithm: SimilarityAlgorithm) -> Hits<usize> {
        let scores = match algorithm {
            SimilarityAlgorithm::UnionOverlap => self.scoring_union_overlap(query),
            SimilarityAlgorithm::CosineSimilarity => self.scoring_cosine(query),
        };
        Hits::new(scores.into_iter().enumerate().collect())
    }

    /// Direct dot product over each park's term map, normalized by union size
    fn scoring_union_overlap(&self, query: &TermFrequency) -> Vec<f64> {
        let query_len = query.term_num();
        self.term_frequencies
            .par_iter()
            .map(|park_terms| {
                let mut dot = 0_f64;
                let mut common = 0_usize;
                for (term, q_count) in query.iter() {
                    let p_count = park_terms.term_count(term);
                    if p_count == 0 {
                        continue;
                    }
                    let idf = self.idf.weight_or_zero(term);
                    dot += q_count as f64 * idf * p_count as f64 * idf;
                    common += 1;
                }
                let union = (query_len + park_terms.term_num()).saturating_sub(common);
                safe_div(dot, union as f64)
            })
            .collect()
    }

    /// Cosine similarity
    /// cos = q . p / (|q| |p|), both vectors TF x IDF weighted
    fn scoring_cosine(&self, query: &TermFrequency) -> Vec<f64> {
        let mut scores = vec![0_f64; self.park_num()];
        let mut query_weights = Vec::with_capacity(query.term_num());
        for (term, frequency) in query.iter() {
            let Some(idf) = self.idf.weight(term) else {
                continue;
            };
            query_weights.push(frequency as f64 * idf);
            for posting in self.inverted_index.postings(term) {
                scores[posting.row] += frequency as f64 * idf * posting.count as f64 * idf;
            }
        }
        let query_norm = l2_norm(query_weights);
        scores
            .into_iter()
            .zip(self.park_norms.iter())
            .map(|(dot, park_norm)| safe_div(dot, query_norm * park_norm))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{tests::park, GoodForKids, Park};

    fn stats(parks: &[Park]) -> CorpusStats {
        let refs: Vec<&Park> = parks.iter().collect();
        CorpusStats::build(&refs)
    }

    fn query(terms: &[&str]) -> TermFrequency {
        let mut freq = TermFrequency::new();
        freq.add_terms(terms);
        freq
    }

    #[test]
    fn union_overlap_matches_hand_computation() {
        let parks = vec![
            park("a", "FL", GoodForKids::No, &[("ride ride zoo", 5)]),
            park("b", "FL", GoodForKids::No, &[("coaster", 5)]),
        ];
        let stats = stats(&parks);
        // idf: ride 2/1, zoo 2/1, coaster 2/1
        let hits = stats.similarity(&query(&["ride"]), SimilarityAlgorithm::UnionOverlap);
        // park a: 1 * 2 * 2 * 2 = 8 over (1 + 2 - 1) = 2
        assert_eq!(hits.list, vec![(0, 4.0), (1, 0.0)]);
    }

    #[test]
    fn cosine_scores_are_bounded() {
        let parks = vec![
            park("a", "FL", GoodForKids::No, &[("roller coaster thrill ride", 5)]),
            park("b", "FL", GoodForKids::No, &[("petting zoo kids", 4)]),
            park("c", "FL", GoodForKids::No, &[("water ride zoo", 4)]),
        ];
        let stats = stats(&parks);
        let hits = stats.similarity(&query(&["ride", "zoo", "coaster"]), SimilarityAlgorithm::CosineSimilarity);
        assert_eq!(hits.len(), 3);
        for (_, score) in &hits.list {
            assert!((0.0..=1.0 + 1e-12).contains(score), "score {score} out of range");
        }
    }

    #[test]
    fn cosine_self_query_is_the_maximum() {
        let parks = vec![
            park("a", "FL", GoodForKids::No, &[("roller coaster thrill ride", 5)]),
            park("b", "FL", GoodForKids::No, &[("petting zoo kids ride", 4)]),
            park("c", "FL", GoodForKids::No, &[("water ride zoo coaster", 4)]),
        ];
        let stats = stats(&parks);
        for row in 0..parks.len() {
            let self_query = stats.term_frequencies[row].clone();
            let hits = stats.similarity(&self_query, SimilarityAlgorithm::CosineSimilarity);
            let (best_row, best_score) = *hits.best().unwrap();
            assert_eq!(best_row, row);
            assert!((best_score - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_overlap_scores_zero_for_both_algorithms() {
        let parks = vec![
            park("a", "FL", GoodForKids::No, &[("coaster", 5)]),
            park("b", "FL", GoodForKids::No, &[("zoo", 4)]),
        ];
        let stats = stats(&parks);
        for algorithm in [SimilarityAlgorithm::UnionOverlap, SimilarityAlgorithm::CosineSimilarity] {
            for q in [query(&["ghost"]), TermFrequency::new()] {
                let hits = stats.similarity(&q, algorithm);
                assert!(hits.list.iter().all(|(_, s)| *s == 0.0));
                assert_eq!(hits.best().map(|(row, _)| *row), Some(0));
            }
        }
    }

    #[test]
    fn hits_sort_is_stable_and_drops_nan() {
        let mut hits = Hits::new(vec![("a", 0.2), ("b", f64::NAN), ("c", 0.9), ("d", 0.2)]);
        hits.sort_by_score();
        assert_eq!(hits.list, vec![("c", 0.9), ("a", 0.2), ("d", 0.2)]);
        hits.truncate(1);
        assert_eq!(hits.len(), 1);
        assert!(Hits::<usize>::new(Vec::new()).best().is_none());
    }
}
