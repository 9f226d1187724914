use nalgebra::DVector;

use crate::{
    utils::math::l2_norm,
    vectorizer::{corpus::Vocabulary, token::TermFrequency},
};

/// Query
/// A tokenized query restricted to one candidate vocabulary.
///
/// Holds both the sparse term counts (for lexical scoring) and the dense
/// count vector aligned to the vocabulary columns (for the latent step).
/// Terms outside the vocabulary are dropped silently.
#[derive(Debug, Clone)]
pub struct Query {
    pub(crate) term_freq: TermFrequency,
    pub(crate) counts: DVector<f64>,
}

impl Query {
    pub fn new<T>(tokens: &[T], vocabulary: &Vocabulary) -> Self
    where
        T: AsRef<str>,
    {
        let mut term_freq = TermFrequency::new();
        let mut counts = DVector::zeros(vocabulary.len());
        for token in tokens {
            let token = token.as_ref();
            if let Some(col) = vocabulary.column_of(token) {
                term_freq.add_term(token);
                counts[col] += 1.0;
            }
        }
        Self { term_freq, counts }
    }

    /// In-vocabulary term counts
    pub fn term_freq(&self) -> &TermFrequency {
        &self.term_freq
    }

    /// Count vector, one cell per vocabulary column
    pub fn counts(&self) -> &DVector<f64> {
        &self.counts
    }

    /// L2 norm of the raw count vector
    pub fn raw_norm(&self) -> f64 {
        l2_norm(self.counts.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.term_freq.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{tests::park, GoodForKids, Park};

    #[test]
    fn query_aligns_to_vocabulary_and_drops_unknown_terms() {
        let parks = vec![park("a", "FL", GoodForKids::No, &[("coaster ride zoo", 5)])];
        let refs: Vec<&Park> = parks.iter().collect();
        let vocab = Vocabulary::from_parks(&refs);

        let query = Query::new(&["ride", "ghost", "ride", "coaster"], &vocab);
        assert_eq!(query.counts().iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 0.0]);
        assert_eq!(query.term_freq().term_count("ghost"), 0);
        assert_eq!(query.term_freq().term_count("ride"), 2);
        assert!((query.raw_norm() - 5.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_query_has_zero_norm() {
        let vocab = Vocabulary::default();
        let query = Query::new::<&str>(&[], &vocab);
        assert!(query.is_empty());
        assert_eq!(query.raw_norm(), 0.0);
    }
}
