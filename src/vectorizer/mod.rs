pub mod corpus;
pub mod evaluate;
pub mod tfidf;
pub mod token;

use indexmap::IndexSet;

use crate::catalog::Park;

/// ParkRows
/// Bidirectional park-id <-> row-index mapping for one candidate set.
///
/// Every per-park structure built from the same candidate set (term
/// frequencies, norms, inverted-index postings, the term-park matrix and
/// the latent matrix) is indexed by these rows, never by park id.
#[derive(Debug, Clone, Default)]
pub struct ParkRows {
    ids: IndexSet<Box<str>>,
}

impl ParkRows {
    pub fn from_parks(parks: &[&Park]) -> Self {
        Self {
            ids: parks.iter().map(|p| Box::from(p.id.as_str())).collect(),
        }
    }

    #[inline]
    pub fn row_of(&self, id: &str) -> Option<usize> {
        self.ids.get_index_of(id)
    }

    #[inline]
    pub fn id_of(&self, row: usize) -> Option<&str> {
        self.ids.get_index(row).map(|id| id.as_ref())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in row order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(|id| id.as_ref())
    }
}
