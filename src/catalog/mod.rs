pub mod loader;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::vectorizer::token::{TermFrequency, Tokenizer};

/// Three-valued "good for kids" attribute.
/// `Unknown` is what a park without the attribute gets; filters treat it as false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoodForKids {
    Yes,
    No,
    #[default]
    Unknown,
}

impl GoodForKids {
    #[inline]
    pub fn is_yes(self) -> bool {
        matches!(self, GoodForKids::Yes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single review. The text is analyzed once on construction.
#[derive(Debug, Clone)]
pub struct Review {
    text: String,
    stars: u8,
    terms: TermFrequency,
}

impl Review {
    pub fn new(text: impl Into<String>, stars: u8, tokenizer: &Tokenizer) -> Self {
        let text = text.into();
        let terms = tokenizer.term_frequency(&text);
        Self { text, stars, terms }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn stars(&self) -> u8 {
        self.stars
    }

    /// Stemmed term counts of this review
    pub fn terms(&self) -> &TermFrequency {
        &self.terms
    }
}

/// Park
/// One catalog entry with its reviews and metadata.
///
/// `tags` is empty until the search index assigns them from the latent model.
#[derive(Debug, Clone)]
pub struct Park {
    pub id: String,
    pub name: String,
    pub state: String,
    pub coordinates: Option<Coordinates>,
    pub good_for_kids: GoodForKids,
    pub image_url: Option<String>,
    pub website_url: Option<String>,
    pub reviews: Vec<Review>,
    pub tags: Vec<String>,
}

impl Park {
    /// Mean star rating, `None` for a park without reviews
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let sum: u32 = self.reviews.iter().map(|r| r.stars() as u32).sum();
        Some(sum as f64 / self.reviews.len() as f64)
    }

    /// Term counts aggregated over all of this park's reviews
    pub fn term_frequency(&self) -> TermFrequency {
        let mut freq = TermFrequency::new();
        for review in &self.reviews {
            freq.add_terms_from_freq(review.terms());
        }
        freq
    }

    /// The first `n` review texts
    pub fn review_excerpts(&self, n: usize) -> Vec<String> {
        self.reviews.iter().take(n).map(|r| r.text().to_string()).collect()
    }
}

/// Catalog
/// Parks keyed by business id, in load order.
/// Load order is the row order of every matrix built from the catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    parks: IndexMap<String, Park>,
}

impl Catalog {
    pub fn new() -> Self {
        Self { parks: IndexMap::new() }
    }

    /// Insert a park; returns false (and keeps the existing entry) on a duplicate id
    pub fn insert(&mut self, park: Park) -> bool {
        if self.parks.contains_key(&park.id) {
            return false;
        }
        self.parks.insert(park.id.clone(), park);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Park> {
        self.parks.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Park> {
        self.parks.values()
    }

    /// All parks as a candidate list, in catalog order
    pub fn parks(&self) -> Vec<&Park> {
        self.parks.values().collect()
    }

    pub fn len(&self) -> usize {
        self.parks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parks.is_empty()
    }

    pub(crate) fn set_tags(&mut self, id: &str, tags: Vec<String>) {
        if let Some(park) = self.parks.get_mut(id) {
            park.tags = tags;
        }
    }
}

impl FromIterator<Park> for Catalog {
    fn from_iter<I: IntoIterator<Item = Park>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for park in iter {
            catalog.insert(park);
        }
        catalog
    }
}
