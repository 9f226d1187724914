/// This crate is a content-based park recommender built on review text.
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod latent;
pub mod search;
pub mod server;
pub mod utils;
pub mod vectorizer;

/// Search Index
/// The top-level struct of this crate. It owns the catalog, the
/// configuration and the model fit on the whole catalog, and answers
/// ranked queries.
///
/// A query runs in three stages:
/// - the catalog is filtered by region, kid-friendliness and distance
/// - the single best lexical match for the query text is found
/// - every candidate is ranked by latent similarity to that match
///
/// When a filter is active the model is refit on the candidates, so
/// statistics never leak across candidate sets.
///
/// # Thread Safety
/// Immutable after [`SearchIndex::build`]; share it behind an `Arc`.
pub use search::{ParkResult, SearchIndex};

/// Park Catalog
/// Parks keyed by id in load order, with their reviews and metadata.
/// Load one from the scraped JSON dataset with [`catalog::loader::load_catalog`].
pub use catalog::{Catalog, Coordinates, GoodForKids, Park, Review};

/// Tokenizer and Term Frequency structures
/// `Tokenizer` lowercases, splits on non-alphabetic characters and stems.
/// `TermFrequency` counts term occurrences within one text or park.
pub use vectorizer::token::{TermFrequency, Tokenizer};

/// Corpus statistics of one candidate set
/// - `Vocabulary`: sorted distinct terms, one matrix column each
/// - `IdfTable`: review count over reviews containing the term
/// - `InvertedIndex`: term -> (park row, count) postings
pub use vectorizer::corpus::{CorpusStats, IdfTable, InvertedIndex, Vocabulary};

/// Similarity Algorithm for the lexical stage
/// - Union Overlap: dot product over the size of the union of both term sets
/// - Cosine Similarity: TF-IDF cosine accumulated through the inverted index
pub use vectorizer::evaluate::scoring::{Hits, SimilarityAlgorithm};

/// Latent model and tag table
pub use latent::{LatentModel, TagTable};

/// Candidate filters
pub use filter::{FilterSpec, GeoRadius, RegionTable};

pub use config::RecommenderConfig;

pub use error::{RecommendError, Result};
