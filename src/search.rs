//! Ranking orchestration: filter, lexical best match, latent re-ranking.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    catalog::{loader::is_placeholder_url, Catalog, Park},
    config::RecommenderConfig,
    error::Result,
    filter::FilterSpec,
    latent::LatentModel,
    vectorizer::{
        corpus::CorpusStats,
        evaluate::{query::Query, scoring::Hits},
        tfidf::term_park_matrix,
        token::Tokenizer,
    },
};

/// One ranked park as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkResult {
    pub id: String,
    pub name: String,
    pub location: String,
    pub score: f64,
    pub rating: Option<f64>,
    pub reviews: Vec<String>,
    pub image_url: String,
    pub website_url: Option<String>,
    pub tags: Vec<String>,
}

/// CandidateModel
/// Derived state of one candidate set: corpus statistics plus the latent
/// fit of its term-park matrix. Both share the row order of `stats.rows`.
/// Built whole, never updated in place.
#[derive(Debug, Clone)]
pub struct CandidateModel {
    pub stats: CorpusStats,
    pub latent: LatentModel,
}

impl CandidateModel {
    pub fn build(parks: &[&Park], rank: usize) -> Result<Self> {
        let stats = CorpusStats::build(parks);
        let matrix = term_park_matrix(&stats.term_frequencies, &stats.vocabulary);
        let latent = LatentModel::fit(&matrix, rank)?;
        Ok(Self { stats, latent })
    }
}

/// SearchIndex
/// The immutable, process-wide search state.
///
/// Built once by [`SearchIndex::build`]: tokenizer, catalog (with tags
/// assigned from the full-catalog latent fit) and the full-catalog
/// [`CandidateModel`]. Safe to share across threads behind an `Arc`;
/// nothing in it is mutated after construction.
#[derive(Debug)]
pub struct SearchIndex {
    tokenizer: Tokenizer,
    catalog: Catalog,
    config: RecommenderConfig,
    full: CandidateModel,
}

impl SearchIndex {
    pub fn build(mut catalog: Catalog, config: RecommenderConfig) -> Result<Self> {
        config.validate()?;
        let started = Instant::now();
        let full = {
            let parks = catalog.parks();
            CandidateModel::build(&parks, config.latent_rank)?
        };

        let tags: Vec<(String, Vec<String>)> = full
            .stats
            .rows
            .iter()
            .enumerate()
            .map(|(row, id)| (id.to_string(), full.latent.tags(row, &config.tags, config.max_tags)))
            .collect();
        for (id, park_tags) in tags {
            catalog.set_tags(&id, park_tags);
        }

        info!(
            parks = catalog.len(),
            reviews = full.stats.doc_num,
            vocabulary = full.stats.vocabulary.len(),
            rank = full.latent.rank(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "search index built"
        );
        Ok(Self {
            tokenizer: Tokenizer::new(),
            catalog,
            config,
            full,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Rank the parks passing `filters` against `query_text`.
    ///
    /// 1. filter the catalog (an empty candidate set returns no results)
    /// 2. build the candidate model (the precomputed one when no filter is active)
    /// 3. find the best lexical match for the query
    /// 4. score every candidate by latent similarity to that match
    /// 5. stable sort descending and keep `top_k`
    pub fn search(&self, query_text: &str, filters: &FilterSpec) -> Result<Vec<ParkResult>> {
        let started = Instant::now();
        let candidates = filters.apply(self.catalog.iter());
        if candidates.is_empty() {
            debug!(query = query_text, "no candidates after filtering");
            return Ok(Vec::new());
        }

        let filtered;
        let model = if filters.is_active() {
            filtered = CandidateModel::build(&candidates, self.config.latent_rank)?;
            &filtered
        } else {
            &self.full
        };

        let tokens = self.tokenizer.tokenize(query_text);
        let query = Query::new(&tokens, &model.stats.vocabulary);
        let lexical = model
            .stats
            .similarity(query.term_freq(), self.config.lexical_algorithm);
        let Some(&(best_row, best_score)) = lexical.best() else {
            return Ok(Vec::new());
        };

        let mut hits = model.latent.similarity_from(best_row, query.raw_norm());
        hits.sort_by_score().truncate(self.config.top_k);
        debug!(
            query = query_text,
            candidates = candidates.len(),
            vocabulary = model.stats.vocabulary.len(),
            best_match = model.stats.rows.id_of(best_row).unwrap_or_default(),
            best_score,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "query ranked"
        );
        Ok(self.render(model, &hits))
    }

    fn render(&self, model: &CandidateModel, hits: &Hits<usize>) -> Vec<ParkResult> {
        hits.list
            .iter()
            .filter_map(|&(row, score)| {
                let id = model.stats.rows.id_of(row)?;
                let park = self.catalog.get(id)?;
                Some(self.to_result(park, score))
            })
            .collect()
    }

    fn to_result(&self, park: &Park, score: f64) -> ParkResult {
        ParkResult {
            id: park.id.clone(),
            name: park.name.clone(),
            location: park.state.clone(),
            score,
            rating: park.average_rating(),
            reviews: park.review_excerpts(self.config.review_excerpts),
            image_url: real_url(park.image_url.as_deref())
                .unwrap_or_else(|| self.config.default_image_url.clone()),
            website_url: real_url(park.website_url.as_deref()),
            tags: park.tags.clone(),
        }
    }
}

/// `url` unless it is absent or a placeholder
fn real_url(url: Option<&str>) -> Option<String> {
    url.filter(|u| !is_placeholder_url(u)).map(String::from)
}
