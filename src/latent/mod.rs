//! Latent semantic model: a truncated SVD of the park x term count matrix.

use indexmap::IndexSet;
use nalgebra::{linalg::SVD, DMatrix};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{RecommendError, Result},
    utils::{math::safe_div, sort::argsort_desc},
    vectorizer::evaluate::scoring::Hits,
};

/// One row of the dimension -> tag table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    pub tag: String,
    pub dimensions: Vec<usize>,
}

/// TagTable
/// Maps latent dimensions to descriptive tags.
///
/// The default table was hand-labelled against a rank-15 fit of the
/// original park review corpus. It is dataset-specific configuration:
/// refitting on another corpus or at another rank changes what each
/// dimension means, and the table has to be relabelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagTable {
    rules: Vec<TagRule>,
}

impl TagTable {
    pub fn new(rules: Vec<TagRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    /// Every tag the table can produce
    pub fn tag_vocabulary(&self) -> IndexSet<&str> {
        self.rules.iter().map(|r| r.tag.as_str()).collect()
    }

    /// Tags for one latent row.
    ///
    /// Dimensions are visited by descending value (ties by lower index); each
    /// visited dimension contributes, in table order, every tag listing it
    /// until `max_tags` distinct tags are collected. Running out of
    /// dimensions first returns the tags found so far.
    pub fn tags_for(&self, latent_row: &[f64], max_tags: usize) -> Vec<String> {
        let mut tags: IndexSet<&str> = IndexSet::new();
        'dims: for dim in argsort_desc(latent_row) {
            for rule in &self.rules {
                if tags.len() >= max_tags {
                    break 'dims;
                }
                if rule.dimensions.contains(&dim) {
                    tags.insert(rule.tag.as_str());
                }
            }
        }
        tags.truncate(max_tags);
        tags.into_iter().map(String::from).collect()
    }
}

impl Default for TagTable {
    fn default() -> Self {
        let rule = |tag: &str, dimensions: &[usize]| TagRule {
            tag: tag.to_string(),
            dimensions: dimensions.to_vec(),
        };
        Self::new(vec![
            rule("Kid-Friendly", &[2, 4]),
            rule("High Thrill", &[1]),
            rule("Water Rides", &[2, 7, 8, 12]),
            rule("Adventure", &[2, 3, 13, 14]),
            rule("Fantasy", &[4, 9, 11, 13]),
            rule("Holiday Light Shows", &[10, 12]),
            rule("Fun For Everyone", &[0, 2, 5, 7]),
        ])
    }
}

/// LatentModel
/// Park rows projected onto the top singular directions of the
/// park x term matrix (`U * Sigma` of the truncated SVD), with row norms.
///
/// Row `r` belongs to the same park as row `r` of the matrix it was fit on.
#[derive(Debug, Clone)]
pub struct LatentModel {
    latent: DMatrix<f64>,
    norms: Vec<f64>,
}

impl LatentModel {
    /// Fit at `rank` dimensions, capped by the matrix shape.
    ///
    /// Singular vectors are sign-normalized so the largest-magnitude entry
    /// of each right singular vector is positive, making the fit deterministic.
    pub fn fit(term_park: &DMatrix<f64>, rank: usize) -> Result<Self> {
        let (rows, cols) = term_park.shape();
        let k = rank.min(rows).min(cols);
        if k == 0 {
            return Ok(Self {
                latent: DMatrix::zeros(rows, 0),
                norms: vec![0.0; rows],
            });
        }

        let svd = SVD::try_new(term_park.clone(), true, true, f64::EPSILON, 0)
            .ok_or(RecommendError::Factorization { rows, cols })?;
        let (Some(u), Some(v_t)) = (svd.u.as_ref(), svd.v_t.as_ref()) else {
            return Err(RecommendError::Factorization { rows, cols });
        };
        let singular: Vec<f64> = svd.singular_values.iter().copied().collect();
        let order = argsort_desc(&singular);

        let mut latent = DMatrix::zeros(rows, k);
        for (dim, &component) in order.iter().take(k).enumerate() {
            let sign = component_sign(v_t.row(component).iter().copied());
            let sigma = singular[component];
            for row in 0..rows {
                latent[(row, dim)] = sign * u[(row, component)] * sigma;
            }
        }
        let norms = (0..rows).map(|row| latent.row(row).norm()).collect();
        debug!(rows, cols, rank = k, "latent model fit");
        Ok(Self { latent, norms })
    }

    /// Number of latent dimensions actually fit
    pub fn rank(&self) -> usize {
        self.latent.ncols()
    }

    pub fn park_num(&self) -> usize {
        self.latent.nrows()
    }

    pub fn row(&self, row: usize) -> Vec<f64> {
        self.latent.row(row).iter().copied().collect()
    }

    /// L2 norm of every latent row
    pub fn norms(&self) -> &[f64] {
        &self.norms
    }

    /// Similarity of every row to the `anchor` row.
    ///
    /// `inner(row, anchor) / (norm(row) * query_norm)`: the row norm is a
    /// latent-space norm while `query_norm` is the raw term-space norm of the
    /// query. The mixed denominator is kept for output parity; it rescales
    /// all scores of one query by the same factor and leaves the order intact.
    /// Zero denominators score 0.
    pub fn similarity_from(&self, anchor: usize, query_norm: f64) -> Hits<usize> {
        if anchor >= self.park_num() {
            return Hits::new(Vec::new());
        }
        let anchor_row = self.latent.row(anchor).into_owned();
        let list = (0..self.park_num())
            .into_par_iter()
            .map(|row| {
                let inner = self.latent.row(row).dot(&anchor_row);
                (row, safe_div(inner, self.norms[row] * query_norm))
            })
            .collect();
        Hits::new(list)
    }

    /// Tags of one row from `table`
    pub fn tags(&self, row: usize, table: &TagTable, max_tags: usize) -> Vec<String> {
        if row >= self.park_num() {
            return Vec::new();
        }
        table.tags_for(&self.row(row), max_tags)
    }
}

/// +1 or -1: the sign of the largest-magnitude component
fn component_sign(values: impl Iterator<Item = f64>) -> f64 {
    let mut best = 0_f64;
    for v in values {
        if v.abs() > best.abs() {
            best = v;
        }
    }
    if best < 0.0 {
        -1.0
    } else {
        1.0
    }
}
