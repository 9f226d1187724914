use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{RecommendError, Result},
    filter::RegionTable,
    latent::TagTable,
    vectorizer::evaluate::scoring::SimilarityAlgorithm,
};

pub const DEFAULT_IMAGE_URL: &str = "static/images/default-park.jpg";

/// RecommenderConfig
/// Every knob of the ranking pipeline. All fields have defaults, so a config
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Latent dimensions of the SVD fit
    pub latent_rank: usize,
    /// Results returned per query
    pub top_k: usize,
    /// Review texts attached to each result
    pub review_excerpts: usize,
    /// Tags derived per park
    pub max_tags: usize,
    /// Image shown for parks without one
    pub default_image_url: String,
    /// Formula picking the single best lexical match
    pub lexical_algorithm: SimilarityAlgorithm,
    pub regions: RegionTable,
    /// Dataset-specific, see [`TagTable`]
    pub tags: TagTable,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            latent_rank: 15,
            top_k: 10,
            review_excerpts: 3,
            max_tags: 3,
            default_image_url: DEFAULT_IMAGE_URL.to_string(),
            lexical_algorithm: SimilarityAlgorithm::CosineSimilarity,
            regions: RegionTable::default(),
            tags: TagTable::default(),
        }
    }
}

impl RecommenderConfig {
    /// Read a JSON config file, filling missing keys with defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RecommendError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| RecommendError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.latent_rank == 0 {
            return Err(RecommendError::InvalidConfig("latent_rank must be at least 1".into()));
        }
        if self.max_tags == 0 {
            return Err(RecommendError::InvalidConfig("max_tags must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_setup() {
        let config = RecommenderConfig::default();
        assert_eq!(config.latent_rank, 15);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.review_excerpts, 3);
        assert_eq!(config.lexical_algorithm, SimilarityAlgorithm::CosineSimilarity);
        assert_eq!(config.regions.expand("Northeast"), &["PA", "NJ", "DE"].map(String::from));
        assert_eq!(config.tags.rules().len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: RecommenderConfig = serde_json::from_str(
            r#"{
                "latent_rank": 200,
                "lexical_algorithm": "union_overlap",
                "regions": {"Mountain": ["CO", "UT"]},
                "tags": [{"tag": "Scenic", "dimensions": [0, 3]}]
            }"#,
        )
        .unwrap();
        assert_eq!(config.latent_rank, 200);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.lexical_algorithm, SimilarityAlgorithm::UnionOverlap);
        assert_eq!(config.regions.expand("Mountain").len(), 2);
        assert!(config.regions.expand("Southeast").is_empty());
        assert_eq!(config.tags.rules()[0].dimensions, vec![0, 3]);
    }

    #[test]
    fn zero_rank_is_rejected() {
        let config = RecommenderConfig { latent_rank: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(RecommendError::InvalidConfig(_))));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let err = RecommenderConfig::from_json_file("/no/such/config.json").unwrap_err();
        assert!(matches!(err, RecommendError::ConfigIo { .. }));
    }
}
