//! Dataset ingestion: the scraped JSON park list into a [`Catalog`].

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    catalog::{Catalog, Coordinates, GoodForKids, Park, Review},
    error::{RecommendError, Result},
    vectorizer::token::Tokenizer,
};

#[derive(Debug, Deserialize)]
struct RawPark {
    business_id: String,
    name: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    website_url: Option<String>,
    #[serde(default)]
    attributes: Option<IndexMap<String, serde_json::Value>>,
    #[serde(default)]
    reviews: Vec<RawReview>,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    text: String,
    stars: f64,
}

/// Read and parse the dataset file at `path`
pub fn load_catalog(path: impl AsRef<Path>, tokenizer: &Tokenizer) -> Result<Catalog> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| RecommendError::DatasetIo {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = parse_catalog(&json, tokenizer)?;
    info!(path = %path.display(), parks = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// Parse a JSON array of park records.
///
/// Data-quality problems are reported with `warn!` rather than failing the load:
/// parks without reviews and duplicate ids are dropped, out-of-range stars are clamped.
pub fn parse_catalog(json: &str, tokenizer: &Tokenizer) -> Result<Catalog> {
    let raw: Vec<RawPark> = serde_json::from_str(json)?;
    let mut catalog = Catalog::new();
    for record in raw {
        if record.reviews.is_empty() {
            warn!(id = %record.business_id, name = %record.name, "park has no reviews, skipped");
            continue;
        }
        let id = record.business_id.clone();
        if !catalog.insert(into_park(record, tokenizer)) {
            warn!(id = %id, "duplicate business id, later record dropped");
        }
    }
    Ok(catalog)
}

fn into_park(record: RawPark, tokenizer: &Tokenizer) -> Park {
    let coordinates = match (record.latitude, record.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
        _ => None,
    };
    let good_for_kids = good_for_kids_from_attributes(record.attributes.as_ref());
    let reviews = record
        .reviews
        .into_iter()
        .map(|review| {
            let stars = clamp_stars(&record.business_id, review.stars);
            Review::new(review.text, stars, tokenizer)
        })
        .collect();

    Park {
        id: record.business_id,
        name: record.name,
        state: record.state,
        coordinates,
        good_for_kids,
        image_url: normalize_url(record.image_url),
        website_url: normalize_url(record.website_url),
        reviews,
        tags: Vec::new(),
    }
}

fn good_for_kids_from_attributes(attributes: Option<&IndexMap<String, serde_json::Value>>) -> GoodForKids {
    match attributes.and_then(|attrs| attrs.get("GoodForKids")) {
        None | Some(serde_json::Value::Null) => GoodForKids::Unknown,
        Some(serde_json::Value::String(s)) if s == "True" => GoodForKids::Yes,
        Some(serde_json::Value::Bool(true)) => GoodForKids::Yes,
        Some(_) => GoodForKids::No,
    }
}

fn normalize_url(url: Option<String>) -> Option<String> {
    url.filter(|u| !is_placeholder_url(u))
}

/// Empty strings and the literal "None" mean no url
pub(crate) fn is_placeholder_url(url: &str) -> bool {
    url.trim().is_empty() || url == "None"
}

fn clamp_stars(id: &str, stars: f64) -> u8 {
    if !(1.0..=5.0).contains(&stars) {
        warn!(id = %id, stars, "star rating out of range, clamped");
    }
    if stars.is_nan() {
        return 1;
    }
    stars.round().clamp(1.0, 5.0) as u8
}
