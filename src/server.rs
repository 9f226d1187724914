//! Thin HTTP layer over [`SearchIndex`].

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{
    filter::{FilterSpec, GeoRadius, RegionTable},
    search::{ParkResult, SearchIndex},
};

/// Query string of `GET /parks`
///
/// Values stay strings so that empty or malformed optional parameters
/// disable their filter instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParkQuery {
    pub title: Option<String>,
    pub regions: Option<String>,
    pub good_for_kids: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[serde(rename = "travel-distance")]
    pub travel_distance: Option<String>,
}

impl ParkQuery {
    /// Query text, empty when absent
    pub fn text(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn filters(&self, regions: &RegionTable) -> FilterSpec {
        let region_names: Vec<&str> = self
            .regions
            .as_deref()
            .map(|r| r.split(',').map(str::trim).filter(|r| !r.is_empty()).collect())
            .unwrap_or_default();
        FilterSpec::none()
            .with_regions(&region_names, regions)
            .with_good_for_kids(self.good_for_kids.as_deref())
            .with_radius(self.radius())
    }

    /// Active only when all three geo parameters parse
    fn radius(&self) -> Option<GeoRadius> {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<f64>().ok());
        Some(GeoRadius {
            latitude: parse(&self.latitude)?,
            longitude: parse(&self.longitude)?,
            miles: parse(&self.travel_distance)?,
        })
    }
}

pub struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": self.0 }))).into_response()
    }
}

pub fn router(index: Arc<SearchIndex>) -> Router {
    Router::new()
        .route("/parks", get(park_search))
        .route("/health", get(health))
        .with_state(index)
}

/// Bind `addr` and serve until the process stops
pub async fn serve(index: Arc<SearchIndex>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router(index)).await
}

async fn park_search(
    State(index): State<Arc<SearchIndex>>,
    Query(params): Query<ParkQuery>,
) -> Result<Json<Vec<ParkResult>>, ApiError> {
    // scoring is CPU bound
    let results = tokio::task::spawn_blocking(move || {
        let filters = params.filters(&index.config().regions);
        index.search(params.text(), &filters)
    })
    .await
    .map_err(|e| ApiError(e.to_string()))?
    .map_err(|e| ApiError(e.to_string()))?;
    Ok(Json(results))
}

async fn health(State(index): State<Arc<SearchIndex>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "parks": index.catalog().len(),
    }))
}
