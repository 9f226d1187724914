//! Candidate filtering applied before any scoring.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::catalog::{Coordinates, Park};

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// RegionTable
/// Region name -> state codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionTable {
    regions: IndexMap<String, Vec<String>>,
}

impl RegionTable {
    pub fn new(regions: IndexMap<String, Vec<String>>) -> Self {
        Self { regions }
    }

    /// States of one region; an unknown region has none
    pub fn expand(&self, region: &str) -> &[String] {
        self.regions.get(region).map(|s| s.as_slice()).unwrap_or(&[])
    }

    /// Union of the states of every listed region
    pub fn expand_all<S: AsRef<str>>(&self, regions: &[S]) -> IndexSet<String> {
        regions
            .iter()
            .flat_map(|r| self.expand(r.as_ref()).iter().cloned())
            .collect()
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        let table = [
            ("Southeast", &["FL", "TN", "MO", "LA"][..]),
            ("Northeast", &["PA", "NJ", "DE"][..]),
            ("Midwest", &["IN", "IL"][..]),
            ("Southwest", &["AZ"][..]),
            ("West", &["CA", "NV", "ID"][..]),
        ];
        Self::new(
            table
                .iter()
                .map(|(region, states)| {
                    (region.to_string(), states.iter().map(|s| s.to_string()).collect())
                })
                .collect(),
        )
    }
}

/// Circle around a point, radius in miles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRadius {
    pub latitude: f64,
    pub longitude: f64,
    pub miles: f64,
}

impl GeoRadius {
    pub fn contains(&self, point: &Coordinates) -> bool {
        haversine_miles(self.latitude, self.longitude, point.latitude, point.longitude) <= self.miles
    }
}

/// Great-circle distance in miles
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().atan2((1.0 - a).sqrt())
}

/// FilterSpec
/// Conjunction of the active predicates; an inactive predicate matches everything.
///
/// - `states`: `None` is inactive. `Some` with an empty set is active and matches nothing.
/// - `good_for_kids`: when set, only parks whose attribute is `Yes` match.
/// - `within`: when set, only parks with coordinates inside the radius match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub states: Option<IndexSet<String>>,
    pub good_for_kids: bool,
    pub within: Option<GeoRadius>,
}

impl FilterSpec {
    /// No predicate active
    pub fn none() -> Self {
        Self::default()
    }

    /// Restrict to the states of `regions`. An empty list leaves the filter inactive.
    pub fn with_regions<S: AsRef<str>>(mut self, regions: &[S], table: &RegionTable) -> Self {
        self.states = if regions.is_empty() {
            None
        } else {
            Some(table.expand_all(regions))
        };
        self
    }

    pub fn with_states<S: AsRef<str>>(mut self, states: &[S]) -> Self {
        self.states = Some(states.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    /// Only the literal `"yes"` activates the kids filter
    pub fn with_good_for_kids(mut self, sentinel: Option<&str>) -> Self {
        self.good_for_kids = sentinel == Some("yes");
        self
    }

    pub fn with_radius(mut self, within: Option<GeoRadius>) -> Self {
        self.within = within;
        self
    }

    pub fn is_active(&self) -> bool {
        self.states.is_some() || self.good_for_kids || self.within.is_some()
    }

    pub fn matches(&self, park: &Park) -> bool {
        let location_ok = self
            .states
            .as_ref()
            .map_or(true, |states| states.contains(&park.state));
        let kids_ok = !self.good_for_kids || park.good_for_kids.is_yes();
        let distance_ok = self.within.map_or(true, |radius| {
            park.coordinates.as_ref().is_some_and(|c| radius.contains(c))
        });
        location_ok && kids_ok && distance_ok
    }

    /// Matching parks, order preserved
    pub fn apply<'a, I>(&self, parks: I) -> Vec<&'a Park>
    where
        I: IntoIterator<Item = &'a Park>,
    {
        parks.into_iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{tests::park, GoodForKids};

    fn catalog() -> Vec<Park> {
        let mut orlando = park("orlando", "FL", GoodForKids::Yes, &[("fun", 5)]);
        orlando.coordinates = Some(Coordinates { latitude: 28.5384, longitude: -81.3789 });
        let mut tampa = park("tampa", "FL", GoodForKids::No, &[("fun", 5)]);
        tampa.coordinates = Some(Coordinates { latitude: 27.9506, longitude: -82.4572 });
        let anaheim = park("anaheim", "CA", GoodForKids::Yes, &[("fun", 5)]);
        let philly = park("philly", "PA", GoodForKids::Unknown, &[("fun", 5)]);
        vec![orlando, tampa, anaheim, philly]
    }

    fn ids(parks: &[&Park]) -> Vec<String> {
        parks.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn region_expansion_and_unknown_regions() {
        let table = RegionTable::default();
        assert_eq!(table.expand("Southwest"), &["AZ".to_string()]);
        assert!(table.expand("Atlantis").is_empty());
        let states = table.expand_all(&["West", "Midwest", "Atlantis"]);
        assert_eq!(states.into_iter().collect::<Vec<_>>(), vec!["CA", "NV", "ID", "IN", "IL"]);
    }

    #[test]
    fn inactive_filter_keeps_everything() {
        let parks = catalog();
        let filter = FilterSpec::none().with_regions::<&str>(&[], &RegionTable::default());
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&parks).len(), 4);
    }

    #[test]
    fn unknown_region_matches_nothing() {
        let parks = catalog();
        let filter = FilterSpec::none().with_regions(&["Southwest"], &RegionTable::default());
        assert!(filter.is_active());
        assert!(filter.apply(&parks).is_empty());
        let filter = FilterSpec::none().with_regions(&["Atlantis"], &RegionTable::default());
        assert!(filter.apply(&parks).is_empty());
    }

    #[test]
    fn kids_filter_needs_literal_yes() {
        let parks = catalog();
        let filter = FilterSpec::none().with_good_for_kids(Some("yes"));
        assert_eq!(ids(&filter.apply(&parks)), vec!["orlando", "anaheim"]);
        for sentinel in [None, Some("no"), Some("Yes"), Some("true")] {
            let filter = FilterSpec::none().with_good_for_kids(sentinel);
            assert!(!filter.is_active());
            assert_eq!(filter.apply(&parks).len(), 4);
        }
    }

    #[test]
    fn distance_filter_excludes_parks_without_coordinates() {
        let parks = catalog();
        let near_orlando = GeoRadius { latitude: 28.5, longitude: -81.4, miles: 20.0 };
        let filter = FilterSpec::none().with_radius(Some(near_orlando));
        assert_eq!(ids(&filter.apply(&parks)), vec!["orlando"]);
        let wide = GeoRadius { miles: 150.0, ..near_orlando };
        let filter = FilterSpec::none().with_radius(Some(wide));
        assert_eq!(ids(&filter.apply(&parks)), vec!["orlando", "tampa"]);
    }

    #[test]
    fn haversine_known_distance() {
        // Orlando -> Tampa is roughly 78 miles
        let d = haversine_miles(28.5384, -81.3789, 27.9506, -82.4572);
        assert!((d - 78.0).abs() < 3.0, "distance {d}");
        assert_eq!(haversine_miles(10.0, 10.0, 10.0, 10.0), 0.0);
    }

    #[test]
    fn filters_are_conjunctive_and_idempotent() {
        let parks = catalog();
        let table = RegionTable::default();
        let by_region = FilterSpec::none().with_regions(&["Southeast", "West"], &table);
        let by_kids = FilterSpec::none().with_good_for_kids(Some("yes"));
        let both = by_region.clone().with_good_for_kids(Some("yes"));

        let region_ids = ids(&by_region.apply(&parks));
        let kids_ids = ids(&by_kids.apply(&parks));
        let intersection: Vec<String> = region_ids.into_iter().filter(|id| kids_ids.contains(id)).collect();

        let once = both.apply(&parks);
        assert_eq!(ids(&once), intersection);
        let twice = both.apply(once.iter().copied());
        assert_eq!(ids(&twice), ids(&once));
    }

    #[test]
    fn empty_catalog_stays_empty() {
        let filter = FilterSpec::none().with_states(&["FL"]).with_good_for_kids(Some("yes"));
        assert!(filter.apply(&Vec::<Park>::new()).is_empty());
    }
}
