//! Coordinates to administrative location, through an ordered provider chain.
//!
//! Network providers are tried in priority order. Any failure (transport,
//! status, timeout, unusable payload) moves on to the next one. The chain ends
//! in a latitude-band heuristic that cannot fail, so `resolve` always answers.

use crate::config::Config;
use crate::datasources::{BigDataCloudClient, NominatimClient};
use crate::error::{KrishiError, Result};
use crate::models::{AccuracyTier, Coordinates, GeocodedPlace, ResolvedLocation};
use async_trait::async_trait;
use std::time::Duration;

/// A reverse geocoding service.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Accuracy tier attached to this provider's results
    fn accuracy(&self) -> AccuracyTier;

    async fn reverse(&self, coords: Coordinates) -> Result<GeocodedPlace>;
}

/// Free-text place search.
#[async_trait]
pub trait ForwardGeocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<Coordinates>>;
}

pub struct RegionBand {
    pub name: &'static str,
    pub min_lat: f64,
    pub max_lat: f64,
    pub states: &'static [&'static str],
    /// Only chosen over an overlapping band when the longitude puts the point
    /// in the east
    pub alternate: bool,
}

const EASTERN_MIN_LONGITUDE: f64 = 84.0;
const HEURISTIC_LOCALITY: &str = "Location Area";

static REGION_BANDS: [RegionBand; 4] = [
    RegionBand {
        name: "Northern India",
        min_lat: 28.0,
        max_lat: 90.0,
        states: &["Punjab", "Haryana", "Delhi", "UP"],
        alternate: false,
    },
    RegionBand {
        name: "Central India",
        min_lat: 20.0,
        max_lat: 28.0,
        states: &["MP", "Maharashtra", "Gujarat"],
        alternate: false,
    },
    RegionBand {
        name: "Southern India",
        min_lat: 8.0,
        max_lat: 20.0,
        states: &["Karnataka", "Tamil Nadu", "Kerala", "Andhra Pradesh"],
        alternate: false,
    },
    RegionBand {
        name: "Eastern India",
        min_lat: 20.0,
        max_lat: 28.0,
        states: &["West Bengal", "Odisha", "Jharkhand"],
        alternate: true,
    },
];

const DEFAULT_BAND: usize = 1;

impl RegionBand {
    fn contains(&self, latitude: f64) -> bool {
        // Northern is open-ended; the rest are half-open [min, max)
        latitude >= self.min_lat && (latitude < self.max_lat || self.max_lat >= 90.0)
    }
}

/// Band for a coordinate. Anything outside every band counts as Central.
pub fn region_for(coords: Coordinates) -> &'static RegionBand {
    let primary = REGION_BANDS
        .iter()
        .find(|band| !band.alternate && band.contains(coords.latitude))
        .unwrap_or(&REGION_BANDS[DEFAULT_BAND]);

    if coords.longitude >= EASTERN_MIN_LONGITUDE {
        if let Some(alternate) = REGION_BANDS
            .iter()
            .find(|band| band.alternate && band.contains(coords.latitude))
        {
            return alternate;
        }
    }

    primary
}

/// Terminal tier: a representative state for the latitude band.
pub fn locate_by_region(coords: Coordinates) -> ResolvedLocation {
    let band = region_for(coords);
    tracing::debug!("{} falls in the {} band", coords, band.name);
    ResolvedLocation::from_place(
        coords,
        GeocodedPlace {
            city: HEURISTIC_LOCALITY.to_string(),
            state: band.states[0].to_string(),
            country: "India".to_string(),
            district: None,
        },
        AccuracyTier::Low,
    )
}

pub struct GeoResolver {
    providers: Vec<Box<dyn ReverseGeocoder>>,
    forward: Option<Box<dyn ForwardGeocoder>>,
    timeout: Duration,
}

impl GeoResolver {
    /// A resolver with no network providers; only the heuristic answers.
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            forward: None,
            timeout,
        }
    }

    pub fn from_config(config: &Config, client: &reqwest::Client) -> Self {
        let mut resolver = Self::new(config.http.timeout());

        if !config.geocoding.enabled {
            tracing::info!("Geocoding disabled - locations come from latitude bands only");
            return resolver;
        }

        resolver = resolver
            .with_provider(BigDataCloudClient::new(
                client.clone(),
                config.geocoding.primary_url.clone(),
            ))
            .with_provider(NominatimClient::new(
                client.clone(),
                config.geocoding.secondary_url.clone(),
                config.geocoding.user_agent.clone(),
            ))
            .with_forward(NominatimClient::new(
                client.clone(),
                config.geocoding.secondary_url.clone(),
                config.geocoding.user_agent.clone(),
            ));

        resolver
    }

    /// Appends a provider at the lowest priority so far.
    pub fn with_provider(mut self, provider: impl ReverseGeocoder + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn with_forward(mut self, forward: impl ForwardGeocoder + 'static) -> Self {
        self.forward = Some(Box::new(forward));
        self
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn resolve(&self, coords: Coordinates) -> ResolvedLocation {
        if let Err(e) = coords.validate() {
            tracing::warn!("Skipping geocoding providers: {}", e);
            return locate_by_region(coords);
        }

        for provider in &self.providers {
            match self.try_provider(provider.as_ref(), coords).await {
                Ok(place) => {
                    tracing::debug!(
                        "{} resolved {} to {}, {}",
                        provider.name(),
                        coords,
                        place.city,
                        place.state
                    );
                    return ResolvedLocation::from_place(coords, place, provider.accuracy());
                }
                Err(e) => {
                    tracing::warn!("Geocoding via {} failed, trying next: {}", provider.name(), e);
                }
            }
        }

        tracing::debug!("All geocoding providers failed for {} - using region bands", coords);
        locate_by_region(coords)
    }

    async fn try_provider(
        &self,
        provider: &dyn ReverseGeocoder,
        coords: Coordinates,
    ) -> Result<GeocodedPlace> {
        tokio::time::timeout(self.timeout, provider.reverse(coords))
            .await
            .map_err(|_| {
                KrishiError::DataSourceUnavailable(format!(
                    "{} timed out after {:?}",
                    provider.name(),
                    self.timeout
                ))
            })?
    }

    /// Queries every provider once, reporting which answered.
    pub async fn check_providers(&self, coords: Coordinates) -> Vec<(&'static str, bool)> {
        let mut status = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let ok = self.try_provider(provider.as_ref(), coords).await.is_ok();
            status.push((provider.name(), ok));
        }
        status
    }

    /// Searches a typed address, then reverse-resolves the first hit.
    pub async fn resolve_address(&self, address: &str) -> Option<ResolvedLocation> {
        let forward = self.forward.as_ref()?;
        let query = address.trim();
        if query.is_empty() {
            return None;
        }

        let found = tokio::time::timeout(self.timeout, forward.search(query)).await;
        match found {
            Ok(Ok(Some(coords))) => Some(self.resolve(coords).await),
            Ok(Ok(None)) => {
                tracing::debug!("No match for address '{}'", query);
                None
            }
            Ok(Err(e)) => {
                tracing::warn!("Address search failed: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!("Address search timed out after {:?}", self.timeout);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedGeocoder {
        place: GeocodedPlace,
        accuracy: AccuracyTier,
    }

    #[async_trait]
    impl ReverseGeocoder for FixedGeocoder {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn accuracy(&self) -> AccuracyTier {
            self.accuracy
        }

        async fn reverse(&self, _coords: Coordinates) -> Result<GeocodedPlace> {
            Ok(self.place.clone())
        }
    }

    struct FailingGeocoder {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ReverseGeocoder for FailingGeocoder {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn accuracy(&self) -> AccuracyTier {
            AccuracyTier::High
        }

        async fn reverse(&self, _coords: Coordinates) -> Result<GeocodedPlace> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(KrishiError::DataSourceUnavailable("returned 503".into()))
        }
    }

    struct SlowGeocoder;

    #[async_trait]
    impl ReverseGeocoder for SlowGeocoder {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn accuracy(&self) -> AccuracyTier {
            AccuracyTier::High
        }

        async fn reverse(&self, _coords: Coordinates) -> Result<GeocodedPlace> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(KrishiError::DataSourceUnavailable("unreachable".into()))
        }
    }

    struct FixedSearch(Option<Coordinates>);

    #[async_trait]
    impl ForwardGeocoder for FixedSearch {
        async fn search(&self, _query: &str) -> Result<Option<Coordinates>> {
            Ok(self.0)
        }
    }

    fn pune() -> GeocodedPlace {
        GeocodedPlace {
            city: "Pune".into(),
            state: "Maharashtra".into(),
            country: "India".into(),
            district: Some("Pune".into()),
        }
    }

    fn failing() -> (FailingGeocoder, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            FailingGeocoder {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    #[test]
    fn region_bands() {
        assert_eq!(region_for(Coordinates::new(30.7, 76.7)).name, "Northern India");
        assert_eq!(region_for(Coordinates::new(28.0, 77.0)).name, "Northern India");
        assert_eq!(region_for(Coordinates::new(23.2, 77.4)).name, "Central India");
        assert_eq!(region_for(Coordinates::new(20.0, 75.0)).name, "Central India");
        assert_eq!(region_for(Coordinates::new(12.97, 77.59)).name, "Southern India");
        assert_eq!(region_for(Coordinates::new(22.57, 88.36)).name, "Eastern India");
        // Outside every band
        assert_eq!(region_for(Coordinates::new(0.0, 0.0)).name, "Central India");
    }

    #[test]
    fn heuristic_location_shape() {
        let location = locate_by_region(Coordinates::new(12.97, 77.59));
        assert_eq!(location.state, "Karnataka");
        assert_eq!(location.city, "Location Area");
        assert_eq!(location.country, "India");
        assert!(location.district.is_none());
        assert_eq!(location.accuracy, AccuracyTier::Low);
    }

    #[tokio::test]
    async fn first_successful_provider_wins() {
        let (primary, calls) = failing();
        let resolver = GeoResolver::new(Duration::from_secs(1))
            .with_provider(primary)
            .with_provider(FixedGeocoder {
                place: pune(),
                accuracy: AccuracyTier::Medium,
            });

        let location = resolver.resolve(Coordinates::new(18.52, 73.86)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(location.city, "Pune");
        assert_eq!(location.district.as_deref(), Some("Pune"));
        assert_eq!(location.accuracy, AccuracyTier::Medium);
    }

    #[tokio::test]
    async fn never_fails_when_every_provider_fails() {
        let (first, _) = failing();
        let (second, _) = failing();
        let resolver = GeoResolver::new(Duration::from_secs(1))
            .with_provider(first)
            .with_provider(second);

        for coords in [
            Coordinates::new(0.0, 0.0),
            Coordinates::new(91.0, 0.0),
            Coordinates::new(18.52, 73.86),
        ] {
            let location = resolver.resolve(coords).await;
            assert_eq!(location.accuracy, AccuracyTier::Low);
            assert!(!location.state.is_empty());
        }
    }

    #[tokio::test]
    async fn invalid_coordinates_skip_network_providers() {
        let (provider, calls) = failing();
        let resolver = GeoResolver::new(Duration::from_secs(1)).with_provider(provider);

        let location = resolver.resolve(Coordinates::new(91.0, 0.0)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(location.accuracy, AccuracyTier::Low);
    }

    #[tokio::test]
    async fn timeout_counts_as_failure() {
        let resolver = GeoResolver::new(Duration::from_millis(50))
            .with_provider(SlowGeocoder)
            .with_provider(FixedGeocoder {
                place: pune(),
                accuracy: AccuracyTier::Medium,
            });

        let location = resolver.resolve(Coordinates::new(18.52, 73.86)).await;
        assert_eq!(location.city, "Pune");
        assert_eq!(location.accuracy, AccuracyTier::Medium);
    }

    #[tokio::test]
    async fn address_search_resolves_hit() {
        let resolver = GeoResolver::new(Duration::from_secs(1))
            .with_provider(FixedGeocoder {
                place: pune(),
                accuracy: AccuracyTier::High,
            })
            .with_forward(FixedSearch(Some(Coordinates::new(18.52, 73.86))));

        let location = resolver.resolve_address("Pune").await.unwrap();
        assert_eq!(location.state, "Maharashtra");
        assert_eq!(location.latitude, 18.52);
    }

    #[tokio::test]
    async fn address_search_without_match() {
        let resolver =
            GeoResolver::new(Duration::from_secs(1)).with_forward(FixedSearch(None));
        assert!(resolver.resolve_address("Atlantis").await.is_none());
        assert!(resolver.resolve_address("   ").await.is_none());
        assert!(GeoResolver::new(Duration::from_secs(1))
            .resolve_address("Pune")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn check_providers_reports_each() {
        let (down, _) = failing();
        let resolver = GeoResolver::new(Duration::from_secs(1))
            .with_provider(down)
            .with_provider(FixedGeocoder {
                place: pune(),
                accuracy: AccuracyTier::High,
            });

        let status = resolver.check_providers(Coordinates::new(28.61, 77.21)).await;
        assert_eq!(status, vec![("failing", false), ("fixed", true)]);
    }
}
