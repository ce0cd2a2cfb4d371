// src/services/classify.rs
//
// Per-listing classification heuristics. All of these are total functions:
// a missing field means the signal simply doesn't fire.
use chrono::NaiveDate;

use crate::config::MetricsConfig;
use crate::models::{Listing, SoldComparable};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Phrases in the display price that read as an invitation to negotiate.
const NEGOTIATION_KEYWORDS: [&str; 4] = ["offer", "negotiable", "must sell", "reduced"];

/// Address fragments that give away an unbuilt block.
const LAND_ADDRESS_MARKERS: [&str; 3] = ["lot ", "proposed lot", "vacant land"];

/// Which detector decided a seller looks motivated.
///
/// Detectors are ranked: a data-source `motivation_score`, when present,
/// settles the question on its own; the text/longevity heuristics only apply
/// to listings the scorer never saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotivationSignal {
    Score,
    Keyword,
    LongOnMarket,
    PriceDrop,
}

pub fn motivation_signal(
    listing: &Listing,
    today: NaiveDate,
    config: &MetricsConfig,
) -> Option<MotivationSignal> {
    if let Some(score) = listing.motivation_score {
        return (score >= config.motivated_min_score).then_some(MotivationSignal::Score);
    }
    if has_negotiation_keyword(listing) {
        return Some(MotivationSignal::Keyword);
    }
    if matches!(listing.days_on_market(today), Some(days) if days > config.stale_listing_days) {
        return Some(MotivationSignal::LongOnMarket);
    }
    if matches!(listing.price_drop_amount, Some(drop) if drop > 0.0) {
        return Some(MotivationSignal::PriceDrop);
    }
    None
}

pub fn is_motivated_seller(listing: &Listing, today: NaiveDate, config: &MetricsConfig) -> bool {
    motivation_signal(listing, today, config).is_some()
}

fn has_negotiation_keyword(listing: &Listing) -> bool {
    match &listing.price_display {
        Some(text) => {
            let lower = text.to_lowercase();
            NEGOTIATION_KEYWORDS.iter().any(|kw| lower.contains(kw))
        }
        None => false,
    }
}

/// Priced below the (suburb, bedrooms) benchmark by at least `discount`.
/// The boundary is exclusive: exactly at the threshold is not best value.
pub fn is_best_value(listing: &Listing, comparables: &[SoldComparable], discount: f64) -> bool {
    let benchmark = match find_comparable(listing, comparables) {
        Some(c) => c.avg_sold_price,
        None => return false,
    };
    match listing.price_numeric {
        Some(price) => price < benchmark * (1.0 - discount),
        None => false,
    }
}

/// The benchmark row matching this listing's suburb and bedroom count.
/// Suburbs are already upper-cased on both sides of the join.
pub fn find_comparable<'a>(
    listing: &Listing,
    comparables: &'a [SoldComparable],
) -> Option<&'a SoldComparable> {
    comparables
        .iter()
        .find(|c| c.suburb == listing.suburb && c.bedrooms == listing.bedroom_count())
}

/// An unbuilt block rather than a dwelling. The property type decides when
/// one is recorded; older rows without a type fall back to address sniffing.
pub fn is_land_listing(listing: &Listing) -> bool {
    match &listing.property_type {
        Some(t) => t == "land",
        None => {
            let lower = listing.address.to_lowercase();
            LAND_ADDRESS_MARKERS.iter().any(|m| lower.contains(m))
        }
    }
}

/// Kilometres from the listing to the coast: the ingested figure when
/// available, otherwise a great-circle run due west/east to a fixed coast
/// longitude at the listing's own latitude.
pub fn beach_distance_km(listing: &Listing, coast_longitude: f64) -> Option<f64> {
    if let Some(km) = listing.beach_distance_km {
        return Some(km);
    }
    match (listing.latitude, listing.longitude) {
        (Some(lat), Some(lon)) => Some(haversine_km(lat, lon, lat, coast_longitude)),
        _ => None,
    }
}

pub fn is_near_beach(listing: &Listing, config: &MetricsConfig) -> bool {
    beach_distance_km(listing, config.coast_longitude)
        .map_or(false, |km| km <= config.near_beach_km)
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Listing {
        Listing {
            id: 1,
            address: "12 Seaview Tce".to_string(),
            suburb: "SCARBOROUGH".to_string(),
            bedrooms: Some(3),
            bathrooms: Some(2),
            car_spaces: Some(2),
            land_size: None,
            price_display: None,
            price_numeric: None,
            url: None,
            photo_url: None,
            pool: false,
            under_offer: false,
            property_type: Some("house".to_string()),
            first_seen_date: None,
            latitude: None,
            longitude: None,
            original_price: None,
            price_drop_amount: None,
            beach_distance_km: None,
            motivation_score: None,
            agent_name: None,
            agency_name: None,
            inspection_open: None,
            inspection_close: None,
            status: Some("active".to_string()),
        }
    }

    fn comparable(avg: f64) -> SoldComparable {
        SoldComparable {
            suburb: "SCARBOROUGH".to_string(),
            bedrooms: 3,
            avg_sold_price: avg,
            median_sold_price: avg,
            sale_count: Some(10),
            last_updated: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 23).unwrap()
    }

    #[test]
    fn best_value_boundary_is_exclusive() {
        let comps = vec![comparable(1_000_000.0)];
        let config = MetricsConfig::default();

        let mut cheap = listing();
        cheap.price_numeric = Some(849_999.0);
        assert!(is_best_value(&cheap, &comps, config.best_value_discount));

        let mut dear = listing();
        dear.price_numeric = Some(850_001.0);
        assert!(!is_best_value(&dear, &comps, config.best_value_discount));

        let mut exact = listing();
        exact.price_numeric = Some(850_000.0);
        assert!(!is_best_value(&exact, &comps, config.best_value_discount));
    }

    #[test]
    fn best_value_needs_price_and_benchmark() {
        let config = MetricsConfig::default();
        let unpriced = listing();
        assert!(!is_best_value(
            &unpriced,
            &[comparable(1_000_000.0)],
            config.best_value_discount
        ));

        let mut priced = listing();
        priced.price_numeric = Some(100_000.0);
        assert!(!is_best_value(&priced, &[], config.best_value_discount));
    }

    #[test]
    fn score_signal_overrides_heuristics() {
        let config = MetricsConfig::default();

        // Score present and high: motivated, regardless of anything else.
        let mut scored = listing();
        scored.motivation_score = Some(4);
        assert_eq!(
            motivation_signal(&scored, today(), &config),
            Some(MotivationSignal::Score)
        );

        // Score present but low: the keyword heuristic must not resurrect it.
        let mut low = listing();
        low.motivation_score = Some(1);
        low.price_display = Some("Offers over $900k".to_string());
        assert_eq!(motivation_signal(&low, today(), &config), None);
    }

    #[test]
    fn keyword_longevity_and_drop_detectors() {
        let config = MetricsConfig::default();

        let mut keyword = listing();
        keyword.price_display = Some("$850,000 NEGOTIABLE".to_string());
        assert_eq!(
            motivation_signal(&keyword, today(), &config),
            Some(MotivationSignal::Keyword)
        );

        let mut stale = listing();
        stale.first_seen_date = Some(today() - chrono::Duration::days(61));
        assert_eq!(
            motivation_signal(&stale, today(), &config),
            Some(MotivationSignal::LongOnMarket)
        );

        // Exactly 60 days is not yet stale.
        let mut fresh = listing();
        fresh.first_seen_date = Some(today() - chrono::Duration::days(60));
        assert_eq!(motivation_signal(&fresh, today(), &config), None);

        let mut dropped = listing();
        dropped.price_drop_amount = Some(25_000.0);
        assert_eq!(
            motivation_signal(&dropped, today(), &config),
            Some(MotivationSignal::PriceDrop)
        );
    }

    #[test]
    fn land_detection_prefers_property_type() {
        let mut block = listing();
        block.property_type = Some("land".to_string());
        block.bedrooms = Some(0);
        assert!(is_land_listing(&block));

        // Typed land stays land even when the feed invents a bedroom count.
        let mut subdivision = listing();
        subdivision.property_type = Some("land".to_string());
        subdivision.bedrooms = Some(3);
        assert!(is_land_listing(&subdivision));

        // A typed dwelling is never land, whatever the address says.
        let mut house = listing();
        house.address = "Proposed Lot 4, 10 Main St".to_string();
        assert!(!is_land_listing(&house));

        // No type recorded: fall back to the address text.
        let mut untyped = listing();
        untyped.property_type = None;
        untyped.address = "Lot 12 Ocean Rd".to_string();
        assert!(is_land_listing(&untyped));

        let mut plain = listing();
        plain.property_type = None;
        assert!(!is_land_listing(&plain));
    }

    #[test]
    fn beach_distance_zero_at_reference_longitude() {
        let config = MetricsConfig::default();
        let mut on_coast = listing();
        on_coast.latitude = Some(-31.9);
        on_coast.longitude = Some(config.coast_longitude);
        let km = beach_distance_km(&on_coast, config.coast_longitude).unwrap();
        assert!(km.abs() < 1e-9);
        assert!(is_near_beach(&on_coast, &config));
    }

    #[test]
    fn beach_distance_prefers_ingested_field() {
        let config = MetricsConfig::default();
        let mut l = listing();
        l.beach_distance_km = Some(5.0);
        l.latitude = Some(-31.9);
        l.longitude = Some(config.coast_longitude);
        assert_eq!(beach_distance_km(&l, config.coast_longitude), Some(5.0));
        assert!(!is_near_beach(&l, &config));
    }

    #[test]
    fn beach_distance_matches_constant_latitude_haversine() {
        // One degree of longitude at latitude -32 is about 94.5 km.
        let mut l = listing();
        l.latitude = Some(-32.0);
        l.longitude = Some(116.75);
        let km = beach_distance_km(&l, 115.75).unwrap();
        assert!((km - 94.3).abs() < 1.0, "got {}", km);
    }
}
