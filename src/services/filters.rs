// src/services/filters.rs
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;

use crate::config::MetricsConfig;
use crate::models::{Listing, SoldComparable};
use crate::services::classify;

/// The compound filter selection. Every field is independently toggleable
/// and the active ones combine with logical AND. Deserializes straight from
/// the request query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListingFilter {
    pub suburb: Option<String>,
    pub property_type: Option<String>,
    pub min_bedrooms: Option<i32>,
    pub max_price: Option<f64>,
    pub pool_only: bool,
    pub under_budget: bool,
    pub available_only: bool,
    pub hide_land: bool,
    pub best_value: bool,
    pub motivated: bool,
    pub favourites_only: bool,
}

/// Lookup tables the predicate joins against. The predicate itself is a pure
/// function of (listing, filter, context).
pub struct FilterContext<'a> {
    pub comparables: &'a [SoldComparable],
    pub favourites: &'a HashSet<i64>,
    pub config: &'a MetricsConfig,
    pub today: NaiveDate,
}

/// The UI sends "all" (or nothing) for an unconstrained select.
fn selection(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

pub fn matches(listing: &Listing, filter: &ListingFilter, ctx: &FilterContext) -> bool {
    if let Some(suburb) = selection(&filter.suburb) {
        if listing.suburb != suburb.to_uppercase() {
            return false;
        }
    }
    if let Some(wanted) = selection(&filter.property_type) {
        match &listing.property_type {
            Some(t) if t.eq_ignore_ascii_case(wanted) => {}
            _ => return false,
        }
    }
    if let Some(min) = filter.min_bedrooms {
        if listing.bedroom_count() < min {
            return false;
        }
    }
    // A listing without a numeric price cannot prove it fits the cap, so an
    // active max_price excludes it.
    if let Some(max) = filter.max_price {
        match listing.price_numeric {
            Some(price) if price <= max => {}
            _ => return false,
        }
    }
    if filter.pool_only && !listing.pool {
        return false;
    }
    if filter.under_budget {
        match listing.price_numeric {
            Some(price) if price <= ctx.config.budget => {}
            _ => return false,
        }
    }
    if filter.available_only && listing.under_offer {
        return false;
    }
    if filter.hide_land && (classify::is_land_listing(listing) || listing.bedroom_count() == 0) {
        return false;
    }
    if filter.best_value
        && !classify::is_best_value(listing, ctx.comparables, ctx.config.best_value_discount)
    {
        return false;
    }
    if filter.motivated && !classify::is_motivated_seller(listing, ctx.today, ctx.config) {
        return false;
    }
    if filter.favourites_only && !ctx.favourites.contains(&listing.id) {
        return false;
    }
    true
}

pub fn apply(listings: &[Listing], filter: &ListingFilter, ctx: &FilterContext) -> Vec<Listing> {
    listings
        .iter()
        .filter(|l| matches(l, filter, ctx))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Listing;

    fn listing(id: i64, suburb: &str, beds: i32, price: Option<f64>) -> Listing {
        Listing {
            id,
            address: format!("{} Example St", id),
            suburb: suburb.to_string(),
            bedrooms: Some(beds),
            bathrooms: Some(2),
            car_spaces: Some(1),
            land_size: None,
            price_display: price.map(|p| format!("${}", p)),
            price_numeric: price,
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

    fn sample() -> Vec<Listing> {
        let mut rows = vec![
            listing(1, "SCARBOROUGH", 3, Some(900_000.0)),
            listing(2, "SCARBOROUGH", 4, Some(2_000_000.0)),
            listing(3, "HILLARYS", 2, Some(700_000.0)),
            listing(4, "HILLARYS", 3, None),
            listing(5, "KARRINYUP", 0, None),
        ];
        rows[3].under_offer = true;
        rows[4].property_type = Some("land".to_string());
        rows[1].pool = true;
        rows
    }

    fn ctx<'a>(
        favourites: &'a HashSet<i64>,
        config: &'a MetricsConfig,
    ) -> FilterContext<'a> {
        FilterContext {
            comparables: &[],
            favourites,
            config,
            today: NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(),
        }
    }

    #[test]
    fn filtering_never_adds_records() {
        let rows = sample();
        let favs = HashSet::new();
        let config = MetricsConfig::default();
        let filter = ListingFilter {
            min_bedrooms: Some(3),
            available_only: true,
            hide_land: true,
            ..Default::default()
        };
        let filtered = apply(&rows, &filter, &ctx(&favs, &config));
        assert!(filtered.len() <= rows.len());
        let ids: HashSet<i64> = rows.iter().map(|l| l.id).collect();
        assert!(filtered.iter().all(|l| ids.contains(&l.id)));
    }

    #[test]
    fn relaxing_a_constraint_yields_a_superset() {
        let rows = sample();
        let favs = HashSet::new();
        let config = MetricsConfig::default();
        let strict = ListingFilter {
            min_bedrooms: Some(3),
            available_only: true,
            hide_land: true,
            ..Default::default()
        };
        let strict_ids: HashSet<i64> = apply(&rows, &strict, &ctx(&favs, &config))
            .iter()
            .map(|l| l.id)
            .collect();

        for relaxed in [
            ListingFilter { min_bedrooms: None, ..strict.clone() },
            ListingFilter { available_only: false, ..strict.clone() },
            ListingFilter { hide_land: false, ..strict.clone() },
        ] {
            let relaxed_ids: HashSet<i64> = apply(&rows, &relaxed, &ctx(&favs, &config))
                .iter()
                .map(|l| l.id)
                .collect();
            assert!(strict_ids.is_subset(&relaxed_ids));
        }
    }

    #[test]
    fn max_price_excludes_priceless_listings() {
        let rows = sample();
        let favs = HashSet::new();
        let config = MetricsConfig::default();

        let capped = ListingFilter {
            max_price: Some(1_000_000.0),
            ..Default::default()
        };
        let ids: Vec<i64> = apply(&rows, &capped, &ctx(&favs, &config))
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);

        // With no cap, priceless listings pass through.
        let open = ListingFilter::default();
        assert_eq!(apply(&rows, &open, &ctx(&favs, &config)).len(), rows.len());
    }

    #[test]
    fn under_budget_uses_the_configured_budget() {
        let rows = sample();
        let favs = HashSet::new();
        let config = MetricsConfig::default();
        let filter = ListingFilter {
            under_budget: true,
            ..Default::default()
        };
        let ids: Vec<i64> = apply(&rows, &filter, &ctx(&favs, &config))
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn suburb_selection_is_case_insensitive_and_all_means_any() {
        let rows = sample();
        let favs = HashSet::new();
        let config = MetricsConfig::default();

        let by_suburb = ListingFilter {
            suburb: Some("hillarys".to_string()),
            ..Default::default()
        };
        assert_eq!(apply(&rows, &by_suburb, &ctx(&favs, &config)).len(), 2);

        let any = ListingFilter {
            suburb: Some("all".to_string()),
            ..Default::default()
        };
        assert_eq!(apply(&rows, &any, &ctx(&favs, &config)).len(), rows.len());
    }

    #[test]
    fn hide_land_drops_zero_bedroom_and_land_listings() {
        let rows = sample();
        let favs = HashSet::new();
        let config = MetricsConfig::default();
        let filter = ListingFilter {
            hide_land: true,
            ..Default::default()
        };
        let ids: Vec<i64> = apply(&rows, &filter, &ctx(&favs, &config))
            .iter()
            .map(|l| l.id)
            .collect();
        assert!(!ids.contains(&5));
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn hide_land_drops_typed_land_despite_bedroom_count() {
        let mut rows = sample();
        rows.push({
            let mut l = listing(6, "KARRINYUP", 3, Some(400_000.0));
            l.property_type = Some("land".to_string());
            l
        });
        let favs = HashSet::new();
        let config = MetricsConfig::default();
        let filter = ListingFilter {
            hide_land: true,
            ..Default::default()
        };
        let ids: Vec<i64> = apply(&rows, &filter, &ctx(&favs, &config))
            .iter()
            .map(|l| l.id)
            .collect();
        assert!(!ids.contains(&6));
    }

    #[test]
    fn favourites_only_joins_the_saved_set() {
        let rows = sample();
        let favs: HashSet<i64> = [2, 4].into_iter().collect();
        let config = MetricsConfig::default();
        let filter = ListingFilter {
            favourites_only: true,
            ..Default::default()
        };
        let ids: Vec<i64> = apply(&rows, &filter, &ctx(&favs, &config))
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![2, 4]);
    }
}
