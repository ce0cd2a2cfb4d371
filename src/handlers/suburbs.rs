// src/handlers/suburbs.rs
use chrono::Utc;
use chrono_tz::Australia::Perth;
use log::info;
use serde_json::json;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::services::calculations;
use crate::services::filters::{self, FilterContext, ListingFilter};
use crate::services::store::rows_or_empty;
use crate::AppState;

/// URL slugs are lower-cased hyphenated suburb names; stored keys are
/// upper-cased with spaces.
fn deslugify(slug: &str) -> String {
    slug.replace('-', " ").to_uppercase()
}

fn slugify(suburb: &str) -> String {
    suburb.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

fn title_case(suburb: &str) -> String {
    suburb
        .to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The directory page: one server-computed summary row per suburb, busiest
/// suburb first.
pub async fn get_suburb_directory(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling suburb directory request");

    let rows = calculations::suburbs_by_listing_count(rows_or_empty(
        "suburb page stats",
        state.store.fetch_suburb_page_stats().await,
    ));
    let total_listings: i64 = rows.iter().map(|r| r.listing_count).sum();

    let suburbs: Vec<serde_json::Value> = rows
        .iter()
        .map(|r| {
            json!({
                "slug": slugify(&r.suburb),
                "display_name": title_case(&r.suburb),
                "stats": r,
            })
        })
        .collect();

    Ok(warp::reply::json(&json!({
        "total_listings": total_listings,
        "suburbs": suburbs,
    })))
}

/// One suburb's page: its listings cheapest-first, the locally computed ask
/// aggregates and the server-side investment snapshot.
pub async fn get_suburb_page(slug: String, state: Arc<AppState>) -> Result<Json, Rejection> {
    let suburb = deslugify(&slug);
    info!("Handling suburb page request for {}", suburb);

    let listings = rows_or_empty(
        "suburb listings",
        state.store.fetch_suburb_listings(&suburb).await,
    );
    let comparables = rows_or_empty("comparables", state.store.fetch_comparables().await);
    let snapshots = rows_or_empty(
        "investment snapshots",
        state.store.fetch_investment_snapshots().await,
    );
    let snapshot = snapshots.iter().find(|s| s.suburb.to_uppercase() == suburb);

    let today = Utc::now().with_timezone(&Perth).date_naive();
    let stats = calculations::suburb_stats(&listings, state.config.min_priced_for_median);
    let stat = stats.iter().find(|s| s.suburb == suburb);

    let under_offer_pct = match stat {
        Some(s) if s.count > 0 => (s.under_offer as f64 / s.count as f64 * 100.0).round(),
        _ => 0.0,
    };
    let price_drops = listings
        .iter()
        .filter(|l| matches!(l.price_drop_amount, Some(d) if d > 0.0))
        .count();
    let cards = calculations::annotate_listings(&listings, &comparables, &state.config, today);

    Ok(warp::reply::json(&json!({
        "suburb": suburb,
        "display_name": title_case(&suburb),
        "listing_count": listings.len(),
        "median_ask": stat.and_then(|s| s.median),
        "under_offer_pct": under_offer_pct,
        "price_drops": price_drops,
        "snapshot": snapshot,
        "listings": cards,
    })))
}

/// The investment scorecard: suburb listing aggregates joined against rents
/// and sold-price aggregates, ranked by gross yield.
pub async fn get_scorecard(filter: ListingFilter, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling scorecard request: {:?}", filter);

    let listings = rows_or_empty("active listings", state.store.fetch_active_listings().await);
    let comparables = rows_or_empty("comparables", state.store.fetch_comparables().await);
    let rentals = rows_or_empty("rental medians", state.store.fetch_rentals().await);
    let sold_stats = rows_or_empty(
        "suburb sold stats",
        state.store.fetch_suburb_sold_stats().await,
    );

    let favourites = state.prefs.favourites();
    let today = Utc::now().with_timezone(&Perth).date_naive();
    let ctx = FilterContext {
        comparables: &comparables,
        favourites: &favourites,
        config: &state.config,
        today,
    };
    let filtered = filters::apply(&listings, &filter, &ctx);

    let stats = calculations::suburb_stats(&filtered, state.config.min_priced_for_median);
    let rows = calculations::scorecard(&stats, &rentals, &sold_stats);

    Ok(warp::reply::json(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_round_trip() {
        assert_eq!(deslugify("city-beach"), "CITY BEACH");
        assert_eq!(slugify("CITY BEACH"), "city-beach");
        assert_eq!(title_case("CITY BEACH"), "City Beach");
        assert_eq!(title_case("SCARBOROUGH"), "Scarborough");
    }
}
