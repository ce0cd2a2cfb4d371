// src/handlers/listings.rs
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

/// The buyer dashboard: filtered listing cards plus the hero counters and
/// the suburb selector options.
pub async fn get_listings(filter: ListingFilter, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling listings request: {:?}", filter);

    let listings = rows_or_empty("active listings", state.store.fetch_active_listings().await);
    let comparables = rows_or_empty("comparables", state.store.fetch_comparables().await);
    let favourites = state.prefs.favourites();
    let today = Utc::now().with_timezone(&Perth).date_naive();

    let ctx = FilterContext {
        comparables: &comparables,
        favourites: &favourites,
        config: &state.config,
        today,
    };
    let filtered = filters::apply(&listings, &filter, &ctx);
    let stats = calculations::hero_stats(&filtered, &listings, &state.config);
    let cards = calculations::annotate_listings(&filtered, &comparables, &state.config, today);

    Ok(warp::reply::json(&json!({
        "total": listings.len(),
        "showing": filtered.len(),
        "stats": stats,
        "suburbs": calculations::distinct_suburbs(&listings),
        "listings": cards,
    })))
}

/// The investor dashboard: suburb medians ranked cheapest-first and the
/// shortlist of listings priced well under their benchmark.
pub async fn get_investor_overview(
    filter: ListingFilter,
    state: Arc<AppState>,
) -> Result<Json, Rejection> {
    info!("Handling investor overview request: {:?}", filter);

    let listings = rows_or_empty("active listings", state.store.fetch_active_listings().await);
    let comparables = rows_or_empty("comparables", state.store.fetch_comparables().await);
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
    let ranked = calculations::top_suburbs_by_median(stats);
    let picks = calculations::best_investment_picks(&filtered, &comparables, &state.config);
    let picks = calculations::annotate_listings(&picks, &comparables, &state.config, today);

    Ok(warp::reply::json(&json!({
        "suburbs": ranked,
        "best_picks": picks,
    })))
}
