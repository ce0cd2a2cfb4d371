// src/handlers/trends.rs
use chrono::{Duration, NaiveDate, Utc};
use log::info;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::services::calculations;
use crate::services::store::rows_or_empty;
use crate::AppState;

/// The chart stays readable with at most this many suburbs overlaid.
const MAX_TREND_SUBURBS: usize = 5;

const DEFAULT_PERIOD_MONTHS: i64 = 36;

/// Cutoff used when the caller asks for all time.
const ALL_TIME_CUTOFF: &str = "2000-01-01";

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    /// Comma-separated suburb names.
    pub suburbs: Option<String>,
    pub property_type: Option<String>,
    /// Look-back window in months; 0 means all time.
    pub months: Option<i64>,
}

/// Quarterly median sold prices for up to five suburbs, plus a whole-period
/// summary per suburb.
pub async fn get_trends(query: TrendQuery, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling trends request: {:?}", query);

    let mut suburbs: Vec<String> = query
        .suburbs
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    suburbs.truncate(MAX_TREND_SUBURBS);

    if suburbs.is_empty() {
        return Ok(warp::reply::json(&json!({
            "points": [],
            "summaries": [],
            "record_count": 0,
        })));
    }

    let months = query.months.unwrap_or(DEFAULT_PERIOD_MONTHS);
    let cutoff: NaiveDate = if months > 0 {
        // Months approximated at 30.5 days, same as the period selector.
        Utc::now().date_naive() - Duration::days((months as f64 * 30.5) as i64)
    } else {
        ALL_TIME_CUTOFF.parse().unwrap_or(NaiveDate::MIN)
    };
    let property_type = query
        .property_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("all"));

    let records = rows_or_empty(
        "sold records",
        state
            .store
            .fetch_sold_records(&suburbs, property_type, cutoff)
            .await,
    );

    Ok(warp::reply::json(&json!({
        "points": calculations::quarterly_trends(&records, &suburbs),
        "summaries": calculations::trend_summaries(&records, &suburbs),
        "record_count": records.len(),
    })))
}

/// Suburb names with sold history, for the comparison selector.
pub async fn get_trend_suburbs(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling trend suburb list request");
    let mut suburbs = rows_or_empty(
        "distinct sold suburbs",
        state.store.fetch_distinct_sold_suburbs().await,
    );
    suburbs.sort();
    Ok(warp::reply::json(&suburbs))
}
