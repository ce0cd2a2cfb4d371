// src/handlers/inspections.rs
use chrono::Utc;
use log::{error, info};
use std::sync::Arc;
use warp::http::Response;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::store::rows_or_empty;
use crate::services::{ics, inspections};
use crate::AppState;

/// The open-home planner: upcoming inspections bucketed by day.
pub async fn get_planner(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling inspection planner request");
    let listings = rows_or_empty("active listings", state.store.fetch_active_listings().await);
    let buckets = inspections::upcoming_inspections(&listings, Utc::now());
    Ok(warp::reply::json(&buckets))
}

/// Download one listing's inspection window as an .ics calendar file.
pub async fn download_calendar(
    id: i64,
    state: Arc<AppState>,
) -> Result<Response<String>, Rejection> {
    info!("Handling calendar export for listing {}", id);

    let listings = match state.store.fetch_active_listings().await {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to fetch listings for calendar export: {}", e);
            return Err(warp::reject::custom(ApiError::new(
                "listing data unavailable",
            )));
        }
    };
    let listing = listings
        .iter()
        .find(|l| l.id == id)
        .ok_or_else(warp::reject::not_found)?;

    let payload = ics::inspection_event(listing, Utc::now()).ok_or_else(|| {
        warp::reject::custom(ApiError::new("listing has no inspection window"))
    })?;

    Response::builder()
        .header("content-type", "text/calendar; charset=utf-8")
        .header(
            "content-disposition",
            format!("attachment; filename=\"inspection-{}.ics\"", id),
        )
        .body(payload)
        .map_err(|e| {
            error!("Failed to build calendar response: {}", e);
            warp::reject::custom(ApiError::new("calendar export failed"))
        })
}
