// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::{inspections, listings, prefs, suburbs, trends};
use crate::handlers::trends::TrendQuery;
use crate::services::filters::ListingFilter;
use crate::AppState;

// Map our custom errors (and warp's own) onto JSON error replies.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = api_error.message.clone();
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = "Invalid query parameters".to_string();
    } else if err.find::<warp::body::BodyDeserializeError>().is_some() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = "Invalid request body".to_string();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let listings_route = warp::path!("api" / "v1" / "listings")
        .and(warp::get())
        .and(warp::query::<ListingFilter>())
        .and(state_filter.clone())
        .and_then(listings::get_listings);

    let investor_route = warp::path!("api" / "v1" / "investor")
        .and(warp::get())
        .and(warp::query::<ListingFilter>())
        .and(state_filter.clone())
        .and_then(listings::get_investor_overview);

    let scorecard_route = warp::path!("api" / "v1" / "scorecard")
        .and(warp::get())
        .and(warp::query::<ListingFilter>())
        .and(state_filter.clone())
        .and_then(suburbs::get_scorecard);

    let suburb_directory_route = warp::path!("api" / "v1" / "suburbs")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(suburbs::get_suburb_directory);

    let suburb_page_route = warp::path!("api" / "v1" / "suburbs" / String)
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(suburbs::get_suburb_page);

    let trends_route = warp::path!("api" / "v1" / "trends")
        .and(warp::get())
        .and(warp::query::<TrendQuery>())
        .and(state_filter.clone())
        .and_then(trends::get_trends);

    let trend_suburbs_route = warp::path!("api" / "v1" / "trends" / "suburbs")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(trends::get_trend_suburbs);

    let planner_route = warp::path!("api" / "v1" / "inspections")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(inspections::get_planner);

    let calendar_route = warp::path!("api" / "v1" / "inspections" / i64 / "calendar.ics")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(inspections::download_calendar);

    let theme_get = warp::path!("api" / "v1" / "prefs" / "theme")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(prefs::get_theme);

    let theme_put = warp::path!("api" / "v1" / "prefs" / "theme")
        .and(warp::put())
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(prefs::put_theme);

    let hero_get = warp::path!("api" / "v1" / "prefs" / "hero")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(prefs::get_hero);

    let hero_put = warp::path!("api" / "v1" / "prefs" / "hero")
        .and(warp::put())
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(prefs::put_hero);

    let favourites_get = warp::path!("api" / "v1" / "favourites")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(prefs::get_favourites);

    let favourite_toggle = warp::path!("api" / "v1" / "favourites" / i64 / "toggle")
        .and(warp::post())
        .and(state_filter.clone())
        .and_then(prefs::toggle_favourite);

    info!("All routes configured successfully.");

    listings_route
        .or(investor_route)
        .or(scorecard_route)
        .or(trend_suburbs_route)
        .or(trends_route)
        .or(suburb_directory_route)
        .or(suburb_page_route)
        .or(planner_route)
        .or(calendar_route)
        .or(theme_get)
        .or(theme_put)
        .or(hero_get)
        .or(hero_put)
        .or(favourites_get)
        .or(favourite_toggle)
        .recover(handle_rejection)
}
