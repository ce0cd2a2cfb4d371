// src/handlers/prefs.rs
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::prefs::Theme;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ThemeBody {
    pub theme: Theme,
}

#[derive(Debug, Deserialize)]
pub struct HeroBody {
    pub dismissed: bool,
}

pub async fn get_theme(state: Arc<AppState>) -> Result<Json, Rejection> {
    Ok(warp::reply::json(&json!({ "theme": state.prefs.theme() })))
}

pub async fn put_theme(body: ThemeBody, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Setting theme to {:?}", body.theme);
    state.prefs.set_theme(body.theme).map_err(|e| {
        error!("Failed to persist theme: {}", e);
        warp::reject::custom(ApiError::new("could not save theme"))
    })?;
    Ok(warp::reply::json(&json!({ "theme": body.theme })))
}

pub async fn get_hero(state: Arc<AppState>) -> Result<Json, Rejection> {
    Ok(warp::reply::json(
        &json!({ "dismissed": state.prefs.hero_dismissed() }),
    ))
}

pub async fn put_hero(body: HeroBody, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Setting hero dismissed flag to {}", body.dismissed);
    state.prefs.set_hero_dismissed(body.dismissed).map_err(|e| {
        error!("Failed to persist hero flag: {}", e);
        warp::reject::custom(ApiError::new("could not save hero flag"))
    })?;
    Ok(warp::reply::json(&json!({ "dismissed": body.dismissed })))
}

fn sorted(ids: std::collections::HashSet<i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids
}

pub async fn get_favourites(state: Arc<AppState>) -> Result<Json, Rejection> {
    Ok(warp::reply::json(&sorted(state.prefs.favourites())))
}

pub async fn toggle_favourite(id: i64, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Toggling favourite {}", id);
    let favourites = state.prefs.toggle_favourite(id).map_err(|e| {
        error!("Failed to persist favourites: {}", e);
        warp::reject::custom(ApiError::new("could not save favourites"))
    })?;
    Ok(warp::reply::json(&sorted(favourites)))
}
