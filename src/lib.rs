// src/lib.rs

pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

use crate::config::MetricsConfig;
use crate::services::prefs::PrefsStore;
use crate::services::store::DataStore;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything the handlers need, injected through the warp filter chain.
pub struct AppState {
    pub store: DataStore,
    pub prefs: PrefsStore,
    pub config: MetricsConfig,
}
