// src/config.rs

/// Tunable constants for the derived-metrics engine.
///
/// These have drifted between iterations of the dashboard (the best-value
/// discount has been 10% and 15% at different points), so they live here as
/// named configuration instead of being scattered through the calculations.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// A listing is "best value" when priced below
    /// `benchmark_avg * (1.0 - best_value_discount)`.
    pub best_value_discount: f64,
    /// Stricter discount used for the investor "best picks" shortlist.
    pub investment_pick_discount: f64,
    /// Minimum number of priced listings before a suburb median is reported.
    pub min_priced_for_median: usize,
    /// The household budget behind the "under budget" toggle, in dollars.
    pub budget: f64,
    /// Listings within this many kilometres of the coast count as near-beach.
    pub near_beach_km: f64,
    /// The coast is approximated as a north-south line at this longitude.
    pub coast_longitude: f64,
    /// Minimum `motivation_score` for the score-based motivated-seller signal.
    pub motivated_min_score: i32,
    /// Days on market after which a listing reads as motivated.
    pub stale_listing_days: i64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            best_value_discount: 0.15,
            investment_pick_discount: 0.10,
            min_priced_for_median: 3,
            budget: 1_750_000.0,
            near_beach_km: 2.0,
            coast_longitude: 115.75,
            motivated_min_score: 3,
            stale_listing_days: 60,
        }
    }
}
