// src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One property for sale, as tracked by the ingestion pipeline.
///
/// The source schema has churned over time (`pool` vs `has_pool`,
/// `price_display` vs `price`, `url` vs `domain_url`), so the aliases below
/// absorb every historical spelling here at the boundary and the rest of the
/// crate only ever sees this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub address: String,
    pub suburb: String,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
    #[serde(default)]
    pub car_spaces: Option<i32>,
    #[serde(default)]
    pub land_size: Option<f64>,
    #[serde(default, alias = "price")]
    pub price_display: Option<String>,
    #[serde(default)]
    pub price_numeric: Option<f64>,
    #[serde(default, alias = "domain_url")]
    pub url: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default, alias = "has_pool")]
    pub pool: bool,
    #[serde(default)]
    pub under_offer: bool,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub first_seen_date: Option<NaiveDate>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub price_drop_amount: Option<f64>,
    #[serde(default)]
    pub beach_distance_km: Option<f64>,
    #[serde(default)]
    pub motivation_score: Option<i32>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub agency_name: Option<String>,
    #[serde(default)]
    pub inspection_open: Option<DateTime<Utc>>,
    #[serde(default)]
    pub inspection_close: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Listing {
    /// Canonicalize a freshly deserialized row: suburb keys are upper-cased
    /// once here so no join site has to re-normalize, property types are
    /// lower-cased, and a negative price (bad ingestion) is treated as absent.
    pub fn normalized(mut self) -> Self {
        self.suburb = self.suburb.trim().to_uppercase();
        self.property_type = self
            .property_type
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        if matches!(self.price_numeric, Some(p) if p < 0.0) {
            self.price_numeric = None;
        }
        self
    }

    /// Bedroom count with a missing value read as zero.
    pub fn bedroom_count(&self) -> i32 {
        self.bedrooms.unwrap_or(0)
    }

    /// Whole days since the listing was first observed, if known.
    pub fn days_on_market(&self, today: NaiveDate) -> Option<i64> {
        self.first_seen_date.map(|seen| (today - seen).num_days())
    }
}

/// Benchmark sale statistics for a (suburb, bedroom-count) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoldComparable {
    pub suburb: String,
    pub bedrooms: i32,
    pub avg_sold_price: f64,
    pub median_sold_price: f64,
    #[serde(default)]
    pub sale_count: Option<i64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl SoldComparable {
    pub fn normalized(mut self) -> Self {
        self.suburb = self.suburb.trim().to_uppercase();
        self
    }
}

/// Median weekly rent for a (suburb, bedroom-count, property-type) bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalRecord {
    pub suburb: String,
    pub bedrooms: i32,
    pub property_type: String,
    pub median_weekly_rent: f64,
}

impl RentalRecord {
    pub fn normalized(mut self) -> Self {
        self.suburb = self.suburb.trim().to_uppercase();
        self.property_type = self.property_type.trim().to_lowercase();
        self
    }
}

/// Per-suburb sold-price aggregate, computed server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuburbSoldStats {
    pub suburb: String,
    #[serde(default)]
    pub median_sold: Option<f64>,
    #[serde(default)]
    pub avg_sold: Option<f64>,
    #[serde(default)]
    pub sale_count: Option<i64>,
    #[serde(default)]
    pub median_sold_12m: Option<f64>,
    #[serde(default)]
    pub avg_sold_12m: Option<f64>,
}

impl SuburbSoldStats {
    pub fn normalized(mut self) -> Self {
        self.suburb = self.suburb.trim().to_uppercase();
        self
    }
}

/// One historical sale, used for the quarterly price-trend chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoldRecord {
    pub suburb: String,
    pub sold_date: NaiveDate,
    pub sold_price: f64,
    #[serde(default)]
    pub property_type: Option<String>,
}

impl SoldRecord {
    pub fn normalized(mut self) -> Self {
        self.suburb = self.suburb.trim().to_uppercase();
        self.property_type = self.property_type.map(|t| t.to_lowercase());
        self
    }
}

/// Server-computed row behind the suburb directory page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuburbPageStats {
    pub suburb: String,
    #[serde(default)]
    pub listing_count: i64,
    #[serde(default)]
    pub median_ask: Option<f64>,
    #[serde(default)]
    pub median_sold: Option<f64>,
    #[serde(default)]
    pub weekly_rent: Option<f64>,
    #[serde(default)]
    pub gross_yield: Option<f64>,
    #[serde(default)]
    pub under_offer_pct: Option<f64>,
}

/// Server-computed investment snapshot, one row per suburb.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentSnapshot {
    pub suburb: String,
    #[serde(default)]
    pub median_sold: Option<f64>,
    #[serde(default)]
    pub median_ask: Option<f64>,
    #[serde(default)]
    pub weekly_rent: Option<f64>,
    #[serde(default)]
    pub gross_yield: Option<f64>,
}

// --- Derived shapes (computed, never persisted) ---

/// Aggregate over one suburb's filtered listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuburbStat {
    pub suburb: String,
    /// All listings in the group, priced or not.
    pub count: usize,
    /// Upper-middle ask price; only defined with enough priced listings.
    pub median: Option<f64>,
    /// Mean ask price rounded to the nearest dollar.
    pub average: Option<f64>,
    pub pools: usize,
    pub under_offer: usize,
}

/// One row of the investment scorecard: listings joined against rents and
/// sold-price aggregates by suburb.
#[derive(Debug, Clone, Serialize)]
pub struct ScorecardRow {
    pub suburb: String,
    pub listings: usize,
    pub median_ask: Option<f64>,
    pub weekly_rent: Option<f64>,
    pub gross_yield: Option<f64>,
    pub median_sold: Option<f64>,
    pub sold_count: Option<i64>,
    pub ask_vs_sold_pct: Option<f64>,
    pub under_offer_rate: f64,
}

/// A listing plus the classification flags the cards render.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedListing {
    #[serde(flatten)]
    pub listing: Listing,
    pub best_value: bool,
    pub motivated: bool,
    pub near_beach: bool,
    pub land: bool,
    pub days_on_market: Option<i64>,
    /// Benchmark average for this listing's suburb and bedroom count.
    pub suburb_avg: Option<f64>,
    /// Percent above (+) or below (-) the benchmark average.
    pub price_vs_avg_pct: Option<f64>,
    /// Percent shaved off the original asking price, when reduced.
    pub price_drop_pct: Option<i64>,
}

/// Headline counters for the dashboard hero band.
#[derive(Debug, Clone, Serialize)]
pub struct HeroStats {
    pub total: usize,
    pub pools: usize,
    pub under_budget: usize,
    pub under_offer: usize,
}

/// Open homes grouped under one planner label.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionBucket {
    pub label: &'static str,
    pub listings: Vec<Listing>,
}

/// One quarter on the trend chart: the label plus a median per suburb.
/// Suburbs without enough sales that quarter carry `null`, which the chart
/// renders as a gap.
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub quarter: String,
    #[serde(flatten)]
    pub medians: BTreeMap<String, Option<f64>>,
}

/// Whole-period sold-price summary for one suburb on the trend chart.
#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    pub suburb: String,
    pub count: usize,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}
