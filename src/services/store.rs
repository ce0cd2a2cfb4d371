// src/services/store.rs
use chrono::NaiveDate;
use log::{error, info};
use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::env;

use crate::models::{
    InvestmentSnapshot, Listing, RentalRecord, SoldComparable, SoldRecord, SuburbPageStats,
    SuburbSoldStats,
};
use crate::BoxError;

pub type Result<T> = std::result::Result<T, BoxError>;

/// Hard cap on sold rows pulled for the trend chart, matching the data
/// source's own range limit.
const SOLD_ROW_LIMIT: usize = 5000;

/// Read-only client for the remote table store (Supabase PostgREST).
///
/// Every row leaves this layer already canonicalized: suburb keys upper-cased
/// and property types lower-cased, so the metrics engine never re-normalizes.
pub struct DataStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl DataStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        DataStore {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = env::var("SUPABASE_URL")
            .map_err(|_| anyhow::anyhow!("SUPABASE_URL must be set"))?;
        let api_key = env::var("SUPABASE_ANON_KEY")
            .map_err(|_| anyhow::anyhow!("SUPABASE_ANON_KEY must be set"))?;
        Ok(Self::new(base_url, api_key))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/rest/v1/{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<Vec<T>> {
        let rows = req
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<T>>()
            .await?;
        Ok(rows)
    }

    /// Server-computed aggregate functions are exposed as RPC endpoints.
    async fn rpc<T: DeserializeOwned>(&self, function: &str) -> Result<Vec<T>> {
        info!("Calling data store function {}", function);
        let req = self
            .client
            .post(format!("{}/rest/v1/rpc/{}", self.base_url, function))
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({}));
        self.fetch_rows(req).await
    }

    /// All active listings; every further filter is applied client-side.
    pub async fn fetch_active_listings(&self) -> Result<Vec<Listing>> {
        let rows: Vec<Listing> = self
            .fetch_rows(
                self.get("property_listings")
                    .query(&[("select", "*"), ("status", "eq.active")]),
            )
            .await?;
        info!("Fetched {} active listings", rows.len());
        Ok(rows.into_iter().map(Listing::normalized).collect())
    }

    /// Active listings for one suburb, cheapest first with priceless last.
    pub async fn fetch_suburb_listings(&self, suburb: &str) -> Result<Vec<Listing>> {
        let rows: Vec<Listing> = self
            .fetch_rows(self.get("property_listings").query(&[
                ("select", "*"),
                ("status", "eq.active"),
                ("suburb", &format!("eq.{}", suburb)),
                ("order", "price_numeric.asc.nullslast"),
            ]))
            .await?;
        Ok(rows.into_iter().map(Listing::normalized).collect())
    }

    /// (suburb, bedroom-count) sold-price benchmarks.
    pub async fn fetch_comparables(&self) -> Result<Vec<SoldComparable>> {
        let rows: Vec<SoldComparable> = self
            .fetch_rows(self.get("comparables").query(&[("select", "*")]))
            .await?;
        Ok(rows.into_iter().map(SoldComparable::normalized).collect())
    }

    /// (suburb, bedroom-count, property-type) median weekly rents.
    pub async fn fetch_rentals(&self) -> Result<Vec<RentalRecord>> {
        let rows: Vec<RentalRecord> = self
            .fetch_rows(self.get("rental_medians").query(&[("select", "*")]))
            .await?;
        Ok(rows.into_iter().map(RentalRecord::normalized).collect())
    }

    /// Per-suburb sold-price aggregates, pre-computed by the data source.
    pub async fn fetch_suburb_sold_stats(&self) -> Result<Vec<SuburbSoldStats>> {
        let rows: Vec<SuburbSoldStats> = self
            .fetch_rows(self.get("suburb_sold_stats").query(&[("select", "*")]))
            .await?;
        Ok(rows.into_iter().map(SuburbSoldStats::normalized).collect())
    }

    /// Historical sales for the trend chart. Filtered server-side to the
    /// selected suburbs, a cutoff date, and optionally one property type.
    pub async fn fetch_sold_records(
        &self,
        suburbs: &[String],
        property_type: Option<&str>,
        cutoff: NaiveDate,
    ) -> Result<Vec<SoldRecord>> {
        let suburb_list = format!("in.({})", suburbs.join(","));
        let cutoff_filter = format!("gte.{}", cutoff.format("%Y-%m-%d"));
        let mut query = vec![
            ("select", "suburb,sold_date,sold_price,property_type"),
            ("suburb", suburb_list.as_str()),
            ("sold_price", "gt.0"),
            ("sold_date", cutoff_filter.as_str()),
        ];
        let type_filter;
        if let Some(pt) = property_type {
            type_filter = format!("eq.{}", pt);
            query.push(("property_type", type_filter.as_str()));
        }
        let req = self
            .get("sold_properties")
            .query(&query)
            .header(header::RANGE, format!("0-{}", SOLD_ROW_LIMIT - 1));
        let rows: Vec<SoldRecord> = self.fetch_rows(req).await?;
        info!("Fetched {} sold records for trend chart", rows.len());
        Ok(rows.into_iter().map(SoldRecord::normalized).collect())
    }

    /// One investment-snapshot row per suburb.
    pub async fn fetch_investment_snapshots(&self) -> Result<Vec<InvestmentSnapshot>> {
        self.rpc("get_suburb_investment_stats").await
    }

    /// Per-suburb summary rows for the directory page.
    pub async fn fetch_suburb_page_stats(&self) -> Result<Vec<SuburbPageStats>> {
        self.rpc("get_suburb_page_stats").await
    }

    /// Suburb names with historical sold records, for comparison selectors.
    pub async fn fetch_distinct_sold_suburbs(&self) -> Result<Vec<String>> {
        #[derive(Deserialize)]
        struct Row {
            suburb: String,
        }
        let rows: Vec<Row> = self.rpc("get_distinct_sold_suburbs").await?;
        Ok(rows.into_iter().map(|r| r.suburb.to_uppercase()).collect())
    }
}

/// A failed fetch is logged and rendered as an empty dataset; the dashboard
/// shows "no results" rather than an error page.
pub fn rows_or_empty<T>(what: &str, result: Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to fetch {}: {}", what, e);
            Vec::new()
        }
    }
}
