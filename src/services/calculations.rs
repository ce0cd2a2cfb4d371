// src/services/calculations.rs
//
// The aggregation half of the derived-metrics engine. Everything here is
// pure and synchronous: identical inputs always produce identical outputs.
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::MetricsConfig;
use crate::models::{
    AnnotatedListing, HeroStats, Listing, RentalRecord, ScorecardRow, SoldComparable, SoldRecord,
    SuburbPageStats, SuburbSoldStats, SuburbStat, TrendPoint, TrendSummary,
};
use crate::services::classify;

/// Suburb yield is always quoted against this reference configuration.
const REFERENCE_RENTAL_BEDROOMS: i32 = 3;
const REFERENCE_RENTAL_TYPE: &str = "house";

/// A quarter needs this many sales before its median is charted.
const MIN_SALES_PER_QUARTER: usize = 2;

const MAX_INVESTMENT_PICKS: usize = 6;

/// Ask-price median over a sorted slice: the upper-middle element at ⌊n/2⌋.
/// For four prices [100, 200, 300, 400] this is 300, not 250; the dashboard
/// has always quoted a real asking price rather than an interpolated one.
fn upper_middle(sorted: &[f64]) -> f64 {
    sorted[sorted.len() / 2]
}

/// Group listings by suburb and aggregate each group.
///
/// `count` covers every listing in the group; `median` and `average` only
/// consider priced listings, and the median is withheld entirely below
/// `min_priced` priced samples. Output is suburb-name ordered.
pub fn suburb_stats(listings: &[Listing], min_priced: usize) -> Vec<SuburbStat> {
    let mut groups: BTreeMap<&str, Vec<&Listing>> = BTreeMap::new();
    for listing in listings {
        groups.entry(listing.suburb.as_str()).or_default().push(listing);
    }

    groups
        .into_iter()
        .map(|(suburb, group)| {
            let mut prices: Vec<f64> = group.iter().filter_map(|l| l.price_numeric).collect();
            prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

            let median =
                (!prices.is_empty() && prices.len() >= min_priced).then(|| upper_middle(&prices));
            let average = (!prices.is_empty())
                .then(|| (prices.iter().sum::<f64>() / prices.len() as f64).round());

            SuburbStat {
                suburb: suburb.to_string(),
                count: group.len(),
                median,
                average,
                pools: group.iter().filter(|l| l.pool).count(),
                under_offer: group.iter().filter(|l| l.under_offer).count(),
            }
        })
        .collect()
}

/// Investor view: cheapest median first. Suburbs without a defined median
/// have too few priced listings to rank and are dropped.
pub fn top_suburbs_by_median(mut stats: Vec<SuburbStat>) -> Vec<SuburbStat> {
    stats.retain(|s| s.median.is_some());
    stats.sort_by(|a, b| {
        a.median
            .partial_cmp(&b.median)
            .unwrap_or(Ordering::Equal)
    });
    stats
}

/// Directory view: busiest suburb first, ties broken by name.
pub fn suburbs_by_listing_count(mut rows: Vec<SuburbPageStats>) -> Vec<SuburbPageStats> {
    rows.sort_by(|a, b| {
        b.listing_count
            .cmp(&a.listing_count)
            .then_with(|| a.suburb.cmp(&b.suburb))
    });
    rows
}

/// Annualized rent over ask price, as a percentage. Undefined when either
/// side is missing or zero.
pub fn gross_yield(weekly_rent: Option<f64>, median_ask: Option<f64>) -> Option<f64> {
    match (weekly_rent, median_ask) {
        (Some(rent), Some(ask)) if rent > 0.0 && ask > 0.0 => Some(rent * 52.0 / ask * 100.0),
        _ => None,
    }
}

/// Join suburb listing aggregates against rents and sold-price aggregates.
/// All three inputs arrive with upper-cased suburb keys, so the join is a
/// plain map lookup. Rows come back sorted by gross yield, best first, with
/// yield-less suburbs trailing.
pub fn scorecard(
    stats: &[SuburbStat],
    rentals: &[RentalRecord],
    sold_stats: &[SuburbSoldStats],
) -> Vec<ScorecardRow> {
    let rents: HashMap<&str, f64> = rentals
        .iter()
        .filter(|r| {
            r.bedrooms == REFERENCE_RENTAL_BEDROOMS && r.property_type == REFERENCE_RENTAL_TYPE
        })
        .map(|r| (r.suburb.as_str(), r.median_weekly_rent))
        .collect();
    let sold: HashMap<&str, &SuburbSoldStats> =
        sold_stats.iter().map(|s| (s.suburb.as_str(), s)).collect();

    let mut rows: Vec<ScorecardRow> = stats
        .iter()
        .map(|stat| {
            let weekly_rent = rents.get(stat.suburb.as_str()).copied();
            let suburb_sold = sold.get(stat.suburb.as_str());
            let median_sold = suburb_sold.and_then(|s| s.median_sold);
            let ask_vs_sold_pct = match (stat.median, median_sold) {
                (Some(ask), Some(sold)) if sold > 0.0 => Some((ask - sold) / sold * 100.0),
                _ => None,
            };
            let under_offer_rate = if stat.count > 0 {
                stat.under_offer as f64 / stat.count as f64 * 100.0
            } else {
                0.0
            };
            ScorecardRow {
                suburb: stat.suburb.clone(),
                listings: stat.count,
                median_ask: stat.median,
                weekly_rent,
                gross_yield: gross_yield(weekly_rent, stat.median),
                median_sold,
                sold_count: suburb_sold.and_then(|s| s.sale_count),
                ask_vs_sold_pct,
                under_offer_rate,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.gross_yield
            .unwrap_or(0.0)
            .partial_cmp(&a.gross_yield.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal)
    });
    rows
}

/// The investor shortlist: listings priced well under their benchmark, at a
/// stricter discount than the buyer-facing best-value badge.
pub fn best_investment_picks(
    listings: &[Listing],
    comparables: &[SoldComparable],
    config: &MetricsConfig,
) -> Vec<Listing> {
    listings
        .iter()
        .filter(|l| classify::is_best_value(l, comparables, config.investment_pick_discount))
        .take(MAX_INVESTMENT_PICKS)
        .cloned()
        .collect()
}

/// Hero-band counters. Total and pool counts track the filtered view; the
/// budget and under-offer figures always describe the whole market.
pub fn hero_stats(filtered: &[Listing], all: &[Listing], config: &MetricsConfig) -> HeroStats {
    HeroStats {
        total: filtered.len(),
        pools: filtered.iter().filter(|l| l.pool).count(),
        under_budget: all
            .iter()
            .filter(|l| matches!(l.price_numeric, Some(p) if p <= config.budget))
            .count(),
        under_offer: all.iter().filter(|l| l.under_offer).count(),
    }
}

/// Distinct suburbs present in a listing set, name-sorted, for selectors.
pub fn distinct_suburbs(listings: &[Listing]) -> Vec<String> {
    let set: HashSet<&str> = listings.iter().map(|l| l.suburb.as_str()).collect();
    let mut suburbs: Vec<String> = set.into_iter().map(String::from).collect();
    suburbs.sort();
    suburbs
}

/// Attach the card-level classification flags and benchmark deltas to each
/// listing.
pub fn annotate_listings(
    listings: &[Listing],
    comparables: &[SoldComparable],
    config: &MetricsConfig,
    today: NaiveDate,
) -> Vec<AnnotatedListing> {
    listings
        .iter()
        .map(|listing| {
            let suburb_avg = classify::find_comparable(listing, comparables)
                .map(|c| c.avg_sold_price);
            let price_vs_avg_pct = match (listing.price_numeric, suburb_avg) {
                (Some(price), Some(avg)) if avg > 0.0 => {
                    Some(((price - avg) / avg * 100.0).round())
                }
                _ => None,
            };
            let price_drop_pct = match (listing.price_numeric, listing.original_price) {
                (Some(price), Some(original)) if original > 0.0 && price < original => {
                    Some(((1.0 - price / original) * 100.0).round() as i64)
                }
                _ => None,
            };
            AnnotatedListing {
                best_value: classify::is_best_value(
                    listing,
                    comparables,
                    config.best_value_discount,
                ),
                motivated: classify::is_motivated_seller(listing, today, config),
                near_beach: classify::is_near_beach(listing, config),
                land: classify::is_land_listing(listing),
                days_on_market: listing.days_on_market(today),
                suburb_avg,
                price_vs_avg_pct,
                price_drop_pct,
                listing: listing.clone(),
            }
        })
        .collect()
}

// --- Quarterly price trends ---

fn quarter_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), (date.month() + 2) / 3)
}

fn quarter_label(year: i32, quarter: u32) -> String {
    format!("{} Q{}", year, quarter)
}

/// Textbook median for sold prices: for an even count, the two middle values
/// are averaged and rounded. Distinct from the upper-middle ask median in
/// that trend points interpolate while the ask figures quote a real listing.
pub fn trend_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        ((sorted[mid - 1] + sorted[mid]) / 2.0).round()
    })
}

/// One chart point per quarter with a median per selected suburb, quarters
/// in chronological order. A suburb needs `MIN_SALES_PER_QUARTER` sales in a
/// quarter to get a point there.
pub fn quarterly_trends(records: &[SoldRecord], suburbs: &[String]) -> Vec<TrendPoint> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut grouped: BTreeMap<(i32, u32), HashMap<&str, Vec<f64>>> = BTreeMap::new();
    for record in records {
        if record.sold_price <= 0.0 {
            continue;
        }
        grouped
            .entry(quarter_of(record.sold_date))
            .or_default()
            .entry(record.suburb.as_str())
            .or_default()
            .push(record.sold_price);
    }

    grouped
        .into_iter()
        .map(|((year, quarter), by_suburb)| {
            let medians = suburbs
                .iter()
                .map(|suburb| {
                    let median = by_suburb
                        .get(suburb.as_str())
                        .filter(|prices| prices.len() >= MIN_SALES_PER_QUARTER)
                        .and_then(|prices| trend_median(prices));
                    (suburb.clone(), median)
                })
                .collect();
            TrendPoint {
                quarter: quarter_label(year, quarter),
                medians,
            }
        })
        .collect()
}

/// Whole-period summary per selected suburb: sales count, median, low, high.
pub fn trend_summaries(records: &[SoldRecord], suburbs: &[String]) -> Vec<TrendSummary> {
    suburbs
        .iter()
        .map(|suburb| {
            let prices: Vec<f64> = records
                .iter()
                .filter(|r| &r.suburb == suburb && r.sold_price > 0.0)
                .map(|r| r.sold_price)
                .collect();
            TrendSummary {
                suburb: suburb.clone(),
                count: prices.len(),
                median: trend_median(&prices),
                min: prices.iter().cloned().fold(None, |acc: Option<f64>, p| {
                    Some(acc.map_or(p, |m| m.min(p)))
                }),
                max: prices.iter().cloned().fold(None, |acc: Option<f64>, p| {
                    Some(acc.map_or(p, |m| m.max(p)))
                }),
            }
        })
        .collect()
}
