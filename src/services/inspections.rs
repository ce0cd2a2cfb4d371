// src/services/inspections.rs
//
// Groups upcoming open homes into planner buckets. All day arithmetic is in
// Perth local time; an open home at 9am Saturday must land on Saturday even
// when its UTC timestamp is still Friday.
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Australia::Perth;

use crate::models::{InspectionBucket, Listing};

/// Planner labels in display order. Only non-empty buckets are emitted.
const BUCKET_ORDER: [&str; 5] = ["Today", "Tomorrow", "This Weekend", "Next Week", "Later"];

fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Perth).date_naive()
}

/// Which bucket a given open date belongs to, relative to `today`.
///
/// "This Weekend" is the Saturday/Sunday still ahead in the current
/// Monday-started week; "Next Week" is the following Monday through Sunday.
/// A Saturday seven days out therefore reads as next week, not this weekend.
fn bucket_for(open: NaiveDate, today: NaiveDate) -> &'static str {
    if open == today {
        return "Today";
    }
    if open == today + Duration::days(1) {
        return "Tomorrow";
    }

    let week_monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let saturday = week_monday + Duration::days(5);
    let sunday = week_monday + Duration::days(6);
    if open > today && (open == saturday || open == sunday) {
        return "This Weekend";
    }

    let next_monday = week_monday + Duration::days(7);
    let next_sunday = week_monday + Duration::days(13);
    if open >= next_monday && open <= next_sunday {
        return "Next Week";
    }

    "Later"
}

/// Listings with a fully future inspection window, sorted by open time and
/// grouped under the planner labels.
pub fn upcoming_inspections(listings: &[Listing], now: DateTime<Utc>) -> Vec<InspectionBucket> {
    let today = local_date(now);

    let mut upcoming: Vec<(DateTime<Utc>, &Listing)> = listings
        .iter()
        .filter_map(|l| match (l.inspection_open, l.inspection_close) {
            (Some(open), Some(close)) if open > now && close > now => Some((open, l)),
            _ => None,
        })
        .collect();
    upcoming.sort_by_key(|(open, _)| *open);

    BUCKET_ORDER
        .iter()
        .filter_map(|label| {
            let members: Vec<Listing> = upcoming
                .iter()
                .filter(|(open, _)| bucket_for(local_date(*open), today) == *label)
                .map(|(_, l)| (*l).clone())
                .collect();
            (!members.is_empty()).then(|| InspectionBucket {
                label,
                listings: members,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn listing_with_window(id: i64, open: DateTime<Utc>, close: DateTime<Utc>) -> Listing {
        Listing {
            id,
            address: format!("{} Example St", id),
            suburb: "SCARBOROUGH".to_string(),
            bedrooms: Some(3),
            bathrooms: Some(2),
            car_spaces: Some(1),
            land_size: None,
            price_display: None,
            price_numeric: Some(1_000_000.0),
            url: None,
            photo_url: None,
            pool: false,
            under_offer: false,
            property_type: Some("house".to_string()),
            first_seen_date: None,
            latitude: None,
            longitude: None,
            original_price: None,
            price_drop_amount: None,
            beach_distance_km: None,
            motivation_score: None,
            agent_name: None,
            agency_name: None,
            inspection_open: Some(open),
            inspection_close: Some(close),
            status: Some("active".to_string()),
        }
    }

    /// 2026-08-19 is a Wednesday; 02:00 UTC is 10:00 in Perth.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 19, 2, 0, 0).unwrap()
    }

    fn perth_morning(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        // 10:00 Perth == 02:00 UTC (AWST, UTC+8, no DST)
        Utc.with_ymd_and_hms(y, m, d, 2, 0, 0).unwrap()
    }

    #[test]
    fn buckets_relative_to_a_wednesday() {
        let today = local_date(now());
        assert_eq!(bucket_for(today, today), "Today");
        assert_eq!(bucket_for(today + Duration::days(1), today), "Tomorrow");
        // Saturday the 22nd is still in this week.
        assert_eq!(
            bucket_for(NaiveDate::from_ymd_opt(2026, 8, 22).unwrap(), today),
            "This Weekend"
        );
        assert_eq!(
            bucket_for(NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(), today),
            "This Weekend"
        );
        // Monday the 24th opens the following week.
        assert_eq!(
            bucket_for(NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(), today),
            "Next Week"
        );
        assert_eq!(
            bucket_for(NaiveDate::from_ymd_opt(2026, 8, 31).unwrap(), today),
            "Later"
        );
    }

    #[test]
    fn a_saturday_seven_days_out_is_next_week() {
        // Evaluate on a Saturday; the same weekday next week is "Next Week",
        // not "This Weekend".
        let saturday = NaiveDate::from_ymd_opt(2026, 8, 22).unwrap();
        assert_eq!(bucket_for(saturday + Duration::days(7), saturday), "Next Week");
        // Sunday the 23rd is still this weekend.
        assert_eq!(
            bucket_for(NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(), saturday),
            "This Weekend"
        );
    }

    #[test]
    fn groups_only_future_windows_in_fixed_order() {
        let current = now();
        let listings = vec![
            // Later today.
            listing_with_window(
                1,
                current + Duration::hours(4),
                current + Duration::hours(5),
            ),
            // Saturday morning.
            listing_with_window(
                2,
                perth_morning(2026, 8, 22),
                perth_morning(2026, 8, 22) + Duration::minutes(45),
            ),
            // Already closed: excluded.
            listing_with_window(
                3,
                current - Duration::hours(3),
                current - Duration::hours(2),
            ),
            // Next Tuesday.
            listing_with_window(
                4,
                perth_morning(2026, 8, 25),
                perth_morning(2026, 8, 25) + Duration::minutes(30),
            ),
        ];

        let buckets = upcoming_inspections(&listings, current);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["Today", "This Weekend", "Next Week"]);
        assert_eq!(buckets[0].listings[0].id, 1);
        assert_eq!(buckets[1].listings[0].id, 2);
        assert_eq!(buckets[2].listings[0].id, 4);
    }

    #[test]
    fn listings_without_a_window_are_ignored() {
        let mut listing = listing_with_window(1, now() + Duration::days(1), now() + Duration::days(1));
        listing.inspection_close = None;
        assert!(upcoming_inspections(&[listing], now()).is_empty());
    }
}
