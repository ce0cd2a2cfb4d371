// src/services/ics.rs
//
// Calendar export for a listing's inspection window: a minimal RFC 5545
// VCALENDAR payload the browser downloads as an .ics file.
use chrono::{DateTime, Utc};

use crate::models::Listing;

const PRODID: &str = "-//ScopePerth//Inspection Planner//EN";

fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Commas, semicolons and newlines carry meaning in ICS text values.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// Build the calendar event for a listing's open home. `None` when the
/// listing has no inspection window to export.
pub fn inspection_event(listing: &Listing, now: DateTime<Utc>) -> Option<String> {
    let open = listing.inspection_open?;
    let close = listing.inspection_close?;

    let summary = format!("Open home: {}", listing.address);
    let location = format!("{}, {}", listing.address, listing.suburb);
    let mut description = listing
        .price_display
        .clone()
        .unwrap_or_else(|| "Contact agent".to_string());
    if let Some(url) = &listing.url {
        description.push('\n');
        description.push_str(url);
    }

    // ICS requires CRLF line endings.
    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODID),
        "BEGIN:VEVENT".to_string(),
        format!("UID:listing-{}@scopeperth", listing.id),
        format!("DTSTAMP:{}", format_utc(now)),
        format!("DTSTART:{}", format_utc(open)),
        format!("DTEND:{}", format_utc(close)),
        format!("SUMMARY:{}", escape_text(&summary)),
        format!("LOCATION:{}", escape_text(&location)),
        format!("DESCRIPTION:{}", escape_text(&description)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];
    Some(lines.join("\r\n") + "\r\n")
}
