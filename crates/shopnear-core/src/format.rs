//! Display formatting for list and detail views.
//!
//! Pure functions only. Missing or unusable input never fails; it renders as
//! a fixed placeholder string instead.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::nearby::Address;

pub const UNKNOWN_DISTANCE: &str = "Unknown distance";
pub const ADDRESS_NOT_AVAILABLE: &str = "Address not available";
pub const NOT_AVAILABLE: &str = "N/A";

const METERS_PER_KM: f64 = 1000.0;

/// Formats a distance in meters: `"500 m"`, `"1.5 km"`, or
/// [`UNKNOWN_DISTANCE`] for absent or non-finite input.
#[must_use]
pub fn format_distance(meters: Option<f64>) -> String {
    let Some(meters) = meters.filter(|m| m.is_finite()) else {
        return UNKNOWN_DISTANCE.to_string();
    };

    if meters >= METERS_PER_KM {
        format!("{:.1} km", meters / METERS_PER_KM)
    } else {
        format!("{} m", meters.round())
    }
}

/// Joins the present address parts as `"area, city, pincode"`.
///
/// Blank parts count as absent. Returns [`ADDRESS_NOT_AVAILABLE`] when
/// nothing is left.
#[must_use]
pub fn format_address(address: Option<&Address>) -> String {
    let Some(address) = address else {
        return ADDRESS_NOT_AVAILABLE.to_string();
    };

    let parts: Vec<&str> = [&address.area, &address.city, &address.pincode]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        ADDRESS_NOT_AVAILABLE.to_string()
    } else {
        parts.join(", ")
    }
}

/// Formats a price with a currency symbol and thousands separators,
/// e.g. `"$1,234.50"`. Unknown currency codes are used as a prefix.
#[must_use]
pub fn format_price(price: Option<Decimal>, currency: &str) -> String {
    let Some(price) = price else {
        return NOT_AVAILABLE.to_string();
    };

    let symbol = match currency.to_ascii_uppercase().as_str() {
        "USD" => "$".to_string(),
        "INR" => "\u{20b9}".to_string(),
        "EUR" => "\u{20ac}".to_string(),
        "GBP" => "\u{a3}".to_string(),
        other => format!("{other} "),
    };

    let rounded = format!(
        "{:.2}",
        price
            .abs()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    );
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let sign = if price.is_sign_negative() && !price.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{sign}{symbol}{}.{fraction}", group_thousands(whole))
}

/// Formats a date as `"January 5, 2025"`.
///
/// Accepts RFC 3339 timestamps, naive ISO timestamps, or plain `YYYY-MM-DD`.
/// Anything else renders as [`NOT_AVAILABLE`].
#[must_use]
pub fn format_date(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(parse_display_date)
        .map_or_else(
            || NOT_AVAILABLE.to_string(),
            |date| date.format("%B %-d, %Y").to_string(),
        )
}

/// Slider label for a radius in kilometers, e.g. `"10 km"`.
#[must_use]
pub fn format_radius_km(km: f64) -> String {
    format!("{km} km")
}

fn parse_display_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;
