//! Booking quote computed on the client before anything is submitted.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Share of the subtotal charged as cleaning fee, in percent.
pub const CLEANING_FEE_PERCENT: u32 = 15;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Nights, subtotal, fee and total for a prospective stay.
///
/// The subtotal keeps the nightly price's cents; only the cleaning fee is
/// rounded, to a whole currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Quote {
    pub nights: u64,
    pub subtotal: Decimal,
    pub cleaning_fee: Decimal,
    pub total: Decimal,
}

impl Quote {
    /// Price a stay. Unset, unparseable or reversed dates give the all-zero
    /// quote, as does a non-positive price; this never fails.
    pub fn compute(price_per_night: Decimal, check_in: &str, check_out: &str) -> Self {
        let nights = nights_between(check_in, check_out);
        if nights == 0 || price_per_night <= Decimal::ZERO {
            return Self {
                nights,
                ..Self::default()
            };
        }

        let priced = price_per_night
            .checked_mul(Decimal::from(nights))
            .and_then(|subtotal| {
                let fee = subtotal
                    .checked_mul(Decimal::from(CLEANING_FEE_PERCENT))?
                    .checked_div(Decimal::ONE_HUNDRED)?
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                Some((subtotal, fee, subtotal.checked_add(fee)?))
            });

        match priced {
            Some((subtotal, cleaning_fee, total)) => Self {
                nights,
                subtotal,
                cleaning_fee,
                total,
            },
            None => {
                tracing::warn!(nights, "Quote overflowed, showing no price");
                Self {
                    nights,
                    ..Self::default()
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nights == 0
    }
}

/// Whole nights between two dates, rounded to the nearest day and clamped at
/// zero.
pub fn nights_between(check_in: &str, check_out: &str) -> u64 {
    let (Some(start), Some(end)) = (parse_moment(check_in), parse_moment(check_out)) else {
        return 0;
    };

    let days = ((end - start).num_seconds() as f64 / SECONDS_PER_DAY).round();
    if days > 0.0 {
        days as u64
    } else {
        0
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 and `YYYY-MM-DDTHH:MM[:SS]`.
pub fn parse_moment(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(moment) = DateTime::parse_from_rfc3339(raw) {
        return Some(moment.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
