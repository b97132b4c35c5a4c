use crate::errors::ApiResult;
use crate::pricing::{nights_between, parse_moment};
use crate::security::FormErrors;
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[display(fmt = "pending")]
    Pending,
    #[display(fmt = "confirmed")]
    Confirmed,
    #[display(fmt = "cancelled")]
    Cancelled,
    #[display(fmt = "completed")]
    Completed,
}

impl BookingStatus {
    /// Pending and confirmed stays still hold their dates.
    pub fn blocks_dates(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn can_cancel(self) -> bool {
        self.blocks_dates()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: u64,
    pub listing: u64,
    #[serde(default)]
    pub listing_title: Option<String>,
    #[serde(default)]
    pub listing_city: Option<String>,
    #[serde(default)]
    pub listing_country: Option<String>,
    #[serde(default)]
    pub primary_image: Option<String>,
    #[serde(default)]
    pub guest: Option<u64>,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub guest_email: Option<String>,
    pub check_in: String,
    pub check_out: String,
    #[serde(default)]
    pub guests: u32,
    pub total_price: Decimal,
    pub status: BookingStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub nights: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Booking {
    pub fn is_pending(&self) -> bool {
        self.status == BookingStatus::Pending
    }

    pub fn nights(&self) -> u64 {
        self.nights
            .unwrap_or_else(|| nights_between(&self.check_in, &self.check_out))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewBooking {
    pub listing: u64,
    pub check_in: String,
    pub check_out: String,
    pub guests: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl NewBooking {
    pub fn validate(&self) -> ApiResult<()> {
        let mut errors = FormErrors::new();
        if parse_moment(&self.check_in).is_none() {
            errors.add("check_in", "Select a check-in date");
        }
        if parse_moment(&self.check_out).is_none() {
            errors.add("check_out", "Select a check-out date");
        }
        if errors.is_empty() && nights_between(&self.check_in, &self.check_out) == 0 {
            errors.add("check_out", "Check-out must be after check-in.");
        }
        if self.guests == 0 {
            errors.add("guests", "At least one guest is required");
        }
        errors.finish()
    }
}

/// A date range already held by another booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedRange {
    pub check_in: String,
    pub check_out: String,
}

impl BookedRange {
    /// Half-open overlap: a stay may start on the day another ends.
    pub fn overlaps(&self, check_in: &str, check_out: &str) -> bool {
        let (Some(start), Some(end), Some(held_start), Some(held_end)) = (
            parse_moment(check_in),
            parse_moment(check_out),
            parse_moment(&self.check_in),
            parse_moment(&self.check_out),
        ) else {
            return false;
        };
        start < held_end && end > held_start
    }
}

pub fn is_available(ranges: &[BookedRange], check_in: &str, check_out: &str) -> bool {
    !ranges
        .iter()
        .any(|range| range.overlaps(check_in, check_out))
}
