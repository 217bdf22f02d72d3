//! Booking records and the fields derived from them for display

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A confirmed booking as returned by the booking API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    #[serde(alias = "bookingConfirmationCode")]
    pub confirmation_code: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    #[serde(alias = "numOfAdults")]
    pub adults: u32,
    #[serde(alias = "numOfChildren", default)]
    pub children: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub room_type: String,
    /// Price per night; accepted as a JSON number or string
    #[serde(alias = "roomPrice")]
    pub nightly_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
}

/// The three records behind one receipt. Never partially populated.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDetails {
    pub booking: BookingRecord,
    pub room: RoomRecord,
    pub user: UserRecord,
}

/// Display fields computed from a [`BookingDetails`]
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedReceipt {
    pub stay_nights: u32,
    pub total_price: Decimal,
    pub check_in_display: String,
    pub check_out_display: String,
}

impl DerivedReceipt {
    /// Derive stay length, total price and display dates.
    ///
    /// A check-out before check-in is rejected, as is a total too large to
    /// represent; a same-day stay is zero nights and costs nothing.
    pub fn derive(details: &BookingDetails) -> Result<Self> {
        let booking = &details.booking;
        let days = (booking.check_out_date - booking.check_in_date).num_days();
        let stay_nights = u32::try_from(days).map_err(|_| {
            Error::InvalidBooking(format!(
                "check-out {} is before check-in {}",
                booking.check_out_date, booking.check_in_date
            ))
        })?;
        let total_price = details
            .room
            .nightly_price
            .checked_mul(Decimal::from(stay_nights))
            .ok_or_else(|| {
                Error::InvalidBooking(format!(
                    "total for {} nights at {} per night is out of range",
                    stay_nights, details.room.nightly_price
                ))
            })?;

        Ok(Self {
            stay_nights,
            total_price,
            check_in_display: format_date(booking.check_in_date),
            check_out_display: format_date(booking.check_out_date),
        })
    }
}

/// A fully resolved receipt: the fetched records plus derived fields
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub details: BookingDetails,
    pub derived: DerivedReceipt,
}

impl Receipt {
    pub fn from_details(details: BookingDetails) -> Result<Self> {
        let derived = DerivedReceipt::derive(&details)?;
        Ok(Self { details, derived })
    }

    /// e.g. `2 Adults • 1 Child • 3 Nights`
    pub fn guest_summary(&self) -> String {
        let b = &self.details.booking;
        let mut parts = vec![plural(b.adults, "Adult", "Adults")];
        if b.children > 0 {
            parts.push(plural(b.children, "Child", "Children"));
        }
        parts.push(plural(self.derived.stay_nights, "Night", "Nights"));
        parts.join(" • ")
    }

    pub fn total_display(&self) -> String {
        format_amount(self.derived.total_price)
    }
}

/// Name of the exported image; the code is used verbatim
pub fn receipt_file_name(confirmation_code: &str) -> String {
    format!("booking-receipt-{}.png", confirmation_code)
}

/// `Dec 15, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `$459.00`
pub fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

fn plural(n: u32, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}
