//! # Booking Model
//!
//! A tenant's reservation of a room for a date range. Dates are kept as the raw
//! strings received from the API so a malformed value reaches the status engine
//! (which reports it as `fix_dates`) instead of failing the whole decode.

use super::invoice::Invoice;
use super::{parse_calendar_date, RecordId};
use crate::status::BookingStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: RecordId,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, alias = "checkInDate", deserialize_with = "super::lenient_date")]
    pub check_in_date: Option<String>,
    #[serde(default, alias = "checkOutDate", deserialize_with = "super::lenient_date")]
    pub check_out_date: Option<String>,
    #[serde(default, alias = "tenantId", skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<RecordId>,
    #[serde(default, alias = "roomId", skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RecordId>,
}

impl Booking {
    pub fn new(
        id: impl Into<RecordId>,
        status: BookingStatus,
        check_in_date: impl Into<String>,
        check_out_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            status,
            check_in_date: Some(check_in_date.into()),
            check_out_date: Some(check_out_date.into()),
            tenant_id: None,
            room_id: None,
        }
    }

    /// Parsed check-in date, `None` when missing or malformed
    pub fn check_in(&self) -> Option<NaiveDate> {
        self.check_in_date.as_deref().and_then(parse_calendar_date)
    }

    /// Parsed check-out date, `None` when missing or malformed
    pub fn check_out(&self) -> Option<NaiveDate> {
        self.check_out_date.as_deref().and_then(parse_calendar_date)
    }
}

/// A booking paired with the invoice that bills it, as supplied per evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking: Booking,
    #[serde(default)]
    pub invoice: Option<Invoice>,
}

impl BookingRecord {
    pub fn new(booking: Booking, invoice: Option<Invoice>) -> Self {
        Self { booking, invoice }
    }
}
