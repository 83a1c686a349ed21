use dormhub_core::models::{Invoice, InvoiceStatus};
use dormhub_core::status::BookingStatus;
use proptest::prelude::*;

use super::builders::day;

pub fn status_strategy() -> impl Strategy<Value = BookingStatus> {
    prop_oneof![
        Just(BookingStatus::Pending),
        Just(BookingStatus::Approved),
        Just(BookingStatus::Active),
        Just(BookingStatus::CheckoutPending),
        Just(BookingStatus::Overdue),
        Just(BookingStatus::AutoCompleted),
        Just(BookingStatus::Completed),
        Just(BookingStatus::Cancelled),
        Just(BookingStatus::PaymentOverdue),
        "[a-z_]{3,12}".prop_map(|raw| BookingStatus::from(raw.as_str())),
    ]
}

pub fn terminal_status_strategy() -> impl Strategy<Value = BookingStatus> {
    prop_oneof![
        Just(BookingStatus::Completed),
        Just(BookingStatus::Cancelled),
        Just(BookingStatus::AutoCompleted),
    ]
}

/// A date string relative to the reference day
pub fn valid_date_strategy() -> impl Strategy<Value = String> {
    (-400i64..400).prop_map(day)
}

/// Strings that never parse as a calendar date
pub fn invalid_date_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("2024-13-01".to_string()),
        Just("2024-02-30".to_string()),
        Just("tomorrow".to_string()),
        "[a-z]{1,10}",
    ]
}

pub fn invoice_strategy() -> impl Strategy<Value = Option<Invoice>> {
    let status = prop_oneof![
        Just(InvoiceStatus::Paid),
        Just(InvoiceStatus::Completed),
        Just(InvoiceStatus::Pending),
        Just(InvoiceStatus::Other("refunded".to_string())),
    ];
    prop::option::of(
        (status, prop::option::of(valid_date_strategy()))
            .prop_map(|(status, due)| Invoice::new("inv", status, due)),
    )
}
