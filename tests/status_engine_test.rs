//! Status Engine Tests
//!
//! End-to-end decision scenarios through the public API.

mod common;

use common::*;
use dormhub_core::config::EngineConfig;
use dormhub_core::models::InvoiceStatus;
use dormhub_core::status::{BookingStatus, Priority, RecommendedAction, StatusEngine};

#[test]
fn active_booking_past_grace_period_becomes_overdue() {
    let engine = StatusEngine::new(EngineConfig {
        grace_period_days: 3,
        ..EngineConfig::default()
    });
    let booking = booking("b-1", BookingStatus::Active, -30, -5);

    let decision = engine.evaluate(&booking, None, reference_now());

    assert_eq!(decision.status, BookingStatus::Overdue);
    assert!(decision
        .actions
        .contains(&RecommendedAction::AdminInterventionRequired));
    assert_eq!(decision.priority, Priority::High);
    assert_eq!(decision.metadata.unwrap().days_past_checkout, Some(5));
}

#[test]
fn pending_booking_with_past_due_invoice_becomes_payment_overdue() {
    let engine = StatusEngine::default();
    let booking = booking("b-2", BookingStatus::Pending, 10, 40);
    let invoice = invoice(InvoiceStatus::Pending, Some(-2));

    let decision = engine.evaluate(&booking, Some(&invoice), reference_now());

    assert_eq!(decision.status, BookingStatus::PaymentOverdue);
    assert_eq!(decision.priority, Priority::High);
    assert_eq!(
        decision.actions,
        vec![
            RecommendedAction::SendPaymentReminder,
            RecommendedAction::ConsiderCancellation
        ]
    );
}

#[test]
fn invalid_dates_short_circuit_every_status() {
    let engine = StatusEngine::default();
    for status in [
        BookingStatus::Pending,
        BookingStatus::Active,
        BookingStatus::Completed,
        BookingStatus::from("legacy_hold"),
    ] {
        let mut booking = booking("b-3", status.clone(), 0, 10);
        booking.check_out_date = Some("31/12/2024".to_string());

        let decision = engine.evaluate(&booking, None, reference_now());

        assert!(decision.error);
        assert_eq!(decision.status, status);
        assert_eq!(decision.actions, vec![RecommendedAction::FixDates]);
        assert_eq!(decision.reason, "Invalid dates");
    }
}

#[test]
fn missing_dates_are_invalid() {
    let engine = StatusEngine::default();
    let mut booking = booking("b-4", BookingStatus::Approved, 1, 10);
    booking.check_in_date = None;

    assert!(engine.evaluate(&booking, None, reference_now()).error);
}

#[test]
fn needing_attention_orders_by_priority_and_keeps_input_order() {
    let engine = StatusEngine::default();
    let records = vec![
        // low: mid-stay, no actions
        record(booking("low", BookingStatus::Active, -10, 30), None),
        // high: unpaid and past due
        record(
            booking("high-1", BookingStatus::Pending, 5, 30),
            Some(invoice(InvoiceStatus::Pending, Some(-1))),
        ),
        // medium: within the grace period
        record(booking("medium", BookingStatus::Active, -10, -2), None),
        // high: overdue
        record(booking("high-2", BookingStatus::Active, -20, -10), None),
    ];

    let attention = engine.needing_attention(&records, reference_now());
    let ids: Vec<&str> = attention.iter().map(|item| item.booking.id.as_str()).collect();

    assert_eq!(ids, vec!["high-1", "high-2", "medium"]);
    assert_eq!(attention[2].decision.priority, Priority::Medium);
}

#[test]
fn low_priority_with_actions_still_needs_attention() {
    let engine = StatusEngine::default();
    let records = vec![record(
        booking("arriving", BookingStatus::Approved, 3, 30),
        Some(invoice(InvoiceStatus::Paid, None)),
    )];

    let attention = engine.needing_attention(&records, reference_now());

    assert_eq!(attention.len(), 1);
    assert_eq!(attention[0].decision.priority, Priority::Low);
    assert_eq!(
        attention[0].decision.actions,
        vec![RecommendedAction::SendCheckinInstructions]
    );
}

#[test]
fn evaluate_many_preserves_order() {
    let engine = StatusEngine::default();
    let records = vec![
        record(booking("a", BookingStatus::Cancelled, -5, 5), None),
        record(booking("b", BookingStatus::Active, -5, 3), None),
        record(booking("c", BookingStatus::Active, -40, -35), None),
    ];

    let statuses: Vec<BookingStatus> = engine
        .evaluate_many(&records, reference_now())
        .into_iter()
        .map(|d| d.status)
        .collect();

    assert_eq!(
        statuses,
        vec![
            BookingStatus::Cancelled,
            BookingStatus::Active,
            BookingStatus::AutoCompleted
        ]
    );
}

#[test]
fn decisions_serialize_with_snake_case_tokens() {
    let engine = StatusEngine::default();
    let booking = booking("b-5", BookingStatus::Active, -10, 4);

    let value = serde_json::to_value(engine.evaluate(&booking, None, reference_now())).unwrap();

    assert_eq!(value["status"], "active");
    assert_eq!(value["priority"], "normal");
    assert_eq!(value["actions"][0], "send_checkout_reminder");
    assert_eq!(value["metadata"]["days_until_checkout"], 4);
    assert!(value.get("error").is_none());
}
