//! # Booking Status Engine
//!
//! Reconciles a booking's date-driven lifecycle with the payment state of its
//! invoice and recommends the status the booking should be in.
//!
//! The engine holds only its immutable [`EngineConfig`]; every evaluation is a
//! pure function of `(booking, invoice, now)`. It performs no I/O, never mutates
//! its inputs and can be shared freely across threads.
//!
//! ## Decision table
//!
//! | Current status                  | Condition                              | Result              |
//! |---------------------------------|----------------------------------------|---------------------|
//! | any                             | check-in or check-out unparseable      | unchanged, error    |
//! | pending / approved              | unpaid, invoice past due               | `payment_overdue`   |
//! | pending / approved              | unpaid, not past due                   | unchanged           |
//! | pending / approved              | paid, check-in reached                 | `active`            |
//! | pending / approved              | paid, check-in in the future           | `approved`          |
//! | active                          | checkout within reminder window        | `active` + reminder |
//! | active                          | past checkout, within grace            | `checkout_pending`  |
//! | active                          | past grace, within auto-complete       | `overdue`           |
//! | active / overdue / checkout_pending | past auto-complete threshold       | `auto_completed`    |
//! | overdue / checkout_pending      | otherwise                              | unchanged + review  |
//! | completed / cancelled / auto_completed | always                          | unchanged           |

use super::decision::{DecisionMetadata, StatusDecision};
use super::states::{BookingStatus, Priority, RecommendedAction};
use crate::config::EngineConfig;
use crate::models::{Booking, BookingRecord, Invoice};
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Reverse;

const CHECKOUT_RESOLUTION_ACTIONS: &[RecommendedAction] = &[
    RecommendedAction::FinalizeBilling,
    RecommendedAction::ReleaseRoom,
    RecommendedAction::ArchiveBooking,
];

/// Signed day distances between the booking dates and the reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timeline {
    days_until_checkin: i64,
    days_until_checkout: i64,
    days_past_checkout: i64,
}

impl Timeline {
    fn new(check_in: NaiveDate, check_out: NaiveDate, today: NaiveDate) -> Self {
        let days_until_checkout = (check_out - today).num_days();
        Self {
            days_until_checkin: (check_in - today).num_days(),
            days_until_checkout,
            days_past_checkout: -days_until_checkout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PaymentState {
    paid: bool,
    overdue: bool,
}

impl PaymentState {
    fn from_invoice(invoice: Option<&Invoice>, today: NaiveDate) -> Self {
        match invoice {
            Some(invoice) => Self {
                paid: invoice.is_paid(),
                overdue: invoice.is_past_due(today),
            },
            None => Self {
                paid: false,
                overdue: false,
            },
        }
    }
}

/// A booking flagged by [`StatusEngine::needing_attention`]
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionItem<'a> {
    pub booking: &'a Booking,
    pub invoice: Option<&'a Invoice>,
    pub decision: StatusDecision,
}

/// Stateless decision engine for booking lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusEngine {
    config: EngineConfig,
}

impl StatusEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the status `booking` should have at `now`.
    ///
    /// Never fails: unparseable dates produce a decision with `error` set and
    /// a `fix_dates` action.
    pub fn evaluate(
        &self,
        booking: &Booking,
        invoice: Option<&Invoice>,
        now: DateTime<Utc>,
    ) -> StatusDecision {
        let (Some(check_in), Some(check_out)) = (booking.check_in(), booking.check_out()) else {
            return StatusDecision::invalid_dates(booking.status.clone());
        };

        let today = now.date_naive();
        let timeline = Timeline::new(check_in, check_out, today);
        let payment = PaymentState::from_invoice(invoice, today);

        match &booking.status {
            BookingStatus::Pending | BookingStatus::Approved => {
                self.evaluate_before_stay(&booking.status, timeline, payment)
            }
            BookingStatus::Active => self.evaluate_active(timeline),
            BookingStatus::Overdue | BookingStatus::CheckoutPending => {
                self.evaluate_after_checkout(&booking.status, timeline)
            }
            status if status.is_terminal() => {
                StatusDecision::new(status.clone(), "Booking is closed", Priority::Low)
            }
            status => StatusDecision::new(
                status.clone(),
                format!("No lifecycle rules for status '{status}'"),
                Priority::Low,
            ),
        }
    }

    /// Evaluate each record independently, preserving input order
    pub fn evaluate_many(&self, records: &[BookingRecord], now: DateTime<Utc>) -> Vec<StatusDecision> {
        records
            .iter()
            .map(|record| self.evaluate(&record.booking, record.invoice.as_ref(), now))
            .collect()
    }

    /// Records whose decision is high priority or carries actions, most urgent
    /// first. Records of equal priority keep their input order.
    pub fn needing_attention<'a>(
        &self,
        records: &'a [BookingRecord],
        now: DateTime<Utc>,
    ) -> Vec<AttentionItem<'a>> {
        let mut items: Vec<AttentionItem<'a>> = records
            .iter()
            .filter_map(|record| {
                let decision = self.evaluate(&record.booking, record.invoice.as_ref(), now);
                decision.needs_attention().then(|| AttentionItem {
                    booking: &record.booking,
                    invoice: record.invoice.as_ref(),
                    decision,
                })
            })
            .collect();

        // sort_by_key is stable
        items.sort_by_key(|item| Reverse(item.decision.priority.rank()));
        items
    }

    fn evaluate_before_stay(
        &self,
        current: &BookingStatus,
        timeline: Timeline,
        payment: PaymentState,
    ) -> StatusDecision {
        match (payment.paid, payment.overdue) {
            (false, true) => StatusDecision::new(
                BookingStatus::PaymentOverdue,
                "Invoice is past due and unpaid",
                Priority::High,
            )
            .with_actions(&[
                RecommendedAction::SendPaymentReminder,
                RecommendedAction::ConsiderCancellation,
            ]),
            (false, false) => StatusDecision::new(
                current.clone(),
                "Awaiting payment",
                Priority::Normal,
            )
            .with_actions(&[RecommendedAction::MonitorPayment]),
            (true, _) if timeline.days_until_checkin <= 0 => StatusDecision::new(
                BookingStatus::Active,
                "Payment received and check-in date reached",
                Priority::Normal,
            )
            .with_actions(&[
                RecommendedAction::ActivateAccess,
                RecommendedAction::SendWelcomeMessage,
            ]),
            (true, _) => StatusDecision::new(
                BookingStatus::Approved,
                format!(
                    "Payment received, check-in in {} days",
                    timeline.days_until_checkin
                ),
                Priority::Low,
            )
            .with_actions(&[RecommendedAction::SendCheckinInstructions]),
        }
    }

    fn evaluate_active(&self, timeline: Timeline) -> StatusDecision {
        let days_until = timeline.days_until_checkout;
        let days_past = timeline.days_past_checkout;

        if days_until > 0 && days_until <= self.config.reminder_days {
            return StatusDecision::new(
                BookingStatus::Active,
                format!("Checkout in {days_until} days"),
                Priority::Normal,
            )
            .with_actions(&[RecommendedAction::SendCheckoutReminder])
            .with_metadata(DecisionMetadata {
                days_until_checkout: Some(days_until),
                days_past_checkout: None,
            });
        }

        if days_past <= 0 {
            return StatusDecision::new(BookingStatus::Active, "Stay in progress", Priority::Low);
        }

        let metadata = DecisionMetadata {
            days_until_checkout: None,
            days_past_checkout: Some(days_past),
        };

        if days_past <= self.config.grace_period_days {
            StatusDecision::new(
                BookingStatus::CheckoutPending,
                format!("Checkout passed {days_past} days ago, within grace period"),
                Priority::Medium,
            )
            .with_actions(&[
                RecommendedAction::SendOverdueNotice,
                RecommendedAction::AttemptContact,
            ])
            .with_metadata(metadata)
        } else if days_past <= self.config.auto_complete_after_days {
            StatusDecision::new(
                BookingStatus::Overdue,
                format!("Checkout passed {days_past} days ago, grace period exceeded"),
                Priority::High,
            )
            .with_actions(&[
                RecommendedAction::AdminInterventionRequired,
                RecommendedAction::ConsiderPenalties,
            ])
            .with_metadata(metadata)
        } else {
            self.auto_complete(days_past).with_metadata(metadata)
        }
    }

    fn evaluate_after_checkout(&self, current: &BookingStatus, timeline: Timeline) -> StatusDecision {
        let days_past = timeline.days_past_checkout;
        let metadata = DecisionMetadata {
            days_until_checkout: None,
            days_past_checkout: Some(days_past),
        };

        if days_past > self.config.auto_complete_after_days {
            return self.auto_complete(days_past).with_metadata(metadata);
        }

        StatusDecision::new(
            current.clone(),
            format!("Checkout passed {days_past} days ago, awaiting admin review"),
            Priority::High,
        )
        .with_actions(&[RecommendedAction::AdminReviewNeeded])
        .with_metadata(metadata)
    }

    fn auto_complete(&self, days_past: i64) -> StatusDecision {
        StatusDecision::new(
            BookingStatus::AutoCompleted,
            format!(
                "Checkout passed {days_past} days ago, beyond the {}-day auto-complete threshold",
                self.config.auto_complete_after_days
            ),
            Priority::High,
        )
        .with_actions(CHECKOUT_RESOLUTION_ACTIONS)
    }
}
