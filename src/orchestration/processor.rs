//! Batch status processing.

use super::transition::{StatusTransition, TransitionOutcome, TransitionSink};
use crate::log_transition;
use crate::models::BookingRecord;
use crate::status::{StatusDecision, StatusEngine};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, warn};

/// Evaluates bookings and hands every status change to a [`TransitionSink`]
pub struct StatusProcessor {
    engine: StatusEngine,
    sink: Arc<dyn TransitionSink>,
}

impl StatusProcessor {
    pub fn new(engine: StatusEngine, sink: Arc<dyn TransitionSink>) -> Self {
        Self { engine, sink }
    }

    pub fn engine(&self) -> &StatusEngine {
        &self.engine
    }

    /// Evaluate every record at `now` and apply the ones whose status changes.
    ///
    /// Each sink call runs on its own spawned task, so the batch's calls run
    /// concurrently. Outcomes come back in input order, one per record. A sink
    /// error or panic is recorded on that record's outcome only.
    pub async fn process_batch(
        &self,
        records: &[BookingRecord],
        now: DateTime<Utc>,
    ) -> Vec<TransitionOutcome> {
        let pending = records.iter().map(|record| {
            let decision = self
                .engine
                .evaluate(&record.booking, record.invoice.as_ref(), now);
            self.apply_decision(record, decision, now)
        });

        let outcomes = join_all(pending).await;

        debug!(
            evaluated = outcomes.len(),
            changed = outcomes.iter().filter(|o| o.changed).count(),
            failed = outcomes.iter().filter(|o| o.is_failure()).count(),
            "Processed booking batch"
        );
        outcomes
    }

    async fn apply_decision(
        &self,
        record: &BookingRecord,
        decision: StatusDecision,
        now: DateTime<Utc>,
    ) -> TransitionOutcome {
        let booking = &record.booking;
        if !decision.is_transition_from(&booking.status) {
            return TransitionOutcome::unchanged(booking, decision);
        }

        let transition = StatusTransition::from_decision(booking, &decision, now);
        let sink = Arc::clone(&self.sink);
        let handle = tokio::spawn(async move {
            let result = sink.apply(&transition).await;
            (transition, result)
        });

        let error = match handle.await {
            Ok((transition, Ok(()))) => {
                log_transition!(info, "Booking status transition applied",
                    booking_id: transition.booking_id,
                    from: transition.previous_status,
                    to: transition.new_status,
                    reason: transition.reason
                );
                return TransitionOutcome::applied(booking, decision);
            }
            Ok((_, Err(error))) => format!("{error:#}"),
            Err(join_error) => describe_join_failure(join_error),
        };

        warn!(
            booking_id = %booking.id,
            from = %booking.status,
            to = %decision.status,
            error = %error,
            "Failed to apply booking status transition"
        );
        TransitionOutcome::failed(booking, decision, error)
    }
}

fn describe_join_failure(error: JoinError) -> String {
    if !error.is_panic() {
        return "transition sink task was cancelled".to_string();
    }
    let panic = error.into_panic();
    let message = panic
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    format!("transition sink panicked: {message}")
}

impl fmt::Debug for StatusProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusProcessor")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
