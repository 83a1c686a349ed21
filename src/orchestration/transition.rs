//! Status transitions and the sink that persists them.

use crate::models::{Booking, RecordId};
use crate::status::{BookingStatus, RecommendedAction, StatusDecision};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A status change to persist for one booking.
///
/// Serialized in the platform API's camelCase shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTransition {
    pub booking_id: RecordId,
    pub new_status: BookingStatus,
    pub previous_status: BookingStatus,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    pub actions: Vec<RecommendedAction>,
}

impl StatusTransition {
    pub fn from_decision(booking: &Booking, decision: &StatusDecision, at: DateTime<Utc>) -> Self {
        Self {
            booking_id: booking.id.clone(),
            new_status: decision.status.clone(),
            previous_status: booking.status.clone(),
            reason: decision.reason.clone(),
            timestamp: at,
            actions: decision.actions.clone(),
        }
    }
}

/// Receives status transitions, typically writing them back to the API.
///
/// Implementations report failure through the returned error; the caller
/// records it against the booking and moves on. No retries are attempted.
#[async_trait]
pub trait TransitionSink: Send + Sync {
    async fn apply(&self, transition: &StatusTransition) -> anyhow::Result<()>;
}

/// What happened to one booking during a processing pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    pub booking_id: RecordId,
    pub previous_status: BookingStatus,
    pub decision: StatusDecision,
    /// The decision differed from the stored status
    pub changed: bool,
    /// False only when a change was offered and the sink rejected it or panicked
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransitionOutcome {
    pub fn unchanged(booking: &Booking, decision: StatusDecision) -> Self {
        Self {
            booking_id: booking.id.clone(),
            previous_status: booking.status.clone(),
            decision,
            changed: false,
            success: true,
            error: None,
        }
    }

    pub fn applied(booking: &Booking, decision: StatusDecision) -> Self {
        Self {
            changed: true,
            ..Self::unchanged(booking, decision)
        }
    }

    pub fn failed(booking: &Booking, decision: StatusDecision, error: impl Into<String>) -> Self {
        Self {
            changed: true,
            success: false,
            error: Some(error.into()),
            ..Self::unchanged(booking, decision)
        }
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }
}
