use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;

/// Booking lifecycle states as stored by the platform.
///
/// Values the engine does not know are preserved in [`BookingStatus::Other`] so
/// legacy rows round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum BookingStatus {
    /// Created, awaiting approval or payment
    #[default]
    Pending,
    /// Approved, waiting for check-in
    Approved,
    /// Tenant is in residence
    Active,
    /// Past checkout, inside the grace period
    CheckoutPending,
    /// Past checkout beyond the grace period
    Overdue,
    /// Force-closed after the auto-complete threshold
    AutoCompleted,
    /// Closed normally
    Completed,
    /// Cancelled before or during the stay
    Cancelled,
    /// Invoice past due before check-in
    PaymentOverdue,
    /// Any status this engine does not recognize
    Other(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Active => "active",
            Self::CheckoutPending => "checkout_pending",
            Self::Overdue => "overdue",
            Self::AutoCompleted => "auto_completed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::PaymentOverdue => "payment_overdue",
            Self::Other(raw) => raw,
        }
    }

    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::AutoCompleted
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for BookingStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "active" => Self::Active,
            "checkout_pending" => Self::CheckoutPending,
            "overdue" => Self::Overdue,
            "auto_completed" => Self::AutoCompleted,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            "payment_overdue" => Self::PaymentOverdue,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl Serialize for BookingStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BookingStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// Urgency of a status decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    Medium,
    High,
}

impl Priority {
    /// Sort rank used by the attention list (high=3 .. low=0)
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Normal => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Follow-up actions recommended alongside a status decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    FixDates,
    SendPaymentReminder,
    ConsiderCancellation,
    MonitorPayment,
    ActivateAccess,
    SendWelcomeMessage,
    SendCheckinInstructions,
    SendCheckoutReminder,
    SendOverdueNotice,
    AttemptContact,
    AdminInterventionRequired,
    ConsiderPenalties,
    FinalizeBilling,
    ReleaseRoom,
    ArchiveBooking,
    AdminReviewNeeded,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixDates => "fix_dates",
            Self::SendPaymentReminder => "send_payment_reminder",
            Self::ConsiderCancellation => "consider_cancellation",
            Self::MonitorPayment => "monitor_payment",
            Self::ActivateAccess => "activate_access",
            Self::SendWelcomeMessage => "send_welcome_message",
            Self::SendCheckinInstructions => "send_checkin_instructions",
            Self::SendCheckoutReminder => "send_checkout_reminder",
            Self::SendOverdueNotice => "send_overdue_notice",
            Self::AttemptContact => "attempt_contact",
            Self::AdminInterventionRequired => "admin_intervention_required",
            Self::ConsiderPenalties => "consider_penalties",
            Self::FinalizeBilling => "finalize_billing",
            Self::ReleaseRoom => "release_room",
            Self::ArchiveBooking => "archive_booking",
            Self::AdminReviewNeeded => "admin_review_needed",
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
