use super::states::{BookingStatus, Priority, RecommendedAction};
use serde::{Deserialize, Serialize};

/// Day counts that informed a decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_checkout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_past_checkout: Option<i64>,
}

/// Outcome of evaluating a single booking.
///
/// Produced fresh on every evaluation and never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDecision {
    pub status: BookingStatus,
    pub reason: String,
    pub actions: Vec<RecommendedAction>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DecisionMetadata>,
    /// Set when the booking could not be evaluated because of bad input
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl StatusDecision {
    pub fn new(status: BookingStatus, reason: impl Into<String>, priority: Priority) -> Self {
        Self {
            status,
            reason: reason.into(),
            actions: Vec::new(),
            priority,
            metadata: None,
            error: false,
        }
    }

    pub fn with_actions(mut self, actions: &[RecommendedAction]) -> Self {
        self.actions = actions.to_vec();
        self
    }

    pub fn with_metadata(mut self, metadata: DecisionMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Decision for a booking whose dates cannot be parsed
    pub fn invalid_dates(status: BookingStatus) -> Self {
        Self {
            status,
            reason: "Invalid dates".to_string(),
            actions: vec![RecommendedAction::FixDates],
            priority: Priority::High,
            metadata: None,
            error: true,
        }
    }

    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    /// High priority or any recommended follow-up
    pub fn needs_attention(&self) -> bool {
        self.priority == Priority::High || self.has_actions()
    }

    /// Whether applying this decision would change the stored status
    pub fn is_transition_from(&self, current: &BookingStatus) -> bool {
        &self.status != current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_dates_decision_shape() {
        let decision = StatusDecision::invalid_dates(BookingStatus::Active);
        assert!(decision.error);
        assert_eq!(decision.status, BookingStatus::Active);
        assert_eq!(decision.actions, vec![RecommendedAction::FixDates]);
        assert!(!decision.is_transition_from(&BookingStatus::Active));
    }

    #[test]
    fn test_decision_serialization_omits_empty_fields() {
        let decision = StatusDecision::new(BookingStatus::Active, "Booking is active", Priority::Low);
        let value = serde_json::to_value(&decision).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "active",
                "reason": "Booking is active",
                "actions": [],
                "priority": "low"
            })
        );
    }

    #[test]
    fn test_needs_attention() {
        let quiet = StatusDecision::new(BookingStatus::Active, "", Priority::Low);
        let noisy = quiet
            .clone()
            .with_actions(&[RecommendedAction::SendCheckoutReminder]);
        let urgent = StatusDecision::new(BookingStatus::Overdue, "", Priority::High);

        assert!(!quiet.needs_attention());
        assert!(noisy.needs_attention());
        assert!(urgent.needs_attention());
    }
}
