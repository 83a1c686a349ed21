//! Booking lifecycle status evaluation.
//!
//! [`StatusEngine`] is the pure decision function; [`StatusDecision`] is its
//! output. Applying decisions to storage is handled by
//! [`crate::orchestration`].

pub mod decision;
pub mod engine;
pub mod states;

pub use decision::{DecisionMetadata, StatusDecision};
pub use engine::{AttentionItem, StatusEngine};
pub use states::{BookingStatus, Priority, RecommendedAction};
