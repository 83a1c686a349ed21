//! # Status Orchestration
//!
//! Applies [`crate::status::StatusEngine`] decisions to the outside world.
//!
//! ## Components
//!
//! - **BookingSource**: supplies booking and invoice records for a run
//! - **TransitionSink**: persists a status change; failures are reported per
//!   booking and never abort a batch
//! - **StatusProcessor**: evaluates a batch and offers every status change to
//!   the sink concurrently
//! - **BookingStatusMonitor**: one fetch-evaluate-apply pass per tick, with an
//!   owned interval loop
//!
//! Collaborators are injected explicitly; nothing here is a global.
//!
//! ## Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use chrono::{TimeZone, Utc};
//! use dormhub_core::models::{Booking, BookingRecord};
//! use dormhub_core::orchestration::{StatusProcessor, StatusTransition, TransitionSink};
//! use dormhub_core::status::{BookingStatus, StatusEngine};
//! use std::sync::Arc;
//!
//! struct LoggingSink;
//!
//! #[async_trait]
//! impl TransitionSink for LoggingSink {
//!     async fn apply(&self, transition: &StatusTransition) -> anyhow::Result<()> {
//!         println!("{} -> {}", transition.previous_status, transition.new_status);
//!         Ok(())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let processor = StatusProcessor::new(StatusEngine::default(), Arc::new(LoggingSink));
//! let records = vec![BookingRecord::new(
//!     Booking::new("b-1", BookingStatus::Active, "2024-05-01", "2024-05-31"),
//!     None,
//! )];
//! let now = Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();
//!
//! let outcomes = processor.process_batch(&records, now).await;
//! assert_eq!(outcomes[0].decision.status, BookingStatus::CheckoutPending);
//! # });
//! ```

pub mod monitor;
pub mod processor;
pub mod source;
pub mod transition;

pub use monitor::{BookingStatusMonitor, MonitorHandle, MonitorReport};
pub use processor::StatusProcessor;
pub use source::{ApiBookingSource, BookingSource};
pub use transition::{StatusTransition, TransitionOutcome, TransitionSink};
