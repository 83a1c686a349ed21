#![allow(clippy::doc_markdown)] // Allow technical terms in docs without backticks
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # DormHub Core
//!
//! Booking lifecycle status evaluation and request caching for the DormHub
//! dormitory rental platform.
//!
//! ## Overview
//!
//! A booking moves through its lifecycle as calendar dates pass and its
//! invoice is paid (or is not). This crate decides, for any booking at any
//! instant, which status it should be in and what follow-up is recommended.
//! The decision is a pure function; applying it is left to injected
//! collaborators.
//!
//! ## Module Organization
//!
//! - [`status`] - The status engine, decisions and status vocabulary
//! - [`models`] - Booking and invoice records as received from the API
//! - [`orchestration`] - Batch processing, transition sinks and the periodic monitor
//! - [`cache`] - TTL caches, single-flight de-duplication and the cached client
//! - [`config`] - Layered configuration loading
//! - [`logging`] - Console tracing setup
//! - [`error`] - Crate-level errors
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use dormhub_core::models::{Booking, Invoice, InvoiceStatus};
//! use dormhub_core::status::{BookingStatus, StatusEngine};
//!
//! let engine = StatusEngine::default();
//! let booking = Booking::new("b-17", BookingStatus::Pending, "2030-09-01", "2031-06-30");
//! let invoice = Invoice::new("inv-9", InvoiceStatus::Pending, Some("2030-08-15".into()));
//!
//! let decision = engine.evaluate(&booking, Some(&invoice), Utc::now());
//! println!("{} -> {} ({})", booking.status, decision.status, decision.priority);
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit, integration and property tests
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod periodic;
pub mod status;

pub use cache::{CacheError, CacheKey, CacheRegistry, CachedClient, RequestDeduplicator, TtlCache};
pub use config::{AppConfig, CacheConfig, ConfigManager, EngineConfig, MonitorConfig};
pub use error::{DormError, Result};
pub use models::{Booking, BookingRecord, Invoice, InvoiceStatus, RecordId};
pub use orchestration::{
    BookingSource, BookingStatusMonitor, StatusProcessor, StatusTransition, TransitionOutcome,
    TransitionSink,
};
pub use periodic::PeriodicTask;
pub use status::{BookingStatus, Priority, RecommendedAction, StatusDecision, StatusEngine};
