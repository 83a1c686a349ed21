//! Record fixtures and in-memory collaborators shared by the integration tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use dormhub_core::cache::{ApiRequest, CacheError, CacheResult, RequestFetcher};
use dormhub_core::models::{Booking, BookingRecord, Invoice, InvoiceStatus};
use dormhub_core::orchestration::{BookingSource, StatusTransition, TransitionSink};
use dormhub_core::status::BookingStatus;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mid-morning on a fixed day, away from any midnight boundary
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()
}

/// `reference_now()`'s calendar date shifted by `offset` days, as an API date string
pub fn day(offset: i64) -> String {
    let date: NaiveDate = (reference_now() + Duration::days(offset)).date_naive();
    date.format("%Y-%m-%d").to_string()
}

pub fn booking(id: &str, status: BookingStatus, check_in: i64, check_out: i64) -> Booking {
    Booking::new(id, status, day(check_in), day(check_out))
}

pub fn invoice(status: InvoiceStatus, due_offset: Option<i64>) -> Invoice {
    Invoice::new("inv", status, due_offset.map(day))
}

pub fn record(booking: Booking, invoice: Option<Invoice>) -> BookingRecord {
    BookingRecord::new(booking, invoice)
}

/// Collects applied transitions and rejects the configured booking ids
#[derive(Default)]
pub struct RecordingSink {
    pub applied: Mutex<Vec<StatusTransition>>,
    pub rejected_ids: HashSet<String>,
}

impl RecordingSink {
    pub fn rejecting(ids: &[&str]) -> Self {
        Self {
            rejected_ids: ids.iter().map(|id| (*id).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn applied_ids(&self) -> Vec<String> {
        self.applied
            .lock()
            .iter()
            .map(|t| t.booking_id.to_string())
            .collect()
    }
}

#[async_trait]
impl TransitionSink for RecordingSink {
    async fn apply(&self, transition: &StatusTransition) -> anyhow::Result<()> {
        // let the batch interleave
        tokio::task::yield_now().await;
        if self.rejected_ids.contains(transition.booking_id.as_str()) {
            anyhow::bail!("update rejected for booking {}", transition.booking_id);
        }
        self.applied.lock().push(transition.clone());
        Ok(())
    }
}

pub struct StaticSource {
    pub records: Vec<BookingRecord>,
}

#[async_trait]
impl BookingSource for StaticSource {
    async fn fetch_bookings(&self) -> anyhow::Result<Vec<BookingRecord>> {
        Ok(self.records.clone())
    }
}

/// A fetcher that answers every request with `response` after `delay`
pub struct SlowFetcher {
    pub response: CacheResult<Value>,
    pub delay: std::time::Duration,
    pub calls: AtomicUsize,
}

impl SlowFetcher {
    pub fn ok(response: Value, delay_ms: u64) -> Self {
        Self {
            response: Ok(response),
            delay: std::time::Duration::from_millis(delay_ms),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str, delay_ms: u64) -> Self {
        Self {
            response: Err(CacheError::Fetch(message.to_string())),
            delay: std::time::Duration::from_millis(delay_ms),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestFetcher for SlowFetcher {
    async fn fetch(&self, _request: &ApiRequest) -> CacheResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.response.clone()
    }
}
