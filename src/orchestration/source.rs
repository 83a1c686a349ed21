//! Where booking records come from.

use crate::cache::{ApiRequest, CacheError, CachedClient, RequestFetcher};
use crate::error::Result;
use crate::models::{Booking, BookingRecord, Invoice};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Supplies the booking and invoice records for a processing pass
#[async_trait]
pub trait BookingSource: Send + Sync {
    async fn fetch_bookings(&self) -> anyhow::Result<Vec<BookingRecord>>;
}

/// Reads bookings from the platform API through a [`CachedClient`].
///
/// Accepts a bare JSON array or an object wrapping the array in `data`. Each
/// element is either `{"booking": {..}, "invoice": {..}}` or a booking object
/// with an optional embedded `invoice`. Elements are decoded one at a time; an
/// element that cannot be decoded is logged and skipped so the rest of the
/// list is still evaluated.
#[derive(Debug)]
pub struct ApiBookingSource<F: RequestFetcher> {
    client: Arc<CachedClient<F>>,
    resource: String,
}

/// A booking object carrying its invoice inline
#[derive(Deserialize)]
struct EmbeddedRecord {
    #[serde(flatten)]
    booking: Booking,
    #[serde(default)]
    invoice: Option<Invoice>,
}

impl<F: RequestFetcher> ApiBookingSource<F> {
    pub const DEFAULT_RESOURCE: &'static str = "/bookings";

    pub fn new(client: Arc<CachedClient<F>>) -> Self {
        Self {
            client,
            resource: Self::DEFAULT_RESOURCE.to_string(),
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    /// Fetch and decode the booking list
    pub async fn records(&self) -> Result<Vec<BookingRecord>> {
        let payload = self.client.request(&ApiRequest::get(&self.resource)).await?;
        let records = decode_records(payload)?;
        debug!(resource = %self.resource, count = records.len(), "Fetched booking records");
        Ok(records)
    }
}

#[async_trait]
impl<F: RequestFetcher> BookingSource for ApiBookingSource<F> {
    async fn fetch_bookings(&self) -> anyhow::Result<Vec<BookingRecord>> {
        Ok(self.records().await?)
    }
}

fn decode_records(payload: Value) -> Result<Vec<BookingRecord>> {
    let list = match payload {
        Value::Object(mut envelope) => envelope.remove("data"),
        other => Some(other),
    };
    let Some(Value::Array(items)) = list else {
        return Err(
            CacheError::Decode("expected an array or an object with a `data` array".to_string()).into(),
        );
    };

    let total = items.len();
    let records: Vec<BookingRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match decode_record(item) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(index, error = %error, "Skipping undecodable booking record");
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(
            decoded = records.len(),
            skipped = total - records.len(),
            "Booking list decoded with skipped records"
        );
    }
    Ok(records)
}

fn decode_record(item: Value) -> serde_json::Result<BookingRecord> {
    if item.get("booking").is_some() {
        return serde_json::from_value(item);
    }
    let EmbeddedRecord { booking, invoice } = serde_json::from_value(item)?;
    Ok(BookingRecord::new(booking, invoice))
}
