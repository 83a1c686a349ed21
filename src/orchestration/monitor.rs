//! # Booking Status Monitor
//!
//! One pass fetches every booking from the [`BookingSource`], evaluates it and
//! applies the resulting transitions. [`BookingStatusMonitor::run_once`] is the
//! whole unit of work; [`BookingStatusMonitor::start`] only repeats it on the
//! configured interval.

use super::processor::StatusProcessor;
use super::source::BookingSource;
use super::transition::TransitionOutcome;
use crate::cache::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::error::{DormError, Result};
use crate::periodic::PeriodicTask;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Summary of one monitor pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorReport {
    pub evaluated_at: DateTime<Utc>,
    pub evaluated: usize,
    pub transitioned: usize,
    pub failed: usize,
    /// Bookings whose decision is high priority or carries actions
    pub attention: usize,
    /// Bookings that could not be evaluated because of bad dates
    pub invalid: usize,
    pub outcomes: Vec<TransitionOutcome>,
}

impl MonitorReport {
    fn from_outcomes(evaluated_at: DateTime<Utc>, outcomes: Vec<TransitionOutcome>) -> Self {
        Self {
            evaluated_at,
            evaluated: outcomes.len(),
            transitioned: outcomes.iter().filter(|o| o.changed && o.success).count(),
            failed: outcomes.iter().filter(|o| o.is_failure()).count(),
            attention: outcomes
                .iter()
                .filter(|o| o.decision.needs_attention())
                .count(),
            invalid: outcomes.iter().filter(|o| o.decision.error).count(),
            outcomes,
        }
    }
}

pub struct BookingStatusMonitor {
    source: Arc<dyn BookingSource>,
    processor: StatusProcessor,
    config: MonitorConfig,
    clock: Arc<dyn Clock>,
}

impl BookingStatusMonitor {
    pub fn new(
        source: Arc<dyn BookingSource>,
        processor: StatusProcessor,
        config: MonitorConfig,
    ) -> Self {
        Self::with_clock(source, processor, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn BookingSource>,
        processor: StatusProcessor,
        config: MonitorConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            processor,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run a single fetch-evaluate-apply pass.
    ///
    /// `now_override` pins the evaluation time; otherwise the monitor's clock
    /// is read once and used for every booking in the pass. Only a failure to
    /// fetch records is an error; per-booking sink failures are in the report.
    pub async fn run_once(&self, now_override: Option<DateTime<Utc>>) -> Result<MonitorReport> {
        let now = now_override.unwrap_or_else(|| self.clock.now());
        let records = self
            .source
            .fetch_bookings()
            .await
            .map_err(|e| DormError::source_error(format_args!("{e:#}")))?;

        let outcomes = self.processor.process_batch(&records, now).await;
        let report = MonitorReport::from_outcomes(now, outcomes);

        info!(
            evaluated = report.evaluated,
            transitioned = report.transitioned,
            failed = report.failed,
            attention = report.attention,
            invalid = report.invalid,
            "Booking status check complete"
        );
        if report.failed > 0 {
            warn!(failed = report.failed, "Some booking transitions were not applied");
        }
        Ok(report)
    }

    /// Repeat [`Self::run_once`] every `interval_seconds`.
    ///
    /// Returns `None` when the monitor is disabled in configuration. The loop
    /// stops when the handle is stopped or dropped.
    pub fn start(self: &Arc<Self>) -> Option<MonitorHandle> {
        if !self.config.enabled {
            info!("Booking status monitor disabled by configuration");
            return None;
        }

        let monitor = Arc::clone(self);
        let task = PeriodicTask::spawn("booking_status_monitor", self.config.interval(), move || {
            let monitor = Arc::clone(&monitor);
            async move {
                if let Err(e) = monitor.run_once(None).await {
                    error!(error = %e, "Booking status check failed");
                }
            }
        });
        Some(MonitorHandle { task })
    }
}

impl fmt::Debug for BookingStatusMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingStatusMonitor")
            .field("processor", &self.processor)
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Owns the monitor's interval loop
#[derive(Debug)]
pub struct MonitorHandle {
    task: PeriodicTask,
}

impl MonitorHandle {
    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }

    /// Stop the loop, letting an in-progress pass finish
    pub async fn stop(self) {
        self.task.stop().await;
    }
}
