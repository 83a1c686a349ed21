//! Owned background loops.
//!
//! A [`PeriodicTask`] runs a job on a fixed interval until its handle is
//! stopped or dropped. Nothing here starts on its own; callers decide when a
//! loop exists and for how long.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Handle to a running periodic loop
#[derive(Debug)]
pub struct PeriodicTask {
    name: String,
    shutdown: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawn `job` every `interval`. The first run happens one interval after
    /// spawning. Must be called from within a tokio runtime.
    pub fn spawn<J, Fut>(name: impl Into<String>, interval: Duration, mut job: J) -> Self
    where
        J: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let shutdown = Arc::new(Notify::new());
        let loop_shutdown = Arc::clone(&shutdown);
        let loop_name = name.clone();

        let task = tokio::spawn(async move {
            info!(task = %loop_name, interval_ms = interval.as_millis() as u64, "Periodic task started");
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        debug!(task = %loop_name, "Periodic task tick");
                        job().await;
                    }
                    _ = loop_shutdown.notified() => {
                        info!(task = %loop_name, "Periodic task shutting down");
                        break;
                    }
                }
            }
        });

        Self {
            name,
            shutdown,
            task: Some(task),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signal the loop to stop and wait for it to exit. A tick already in
    /// progress finishes first.
    pub async fn stop(mut self) {
        self.shutdown.notify_one();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.shutdown.notify_one();
        }
    }
}
