//! Periodic full notification sweep.

use std::sync::Arc;
use std::time::Duration;

use super::scheduler::{Job, JobFrequency};
use crate::services::{NotificationEngine, SweepScope};

/// Runs cleanup plus every evaluator on a fixed interval.
pub struct NotificationSweepJob {
    engine: Arc<NotificationEngine>,
    interval_minutes: u64,
    initial_delay: Duration,
}

impl NotificationSweepJob {
    pub fn new(
        engine: Arc<NotificationEngine>,
        interval_minutes: u64,
        initial_delay: Duration,
    ) -> Self {
        Self {
            engine,
            interval_minutes,
            initial_delay,
        }
    }
}

#[async_trait::async_trait]
impl Job for NotificationSweepJob {
    fn name(&self) -> &'static str {
        "notification_sweep"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    fn initial_delay(&self) -> Option<Duration> {
        Some(self.initial_delay)
    }

    async fn execute(&self) -> Result<(), String> {
        let report = self.engine.run(SweepScope::Full).await;
        if report.errors > 0 {
            return Err(format!("{} steps failed", report.errors));
        }
        Ok(())
    }
}
