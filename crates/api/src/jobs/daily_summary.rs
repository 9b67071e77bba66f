//! Daily summary email job.

use super::scheduler::{Job, JobFrequency};
use crate::services::DailySummary;

pub struct DailySummaryJob {
    summary: DailySummary,
    hour: u32,
}

impl DailySummaryJob {
    /// Sends the summary every day at `hour` UTC.
    pub fn new(summary: DailySummary, hour: u32) -> Self {
        Self { summary, hour }
    }
}

#[async_trait::async_trait]
impl Job for DailySummaryJob {
    fn name(&self) -> &'static str {
        "daily_summary"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::DailyAt { hour: self.hour }
    }

    async fn execute(&self) -> Result<(), String> {
        self.summary
            .send()
            .await
            .map(|outcome| tracing::debug!(?outcome, "Daily summary run"))
            .map_err(|e| e.to_string())
    }
}
