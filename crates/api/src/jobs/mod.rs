//! Background job scheduler and job implementations.

mod daily_summary;
mod notification_sweep;
mod pool_metrics;
mod scheduler;

pub use daily_summary::DailySummaryJob;
pub use notification_sweep::NotificationSweepJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
