//! Database metrics.
//!
//! Query latency is recorded per named query; pool gauges are refreshed by the
//! `pool_metrics` background job.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Records how long a named query took.
pub fn record_query_duration(query: &'static str, duration_secs: f64) {
    histogram!("rescue_db_query_duration_seconds", "query" => query).record(duration_secs);
}

/// Records notifications removed by the cleanup sweep.
pub fn record_notifications_purged(reason: &'static str, count: u64) {
    counter!("rescue_notifications_purged_total", "reason" => reason).increment(count);
}

/// Publishes the current connection pool usage.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("rescue_db_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("rescue_db_connections_idle").set(idle as f64);
    gauge!("rescue_db_connections_total").set(size as f64);
    gauge!("rescue_db_connections_max").set(f64::from(pool.options().get_max_connections()));
}

/// Times a repository query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_hedgehog_by_id");
/// let result = sqlx::query_as::<_, HedgehogEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time and returns it in seconds.
    pub fn record(self) -> f64 {
        let elapsed = self.start.elapsed().as_secs_f64();
        record_query_duration(self.query, elapsed);
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("list_hedgehogs");
        assert_eq!(timer.query, "list_hedgehogs");
    }

    #[test]
    fn test_query_timer_record_is_non_negative() {
        let timer = QueryTimer::new("list_rooms");
        assert!(timer.record() >= 0.0);
    }
}
