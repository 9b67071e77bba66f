//! Application services: the notification engine and its delivery sinks.

pub mod dispatcher;
pub mod email;
pub mod notification_engine;
pub mod recheck_queue;
pub mod summary;
pub mod webhook;

pub use dispatcher::Dispatcher;
pub use email::{EmailError, EmailService};
pub use notification_engine::{NotificationEngine, SweepReport, SweepScope};
pub use recheck_queue::{spawn_recheck_worker, RecheckQueue};
pub use summary::{DailySummary, SummaryError, SummaryOutcome};
pub use webhook::{WebhookError, WebhookSender};
