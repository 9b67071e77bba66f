//! Domain services for the rescue center.
//!
//! Services contain business logic that operates on domain models.

#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod rules;
pub mod store;

#[cfg(any(test, feature = "test-util"))]
pub use memory::InMemoryStore;
pub use rules::{
    analyze_therapy, analyze_weight, classify_trend, evaluate_missing_weighing,
    evaluate_therapies, evaluate_therapy_expiry, sort_therapy_analyses, sort_weight_analyses,
    weight_alert, AlertCandidate, WEIGHT_HISTORY_LIMIT,
};
pub use store::{CareRecords, NotificationStore, SettingsStore, StoreError};
