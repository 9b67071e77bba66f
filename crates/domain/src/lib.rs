//! Domain layer for the hedgehog rescue backend.
//!
//! This crate contains:
//! - Domain models (Hedgehog, Therapy, WeightRecord, Notification)
//! - Rule evaluators producing care alerts
//! - Storage traits and an in-memory implementation

pub mod models;
pub mod services;
