//! Shared utilities and common types for the hedgehog rescue backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Clock abstraction so time-dependent rules can be tested deterministically
//! - Whole-day arithmetic matching how the care rules count days
//! - Common validation logic

pub mod time;
pub mod validation;
