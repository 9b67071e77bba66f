//! Common validation utilities.

use validator::{ValidateEmail, ValidationError};

/// Smallest plausible hedgehog weight in grams.
const MIN_WEIGHT_GRAMS: f64 = 1.0;

/// Upper bound for a single hedgehog weighing in grams.
const MAX_WEIGHT_GRAMS: f64 = 5_000.0;

/// Validates that a weight in grams is within a plausible range.
pub fn validate_weight_grams(weight: f64) -> Result<(), ValidationError> {
    if weight.is_finite() && (MIN_WEIGHT_GRAMS..=MAX_WEIGHT_GRAMS).contains(&weight) {
        Ok(())
    } else {
        let mut err = ValidationError::new("weight_range");
        err.message = Some("Weight must be between 1 and 5000 grams".into());
        Err(err)
    }
}

/// Validates that a dimension (room or area size, in cm) is at least 1.
pub fn validate_dimension(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 1.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("dimension_range");
        err.message = Some("Dimensions must be at least 1 cm".into());
        Err(err)
    }
}

/// Validates that a coordinate inside a room is non-negative.
pub fn validate_coordinate(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("coordinate_range");
        err.message = Some("Coordinates must be non-negative".into());
        Err(err)
    }
}

/// Validates an optional delivery address: empty disables the sink,
/// otherwise it must be a valid email.
pub fn validate_optional_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_format");
        err.message = Some("Email address is not valid".into());
        Err(err)
    }
}

/// Validates an optional webhook URL: empty disables the sink,
/// otherwise it must be an http(s) URL.
pub fn validate_optional_webhook_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        let mut err = ValidationError::new("url_scheme");
        err.message = Some("Webhook URL must use http or https".into());
        Err(err)
    }
}
