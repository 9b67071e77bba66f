//! HTTP route handlers.

pub mod analysis;
pub mod health;
pub mod hedgehogs;
pub mod notification_settings;
pub mod notifications;
pub mod rooms;
pub mod therapies;
pub mod weight_records;

use serde::Serialize;

/// Plain acknowledgement body for endpoints that only start work.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
