//! Room and area domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;


pub const DEFAULT_ROOM_DIMENSION_CM: f64 = 100.0;
pub const DEFAULT_AREA_CAPACITY: i32 = 1;

fn default_room_dimension() -> f64 {
    DEFAULT_ROOM_DIMENSION_CM
}

fn default_area_capacity() -> i32 {
    DEFAULT_AREA_CAPACITY
}

/// A room of the rescue center. Dimensions are in centimetres.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub width: f64,
    pub height: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A pen or enclosure inside a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Area {
    pub id: i64,
    pub name: String,
    pub room_id: i64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub max_capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Room together with the areas it owns.
#[derive(Debug, Clone, Serialize)]
pub struct RoomWithAreas {
    #[serde(flatten)]
    pub room: Room,
    pub areas: Vec<Area>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_room_dimension")]
    #[validate(custom(function = "shared::validation::validate_dimension"))]
    pub width: f64,

    #[serde(default = "default_room_dimension")]
    #[validate(custom(function = "shared::validation::validate_dimension"))]
    pub height: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRoomRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = "shared::validation::validate_dimension"))]
    pub width: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_dimension"))]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAreaRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    pub room_id: i64,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_coordinate"))]
    pub x: f64,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_coordinate"))]
    pub y: f64,

    #[serde(default = "default_room_dimension")]
    #[validate(custom(function = "shared::validation::validate_dimension"))]
    pub width: f64,

    #[serde(default = "default_room_dimension")]
    #[validate(custom(function = "shared::validation::validate_dimension"))]
    pub height: f64,

    #[serde(default = "default_area_capacity")]
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub max_capacity: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAreaRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub room_id: Option<i64>,

    #[validate(custom(function = "shared::validation::validate_coordinate"))]
    pub x: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_coordinate"))]
    pub y: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_dimension"))]
    pub width: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_dimension"))]
    pub height: Option<f64>,

    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub max_capacity: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAreasQuery {
    pub room_id: Option<i64>,
}
