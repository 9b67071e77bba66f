//! Repository implementations for database operations.

pub mod care_records;
pub mod hedgehog;
pub mod notification;
pub mod notification_settings;
pub mod room;
pub mod therapy;
pub mod weight_record;

pub use care_records::PgCareRecords;
pub use hedgehog::{HedgehogChanges, HedgehogRepository, NewHedgehog};
pub use notification::NotificationRepository;
pub use notification_settings::NotificationSettingsRepository;
pub use room::{AreaChanges, NewArea, RoomChanges, RoomRepository};
pub use therapy::{NewTherapy, TherapyChanges, TherapyRepository};
pub use weight_record::{WeightRecordChanges, WeightRecordRepository};
