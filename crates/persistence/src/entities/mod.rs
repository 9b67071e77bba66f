//! Database entity definitions.

pub mod hedgehog;
pub mod notification;
pub mod notification_settings;
pub mod room;
pub mod therapy;
pub mod weight_record;

pub use hedgehog::HedgehogEntity;
pub use notification::{
    DailyCountEntity, KeyCountEntity, NotificationCountsEntity, NotificationEntity,
};
pub use notification_settings::NotificationSettingsEntity;
pub use room::{AreaEntity, RoomEntity};
pub use therapy::{TherapyEntity, TherapyWithHedgehogEntity};
pub use weight_record::WeightRecordEntity;
