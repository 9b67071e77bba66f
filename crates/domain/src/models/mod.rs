//! Domain models.

pub mod analysis;
pub mod hedgehog;
pub mod notification;
pub mod notification_settings;
pub mod room;
pub mod therapy;
pub mod weight_record;

pub use analysis::{TherapyAnalysis, WeightAlertKind, WeightAnalysis, WeightTrend};
pub use hedgehog::{
    CreateHedgehogRequest, Hedgehog, HedgehogStatus, ListHedgehogsQuery, UpdateHedgehogRequest,
};
pub use notification::{
    DailyCount, NewNotification, Notification, NotificationAnalytics, NotificationPriority,
    NotificationQuery, NotificationStats, NotificationType,
};
pub use notification_settings::{NotificationSettings, UpdateNotificationSettingsRequest};
pub use room::{
    Area, CreateAreaRequest, CreateRoomRequest, ListAreasQuery, Room, RoomWithAreas,
    UpdateAreaRequest, UpdateRoomRequest,
};
pub use therapy::{
    CreateTherapyRequest, ListTherapiesQuery, Therapy, TherapyStatus, TherapyWithHedgehog,
    UpdateTherapyRequest,
};
pub use weight_record::{
    CreateWeightRecordRequest, ListWeightRecordsQuery, UpdateWeightRecordRequest, WeightRecord,
};
