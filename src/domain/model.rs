// ドメインモデル（エンティティと値オブジェクト）

mod value_objects;
mod booking;
mod inventory;

pub use value_objects::{
    BookingId, UserId, RoomTypeId,
    RoomNumber,
    Money,
    StayRange,
    BookingStatus,
};

pub use booking::Booking;
pub use inventory::InventoryRecord;
