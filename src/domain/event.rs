use crate::domain::model::{BookingId, Money, RoomTypeId, StayRange, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ドメインイベント列挙型
/// 予約ライフサイクル上の重要な事実を表現する
/// 発行は最低1回（at-least-once）のベストエフォートであり、
/// 発行失敗が確定済みの予約をロールバックすることはない
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BookingEvent {
    /// 予約が作成された
    BookingCreated(BookingCreated),
    /// 予約がキャンセルされた
    BookingCancelled(BookingCancelled),
}

impl BookingEvent {
    /// イベント種別名を取得
    pub fn event_type(&self) -> &'static str {
        match self {
            BookingEvent::BookingCreated(_) => "BookingCreated",
            BookingEvent::BookingCancelled(_) => "BookingCancelled",
        }
    }

    /// 発行先トピック名を取得
    pub fn topic(&self) -> &'static str {
        match self {
            BookingEvent::BookingCreated(_) => "booking.created",
            BookingEvent::BookingCancelled(_) => "booking.cancelled",
        }
    }
}

/// 予約作成イベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingCreated {
    /// 予約ID
    pub booking_id: BookingId,
    /// 宿泊者ID
    pub user_id: UserId,
    /// 客室タイプID
    pub room_type_id: RoomTypeId,
    /// 宿泊期間
    pub stay: StayRange,
    /// 宿泊人数
    pub guests: u32,
    /// 合計金額
    pub total_price: Money,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl BookingCreated {
    /// 新しい予約作成イベントを作成
    pub fn new(
        booking_id: BookingId,
        user_id: UserId,
        room_type_id: RoomTypeId,
        stay: StayRange,
        guests: u32,
        total_price: Money,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            booking_id,
            user_id,
            room_type_id,
            stay,
            guests,
            total_price,
            occurred_at,
        }
    }
}

/// 予約キャンセルイベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingCancelled {
    /// 予約ID
    pub booking_id: BookingId,
    /// 宿泊者ID
    pub user_id: UserId,
    /// 客室タイプID
    pub room_type_id: RoomTypeId,
    /// 宿泊期間（在庫解放の対象範囲）
    pub stay: StayRange,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl BookingCancelled {
    /// 新しい予約キャンセルイベントを作成
    pub fn new(
        booking_id: BookingId,
        user_id: UserId,
        room_type_id: RoomTypeId,
        stay: StayRange,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            booking_id,
            user_id,
            room_type_id,
            stay,
            occurred_at,
        }
    }
}
