use crate::domain::port::{EventPublisher, PublishError};
use async_trait::async_trait;

/// コンソールイベント発行者
/// シリアライズ済みのイベントペイロードをコンソールに出力する
/// メッセージブローカーへの接続を持たない環境向けの実装
pub struct ConsoleEventPublisher;

impl ConsoleEventPublisher {
    /// 新しいコンソールイベント発行者を作成
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for ConsoleEventPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        println!("📣 [イベント発行] topic={}", topic);
        println!("  {}", payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{BookingCancelled, BookingEvent};
    use crate::domain::model::{BookingId, RoomTypeId, StayRange, UserId};
    use crate::domain::serialization::EventSerializer;
    use chrono::{NaiveDate, Utc};

    #[tokio::test]
    async fn test_publish_serialized_event() {
        let publisher = ConsoleEventPublisher::new();
        let serializer = EventSerializer::new();

        let stay = StayRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        )
        .unwrap();
        let event = BookingEvent::BookingCancelled(BookingCancelled::new(
            BookingId::new(),
            UserId::new(),
            RoomTypeId::new(),
            stay,
            Utc::now(),
        ));

        let payload = serializer.serialize_event(&event).unwrap();
        let result = publisher.publish(event.topic(), &payload).await;
        assert!(result.is_ok());
    }
}
