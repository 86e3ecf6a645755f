use crate::domain::event::BookingEvent;
use thiserror::Error;

/// シリアライゼーションエラー
#[derive(Debug, Error, Clone)]
pub enum SerializationError {
    #[error("JSON serialization failed: {message}. Event type: {event_type}")]
    JsonSerializationFailed { message: String, event_type: String },

    #[error("JSON deserialization failed: {message}. Input: {input_preview}")]
    JsonDeserializationFailed {
        message: String,
        input_preview: String,
    },
}

impl SerializationError {
    /// 入力データのプレビューを生成（デバッグ用、最大100バイト）
    /// マルチバイト文字の途中で切らないよう文字境界まで戻る
    fn create_input_preview(input: &str) -> String {
        if input.len() <= 100 {
            input.to_string()
        } else {
            let mut end = 97;
            while !input.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &input[..end])
        }
    }
}

/// イベントシリアライザー
/// イベント発行者へ渡すJSONペイロードの生成・解析を提供する
pub struct EventSerializer;

impl EventSerializer {
    /// 新しいイベントシリアライザーを作成
    pub fn new() -> Self {
        Self
    }

    /// ドメインイベントをJSONにシリアライズ
    pub fn serialize_event(&self, event: &BookingEvent) -> Result<String, SerializationError> {
        serde_json::to_string(event).map_err(|e| SerializationError::JsonSerializationFailed {
            message: e.to_string(),
            event_type: event.event_type().to_string(),
        })
    }

    /// JSONからドメインイベントにデシリアライズ
    pub fn deserialize_event(&self, json: &str) -> Result<BookingEvent, SerializationError> {
        if json.trim().is_empty() {
            return Err(SerializationError::JsonDeserializationFailed {
                message: "Empty JSON input".to_string(),
                input_preview: "".to_string(),
            });
        }

        serde_json::from_str::<BookingEvent>(json).map_err(|e| {
            SerializationError::JsonDeserializationFailed {
                message: e.to_string(),
                input_preview: SerializationError::create_input_preview(json),
            }
        })
    }
}

impl Default for EventSerializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::BookingCreated;
    use crate::domain::model::{BookingId, Money, RoomTypeId, StayRange, UserId};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn sample_event() -> BookingEvent {
        let stay = StayRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        )
        .unwrap();
        BookingEvent::BookingCreated(BookingCreated::new(
            BookingId::new(),
            UserId::new(),
            RoomTypeId::new(),
            stay,
            2,
            Money::jpy(24000),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_serialize_and_deserialize_round_trip() {
        let serializer = EventSerializer::new();
        let event = sample_event();

        let json = serializer.serialize_event(&event).unwrap();
        let restored = serializer.deserialize_event(&json).unwrap();

        assert_eq!(event, restored);
    }

    #[test]
    fn test_deserialize_empty_input_fails() {
        let serializer = EventSerializer::new();
        assert!(serializer.deserialize_event("  ").is_err());
    }

    #[test]
    fn test_deserialize_invalid_json_fails() {
        let serializer = EventSerializer::new();
        assert!(serializer.deserialize_event("{not json").is_err());
    }

    #[test]
    fn test_deserialize_long_multibyte_input_fails_without_panic() {
        let serializer = EventSerializer::new();

        // 100バイト超のマルチバイト入力でもプレビュー生成が文字境界を壊さない
        let input = "あ".repeat(64);
        let result = serializer.deserialize_event(&input);

        match result {
            Err(SerializationError::JsonDeserializationFailed { input_preview, .. }) => {
                assert!(input_preview.ends_with("..."));
                assert!(input_preview.len() <= 100);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
