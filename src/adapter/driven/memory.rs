// インメモリアダプター
// データベースやブローカーを用意せずにアプリケーションサービスを
// 動かすための実装（統合テストやローカル実行で使用する）

use crate::domain::model::{Booking, BookingId, InventoryRecord, RoomTypeId};
use crate::domain::port::{
    BookingRepository, EventPublisher, InventoryStore, PublishError, RepositoryError, StoreError,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// インメモリ在庫ストア
/// (客室タイプ, 日付) → 在庫レコードのマップを保持し、
/// MySQL実装と同じcompare-and-swapセマンティクスを提供する
pub struct InMemoryInventoryStore {
    records: Mutex<HashMap<(RoomTypeId, NaiveDate), InventoryRecord>>,
}

impl InMemoryInventoryStore {
    /// 新しいインメモリ在庫ストアを作成
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryInventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn get(
        &self,
        room_type_id: RoomTypeId,
        date: NaiveDate,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .await
            .get(&(room_type_id, date))
            .cloned())
    }

    async fn compare_and_swap(
        &self,
        room_type_id: RoomTypeId,
        date: NaiveDate,
        expected_version: u64,
        new_available_units: u32,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let record = records
            .get(&(room_type_id, date))
            .ok_or(StoreError::NotFound)?;

        if record.version() != expected_version {
            return Err(StoreError::VersionConflict);
        }

        let updated = InventoryRecord::reconstruct(
            room_type_id,
            date,
            new_available_units,
            expected_version + 1,
        );
        records.insert((room_type_id, date), updated);
        Ok(())
    }

    async fn initialize_range(
        &self,
        room_type_id: RoomTypeId,
        total_rooms: u32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let mut date = start_date;
        while date < end_date {
            // 既存レコードは上書きしない
            records
                .entry((room_type_id, date))
                .or_insert_with(|| InventoryRecord::new(room_type_id, date, total_rooms));

            date = date
                .succ_opt()
                .ok_or_else(|| StoreError::OperationFailed(format!("日付が範囲外です: {}", date)))?;
        }
        Ok(())
    }

    async fn delete_all(&self, room_type_id: RoomTypeId) -> Result<(), StoreError> {
        self.records
            .lock()
            .await
            .retain(|(rt, _), _| *rt != room_type_id);
        Ok(())
    }
}

/// インメモリ予約リポジトリ
/// MySQL実装と同じ楽観的ロックセマンティクスを提供する
pub struct InMemoryBookingRepository {
    bookings: Mutex<HashMap<BookingId, Booking>>,
}

impl InMemoryBookingRepository {
    /// 新しいインメモリ予約リポジトリを作成
    pub fn new() -> Self {
        Self {
            bookings: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBookingRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// 永続化用に予約のコピーを作成する
/// ドメインイベントは永続化の対象外のため引き継がない
fn stored_copy(booking: &Booking, version: u64) -> Booking {
    Booking::reconstruct(
        booking.id(),
        booking.user_id(),
        booking.room_type_id(),
        booking.stay(),
        booking.guests(),
        booking.total_price(),
        booking.status(),
        booking.room_number().cloned(),
        version,
        booking.created_at(),
        booking.updated_at(),
    )
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.lock().await;
        if bookings.contains_key(&booking.id()) {
            return Err(RepositoryError::OperationFailed(format!(
                "予約が既に存在します: {}",
                booking.id()
            )));
        }

        bookings.insert(booking.id(), stored_copy(booking, booking.version()));
        Ok(())
    }

    async fn update(&self, booking: &Booking) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.lock().await;
        let stored = bookings.get(&booking.id()).ok_or_else(|| {
            RepositoryError::OperationFailed(format!(
                "更新対象の予約が存在しません: {}",
                booking.id()
            ))
        })?;

        if stored.version() != booking.version() {
            return Err(RepositoryError::VersionConflict);
        }

        bookings.insert(booking.id(), stored_copy(booking, booking.version() + 1));
        Ok(())
    }

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        Ok(self.bookings.lock().await.get(&booking_id).cloned())
    }

    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}

/// インメモリイベント発行者
/// 発行されたイベントを記録し、テストから検証できるようにする
pub struct InMemoryEventPublisher {
    published: Mutex<Vec<(String, String)>>,
}

impl InMemoryEventPublisher {
    /// 新しいインメモリイベント発行者を作成
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
        }
    }

    /// これまでに発行された (トピック, ペイロード) の一覧を取得
    pub async fn published(&self) -> Vec<(String, String)> {
        self.published.lock().await.clone()
    }
}

impl Default for InMemoryEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        self.published
            .lock()
            .await
            .push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_range_does_not_overwrite() {
        let store = InMemoryInventoryStore::new();
        let room_type_id = RoomTypeId::new();

        store
            .initialize_range(room_type_id, 10, date(1), date(3))
            .await
            .unwrap();

        // 6/1を消費してから再初期化しても消費は巻き戻らない
        store
            .compare_and_swap(room_type_id, date(1), 0, 7)
            .await
            .unwrap();
        store
            .initialize_range(room_type_id, 10, date(1), date(3))
            .await
            .unwrap();

        let record = store.get(room_type_id, date(1)).await.unwrap().unwrap();
        assert_eq!(record.available_units(), 7);
        assert_eq!(record.version(), 1);
    }

    #[tokio::test]
    async fn test_compare_and_swap_rejects_stale_version() {
        let store = InMemoryInventoryStore::new();
        let room_type_id = RoomTypeId::new();
        store
            .initialize_range(room_type_id, 10, date(1), date(2))
            .await
            .unwrap();

        store
            .compare_and_swap(room_type_id, date(1), 0, 9)
            .await
            .unwrap();

        // 古いバージョンでの書き込みは拒否される
        let result = store.compare_and_swap(room_type_id, date(1), 0, 8).await;
        assert_eq!(result, Err(StoreError::VersionConflict));
    }

    #[tokio::test]
    async fn test_delete_all_removes_only_target_room_type() {
        let store = InMemoryInventoryStore::new();
        let target = RoomTypeId::new();
        let other = RoomTypeId::new();
        store
            .initialize_range(target, 10, date(1), date(3))
            .await
            .unwrap();
        store
            .initialize_range(other, 5, date(1), date(3))
            .await
            .unwrap();

        store.delete_all(target).await.unwrap();

        assert!(store.get(target, date(1)).await.unwrap().is_none());
        assert!(store.get(other, date(1)).await.unwrap().is_some());
    }
}
