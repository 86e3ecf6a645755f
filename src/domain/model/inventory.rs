use crate::domain::error::DomainError;
use crate::domain::model::RoomTypeId;
use chrono::NaiveDate;

/// 在庫レコード
/// (客室タイプ, 日付) ごとの空室数を楽観的バージョン付きで管理する
/// バージョンはストアへの書き込み成功ごとに1ずつ増加する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    room_type_id: RoomTypeId,
    date: NaiveDate,
    available_units: u32,
    version: u64,
}

impl InventoryRecord {
    /// 新しい在庫レコードを作成（バージョン0）
    pub fn new(room_type_id: RoomTypeId, date: NaiveDate, available_units: u32) -> Self {
        Self {
            room_type_id,
            date,
            available_units,
            version: 0,
        }
    }

    /// ストアから取得したデータで在庫レコードを再構築
    pub fn reconstruct(
        room_type_id: RoomTypeId,
        date: NaiveDate,
        available_units: u32,
        version: u64,
    ) -> Self {
        Self {
            room_type_id,
            date,
            available_units,
            version,
        }
    }

    /// 客室タイプIDを取得
    pub fn room_type_id(&self) -> RoomTypeId {
        self.room_type_id
    }

    /// 対象日付を取得
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// 空室数を取得
    pub fn available_units(&self) -> u32 {
        self.available_units
    }

    /// 楽観的バージョンを取得
    pub fn version(&self) -> u64 {
        self.version
    }

    /// 指定された室数の在庫が利用可能かチェック
    pub fn has_capacity(&self, units: u32) -> bool {
        self.available_units >= units
    }

    /// 在庫を予約する（空室数を減算）
    /// 空室数が不足している場合はエラーを返し、レコードは変更されない
    pub fn reserve(&mut self, units: u32) -> Result<(), DomainError> {
        if !self.has_capacity(units) {
            return Err(DomainError::InsufficientInventory);
        }
        self.available_units -= units;
        Ok(())
    }

    /// 在庫を解放する（空室数を加算、キャンセル・補償時）
    /// 二重解放の防止は予約の状態遷移で保証されるため、ここでは上限を検査しない
    pub fn release(&mut self, units: u32) {
        self.available_units += units;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(units: u32) -> InventoryRecord {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        InventoryRecord::new(RoomTypeId::new(), date, units)
    }

    #[test]
    fn test_record_creation_starts_at_version_zero() {
        let rec = record(10);
        assert_eq!(rec.available_units(), 10);
        assert_eq!(rec.version(), 0);
    }

    #[test]
    fn test_reserve_success() {
        let mut rec = record(10);
        let result = rec.reserve(4);
        assert!(result.is_ok());
        assert_eq!(rec.available_units(), 6);
    }

    #[test]
    fn test_reserve_insufficient_inventory() {
        let mut rec = record(3);
        let result = rec.reserve(5);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), DomainError::InsufficientInventory);
        assert_eq!(rec.available_units(), 3); // 空室数は変わらない
    }

    #[test]
    fn test_reserve_exact_units() {
        let mut rec = record(5);
        assert!(rec.reserve(5).is_ok());
        assert_eq!(rec.available_units(), 0);
    }

    #[test]
    fn test_release_increments_units() {
        let mut rec = record(2);
        rec.release(3);
        assert_eq!(rec.available_units(), 5);
    }

    #[test]
    fn test_has_capacity() {
        let rec = record(10);
        assert!(rec.has_capacity(5));
        assert!(rec.has_capacity(10));
        assert!(!rec.has_capacity(11));
    }
}
