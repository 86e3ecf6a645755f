use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{InventoryRecord, RoomTypeId};
use crate::domain::port::{InventoryStore, StoreError};
use async_trait::async_trait;
use chrono::NaiveDate;

// MySQL関連のインポート
use sqlx::{MySql, Pool, Row};

/// MySQL在庫ストア
/// (客室タイプ, 日付) ごとの在庫レコードをMySQLで永続化する
/// 空室数の書き換えはversion列を条件に含むUPDATEで行い、
/// 行ロックを保持せずに楽観的なcompare-and-swapを実現する
#[derive(Clone)]
pub struct MySqlInventoryStore {
    pool: Pool<MySql>,
}

impl MySqlInventoryStore {
    /// 新しいMySQL在庫ストアを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for MySqlInventoryStore {
    async fn get(
        &self,
        room_type_id: RoomTypeId,
        date: NaiveDate,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT room_type_id, date, available_units, version FROM room_inventory WHERE room_type_id = ? AND date = ?",
        )
        .bind(room_type_id.to_string())
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("在庫レコードの取得に失敗しました: {}", e)))
        .map_err(StoreError::from)?;

        match row {
            Some(row) => {
                let room_type_id =
                    RoomTypeId::from_string(row.get("room_type_id")).map_err(|e| {
                        StoreError::OperationFailed(format!("客室タイプIDの解析に失敗しました: {}", e))
                    })?;

                let record = InventoryRecord::reconstruct(
                    room_type_id,
                    row.get::<NaiveDate, _>("date"),
                    row.get::<u32, _>("available_units"),
                    row.get::<u64, _>("version"),
                );
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn compare_and_swap(
        &self,
        room_type_id: RoomTypeId,
        date: NaiveDate,
        expected_version: u64,
        new_available_units: u32,
    ) -> Result<(), StoreError> {
        // version列が読み取り時の値と一致する場合のみ更新する
        let result = sqlx::query(
            r#"
            UPDATE room_inventory
            SET available_units = ?, version = version + 1
            WHERE room_type_id = ? AND date = ? AND version = ?
            "#,
        )
        .bind(new_available_units)
        .bind(room_type_id.to_string())
        .bind(date)
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("在庫レコードの更新に失敗しました: {}", e)))
        .map_err(StoreError::from)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // 更新が空振りした場合、レコード不在とバージョン競合を区別する
        let exists = sqlx::query(
            "SELECT 1 FROM room_inventory WHERE room_type_id = ? AND date = ?",
        )
        .bind(room_type_id.to_string())
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("在庫レコードの確認に失敗しました: {}", e)))
        .map_err(StoreError::from)?;

        match exists {
            Some(_) => Err(StoreError::VersionConflict),
            None => Err(StoreError::NotFound),
        }
    }

    async fn initialize_range(
        &self,
        room_type_id: RoomTypeId,
        total_rooms: u32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), StoreError> {
        // INSERT IGNOREにより既存レコードを上書きせず、再実行を安全にする
        let mut date = start_date;
        while date < end_date {
            sqlx::query(
                r#"
                INSERT IGNORE INTO room_inventory (room_type_id, date, available_units, version)
                VALUES (?, ?, ?, 0)
                "#,
            )
            .bind(room_type_id.to_string())
            .bind(date)
            .bind(total_rooms)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("在庫レコードの作成に失敗しました: {}", e))
            })
            .map_err(StoreError::from)?;

            date = date
                .succ_opt()
                .ok_or_else(|| StoreError::OperationFailed(format!("日付が範囲外です: {}", date)))?;
        }

        Ok(())
    }

    async fn delete_all(&self, room_type_id: RoomTypeId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM room_inventory WHERE room_type_id = ?")
            .bind(room_type_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("在庫レコードの削除に失敗しました: {}", e))
            })
            .map_err(StoreError::from)?;

        Ok(())
    }
}
