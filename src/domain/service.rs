// ドメインサービス
// 複数の在庫レコードにまたがる予約プロトコルを実装

use crate::domain::model::{InventoryRecord, RoomTypeId, StayRange};
use crate::domain::port::{InventoryStore, Logger, StoreError};
use crate::domain::retry::RetryPolicy;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// 在庫調整エラー
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Inventory record not found: room_type={room_type_id}, date={date}")]
    InventoryNotFound {
        room_type_id: RoomTypeId,
        date: NaiveDate,
    },

    #[error("Insufficient inventory: room_type={room_type_id}, date={date}")]
    InsufficientInventory {
        room_type_id: RoomTypeId,
        date: NaiveDate,
    },

    #[error("Version conflict retries exhausted after {attempts} attempts")]
    ConflictRetriesExhausted { attempts: u32 },

    #[error("Inventory store error: {0}")]
    Store(#[from] StoreError),
}

/// 在庫コーディネーター
/// 宿泊期間の各泊について在庫の予約と解放を調整する
///
/// ストアが保証する原子性は単一レコードのcompare-and-swapのみのため、
/// 複数泊にまたがる予約は次のプロトコルで近似する
/// 1. 事前チェック: 全泊の空室数を読み取り、不足があれば書き込み前に失敗
/// 2. コミット: チェックイン日から順に1泊ずつCASで減算（競合時はリトライ）
/// 3. 補償: 途中で失敗した場合、書き込み済みの泊を逆順に解放して巻き戻す
pub struct InventoryCoordinator {
    inventory_store: Arc<dyn InventoryStore>,
    retry_policy: RetryPolicy,
    logger: Arc<dyn Logger>,
}

impl InventoryCoordinator {
    const COMPONENT: &'static str = "InventoryCoordinator";

    /// 新しい在庫コーディネーターを作成
    ///
    /// # Arguments
    /// * `inventory_store` - 在庫ストア
    /// * `retry_policy` - バージョン競合時のリトライポリシー
    /// * `logger` - ロガー
    pub fn new(
        inventory_store: Arc<dyn InventoryStore>,
        retry_policy: RetryPolicy,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            inventory_store,
            retry_policy,
            logger,
        }
    }

    /// 宿泊期間の全泊について在庫を予約する
    ///
    /// 全泊の予約が成功した場合のみ `Ok(())` を返す
    /// 途中で失敗した場合は書き込み済みの泊を解放してから失敗を返すため、
    /// 部分的な予約が残ることはない（補償の解放自体が失敗した場合を除く）
    ///
    /// # Arguments
    /// * `room_type_id` - 客室タイプID
    /// * `stay` - 宿泊期間（チェックアウト日は含まない）
    /// * `units` - 予約する室数
    pub async fn reserve(
        &self,
        room_type_id: RoomTypeId,
        stay: &StayRange,
        units: u32,
    ) -> Result<(), InventoryError> {
        // 事前チェック: 全泊の在庫を読み取り、不足があれば書き込み前に失敗
        let mut records = Vec::new();
        for date in stay.nights() {
            let record = self
                .inventory_store
                .get(room_type_id, date)
                .await?
                .ok_or(InventoryError::InventoryNotFound { room_type_id, date })?;

            if !record.has_capacity(units) {
                return Err(InventoryError::InsufficientInventory { room_type_id, date });
            }

            records.push(record);
        }

        // コミット: 1泊ずつCASで減算し、失敗したら書き込み済みの泊を巻き戻す
        let mut reserved_dates: Vec<NaiveDate> = Vec::new();
        for record in records {
            let date = record.date();
            if let Err(e) = self.reserve_night(room_type_id, record, units).await {
                self.logger.warn(
                    Self::COMPONENT,
                    &format!("Reservation failed at {}, rolling back {} night(s)", date, reserved_dates.len()),
                    None,
                    Some(self.log_context(room_type_id, date, units)),
                );
                self.rollback(room_type_id, &reserved_dates, units).await;
                return Err(e);
            }
            reserved_dates.push(date);
        }

        self.logger.info(
            Self::COMPONENT,
            &format!("Reserved {} unit(s) for {} night(s)", units, reserved_dates.len()),
            None,
            Some(self.log_context(room_type_id, stay.check_in(), units)),
        );

        Ok(())
    }

    /// 宿泊期間の全泊について在庫を解放する（キャンセル時など）
    ///
    /// 途中で失敗しても残りの泊の解放を続行し、最初のエラーを返す
    /// 解放は加算のみであり、予約済みの泊を二重に解放しない限り安全
    pub async fn release(
        &self,
        room_type_id: RoomTypeId,
        stay: &StayRange,
        units: u32,
    ) -> Result<(), InventoryError> {
        let mut first_error: Option<InventoryError> = None;

        for date in stay.nights() {
            if let Err(e) = self.release_night(room_type_id, date, units).await {
                self.logger.error(
                    Self::COMPONENT,
                    &format!("Failed to release inventory: {}", e),
                    None,
                    Some(self.log_context(room_type_id, date, units)),
                );
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    /// 1泊分の在庫をCASで減算する
    /// バージョン競合時は再読み取りして空室数を再チェックし、リトライする
    async fn reserve_night(
        &self,
        room_type_id: RoomTypeId,
        mut record: InventoryRecord,
        units: u32,
    ) -> Result<(), InventoryError> {
        let date = record.date();
        let mut attempt: u32 = 1;

        loop {
            let new_units = record.available_units() - units;
            match self
                .inventory_store
                .compare_and_swap(room_type_id, date, record.version(), new_units)
                .await
            {
                Ok(()) => return Ok(()),
                Err(StoreError::VersionConflict) => {
                    if self.retry_policy.is_last_attempt(attempt) {
                        return Err(InventoryError::ConflictRetriesExhausted {
                            attempts: attempt,
                        });
                    }

                    self.logger.debug(
                        Self::COMPONENT,
                        &format!("Version conflict at {}, retrying (attempt {})", date, attempt),
                        None,
                        Some(self.log_context(room_type_id, date, units)),
                    );

                    tokio::time::sleep(self.retry_policy.backoff_delay(attempt)).await;
                    attempt += 1;

                    // 競合後は最新の状態で空室数を再チェック
                    record = self
                        .inventory_store
                        .get(room_type_id, date)
                        .await?
                        .ok_or(InventoryError::InventoryNotFound { room_type_id, date })?;

                    if !record.has_capacity(units) {
                        return Err(InventoryError::InsufficientInventory { room_type_id, date });
                    }
                }
                Err(StoreError::NotFound) => {
                    return Err(InventoryError::InventoryNotFound { room_type_id, date });
                }
                Err(e) => return Err(InventoryError::Store(e)),
            }
        }
    }

    /// 1泊分の在庫をCASで加算する
    async fn release_night(
        &self,
        room_type_id: RoomTypeId,
        date: NaiveDate,
        units: u32,
    ) -> Result<(), InventoryError> {
        let mut attempt: u32 = 1;

        loop {
            let record = self
                .inventory_store
                .get(room_type_id, date)
                .await?
                .ok_or(InventoryError::InventoryNotFound { room_type_id, date })?;

            let new_units = record.available_units() + units;
            match self
                .inventory_store
                .compare_and_swap(room_type_id, date, record.version(), new_units)
                .await
            {
                Ok(()) => return Ok(()),
                Err(StoreError::VersionConflict) => {
                    if self.retry_policy.is_last_attempt(attempt) {
                        return Err(InventoryError::ConflictRetriesExhausted {
                            attempts: attempt,
                        });
                    }
                    tokio::time::sleep(self.retry_policy.backoff_delay(attempt)).await;
                    attempt += 1;
                }
                Err(StoreError::NotFound) => {
                    return Err(InventoryError::InventoryNotFound { room_type_id, date });
                }
                Err(e) => return Err(InventoryError::Store(e)),
            }
        }
    }

    /// 書き込み済みの泊をベストエフォートで解放する
    /// 解放の失敗はログに記録するのみで、元のエラーを隠さない
    async fn rollback(&self, room_type_id: RoomTypeId, reserved_dates: &[NaiveDate], units: u32) {
        for date in reserved_dates.iter().rev() {
            if let Err(e) = self.release_night(room_type_id, *date, units).await {
                self.logger.error(
                    Self::COMPONENT,
                    &format!("Compensating release failed at {}: {}", date, e),
                    None,
                    Some(self.log_context(room_type_id, *date, units)),
                );
            }
        }
    }

    fn log_context(
        &self,
        room_type_id: RoomTypeId,
        date: NaiveDate,
        units: u32,
    ) -> HashMap<String, String> {
        let mut context = HashMap::new();
        context.insert("room_type_id".to_string(), room_type_id.to_string());
        context.insert("date".to_string(), date.to_string());
        context.insert("units".to_string(), units.to_string());
        context
    }
}
