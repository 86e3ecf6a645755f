use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Booking, BookingId};
use crate::domain::port::{BookingRepository, RepositoryError};
use async_trait::async_trait;

// MySQL関連のインポート
use crate::domain::model::{BookingStatus, Money, RoomNumber, RoomTypeId, StayRange, UserId};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{MySql, Pool, Row};

/// MySQL予約リポジトリ
/// MySQLデータベースを使用して予約を永続化する
/// 更新はversion列を条件に含むUPDATEで行い、楽観的ロックを実現する
pub struct MySqlBookingRepository {
    pool: Pool<MySql>,
}

impl MySqlBookingRepository {
    /// 新しいMySQL予約リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行から予約集約を再構築する
    fn build_booking_from_row(&self, row: &sqlx::mysql::MySqlRow) -> Result<Booking, RepositoryError> {
        let booking_id = BookingId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("予約IDの解析に失敗しました: {}", e))
        })?;

        let user_id = UserId::from_string(row.get("user_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("宿泊者IDの解析に失敗しました: {}", e))
        })?;

        let room_type_id = RoomTypeId::from_string(row.get("room_type_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("客室タイプIDの解析に失敗しました: {}", e))
        })?;

        let stay = StayRange::new(
            row.get::<NaiveDate, _>("check_in_date"),
            row.get::<NaiveDate, _>("check_out_date"),
        )
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("宿泊期間の構築に失敗しました: {}", e))
        })?;

        let total_price = Money::new(
            row.get::<i64, _>("total_price_amount"),
            row.get::<String, _>("total_price_currency"),
        )
        .map_err(|e| RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e)))?;

        let status = BookingStatus::from_string(row.get("status")).map_err(|e| {
            RepositoryError::FetchFailed(format!("予約ステータスの解析に失敗しました: {}", e))
        })?;

        let room_number = match row.get::<Option<String>, _>("room_number") {
            Some(value) => Some(RoomNumber::new(value).map_err(|e| {
                RepositoryError::FetchFailed(format!("部屋番号の構築に失敗しました: {}", e))
            })?),
            None => None,
        };

        Ok(Booking::reconstruct(
            booking_id,
            user_id,
            room_type_id,
            stay,
            row.get::<u32, _>("guests"),
            total_price,
            status,
            room_number,
            row.get::<u64, _>("version"),
            row.get::<NaiveDateTime, _>("created_at").and_utc(),
            row.get::<NaiveDateTime, _>("updated_at").and_utc(),
        ))
    }
}

#[async_trait]
impl BookingRepository for MySqlBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, user_id, room_type_id, check_in_date, check_out_date,
                guests, total_price_amount, total_price_currency,
                status, room_number, version, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(booking.id().to_string())
        .bind(booking.user_id().to_string())
        .bind(booking.room_type_id().to_string())
        .bind(booking.stay().check_in())
        .bind(booking.stay().check_out())
        .bind(booking.guests())
        .bind(booking.total_price().amount())
        .bind(booking.total_price().currency())
        .bind(booking.status().to_string())
        .bind(booking.room_number().map(|r| r.as_str().to_string()))
        .bind(booking.version())
        .bind(booking.created_at().naive_utc())
        .bind(booking.updated_at().naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("予約の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn update(&self, booking: &Booking) -> Result<(), RepositoryError> {
        // version列が読み取り時の値と一致する場合のみ更新する
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = ?, room_number = ?, version = version + 1, updated_at = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(booking.status().to_string())
        .bind(booking.room_number().map(|r| r.as_str().to_string()))
        .bind(booking.updated_at().naive_utc())
        .bind(booking.id().to_string())
        .bind(booking.version())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("予約の更新に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // 更新が空振りした場合、レコード不在とバージョン競合を区別する
        let exists = sqlx::query("SELECT 1 FROM bookings WHERE id = ?")
            .bind(booking.id().to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("予約の確認に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        match exists {
            Some(_) => Err(RepositoryError::VersionConflict),
            None => Err(RepositoryError::OperationFailed(format!(
                "更新対象の予約が存在しません: {}",
                booking.id()
            ))),
        }
    }

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, room_type_id, check_in_date, check_out_date,
                   guests, total_price_amount, total_price_currency,
                   status, room_number, version, created_at, updated_at
            FROM bookings
            WHERE id = ?
            "#,
        )
        .bind(booking_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("予約の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(self.build_booking_from_row(&row)?)),
            None => Ok(None),
        }
    }

    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}
