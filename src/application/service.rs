use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{
    Booking, BookingId, InventoryRecord, RoomNumber, RoomTypeId, StayRange, UserId,
};
use crate::domain::port::{
    BookingRepository, Clock, EventPublisher, InventoryStore, Logger, PricingProvider,
    RepositoryError,
};
use crate::domain::retry::RetryPolicy;
use crate::domain::serialization::EventSerializer;
use crate::domain::service::InventoryCoordinator;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;

/// 予約1件が消費する室数
const UNITS_PER_BOOKING: u32 = 1;

/// 宿泊数の上限
const MAX_STAY_NIGHTS: u32 = 30;

/// チェックイン日を受け付ける先付け日数の上限
const MAX_ADVANCE_DAYS: i64 = 365;

/// 予約アプリケーションサービス
/// 予約ライフサイクル（作成・キャンセル・チェックイン・チェックアウト）の
/// ユースケースを実装する
pub struct BookingApplicationService {
    booking_repository: Arc<dyn BookingRepository>,
    inventory_coordinator: Arc<InventoryCoordinator>,
    pricing_provider: Arc<dyn PricingProvider>,
    event_publisher: Arc<dyn EventPublisher>,
    event_serializer: EventSerializer,
    retry_policy: RetryPolicy,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn Logger>,
}

impl BookingApplicationService {
    const COMPONENT: &'static str = "BookingApplicationService";

    /// 新しいアプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `booking_repository` - 予約リポジトリ
    /// * `inventory_coordinator` - 在庫コーディネーター
    /// * `pricing_provider` - 料金プロバイダー
    /// * `event_publisher` - イベント発行者
    /// * `retry_policy` - 予約行の並行更新競合に対するリトライポリシー
    /// * `clock` - 時計
    /// * `logger` - ロガー
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        booking_repository: Arc<dyn BookingRepository>,
        inventory_coordinator: Arc<InventoryCoordinator>,
        pricing_provider: Arc<dyn PricingProvider>,
        event_publisher: Arc<dyn EventPublisher>,
        retry_policy: RetryPolicy,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            booking_repository,
            inventory_coordinator,
            pricing_provider,
            event_publisher,
            event_serializer: EventSerializer::new(),
            retry_policy,
            clock,
            logger,
        }
    }

    /// 新しい予約を作成
    ///
    /// 在庫予約 → 料金計算 → 予約の永続化 → イベント発行の順で実行する
    /// 在庫予約の後に失敗した場合は予約済みの在庫を解放して巻き戻す
    /// イベント発行の失敗はログに記録するのみで予約自体は成功する
    ///
    /// リトライポリシーの適用対象は既存の予約行の更新のみ。挿入は毎回
    /// 新しいIDに対して行われ、バージョン競合が起き得ないためリトライしない
    ///
    /// # Arguments
    /// * `user_id` - 宿泊者ID
    /// * `room_type_id` - 客室タイプID
    /// * `check_in` - チェックイン日
    /// * `check_out` - チェックアウト日
    /// * `guests` - 宿泊人数
    ///
    /// # Returns
    /// * `Ok(Booking)` - 作成された予約（Confirmed状態）
    /// * `Err(ApplicationError)` - 作成失敗
    pub async fn create_booking(
        &self,
        user_id: UserId,
        room_type_id: RoomTypeId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
    ) -> Result<Booking, ApplicationError> {
        let stay = self.validate_booking_request(check_in, check_out, guests)?;

        // 在庫を予約（ここが成功した後の失敗はすべて補償が必要）
        self.inventory_coordinator
            .reserve(room_type_id, &stay, UNITS_PER_BOOKING)
            .await?;

        // 料金を計算（失敗時は在庫を解放）
        let total_price = match self.pricing_provider.price(room_type_id, &stay).await {
            Ok(price) => price,
            Err(e) => {
                self.logger.error(
                    Self::COMPONENT,
                    &format!("Pricing failed, releasing reserved inventory: {}", e),
                    None,
                    None,
                );
                self.compensate_reservation(room_type_id, &stay).await;
                return Err(e.into());
            }
        };

        // 予約を永続化（失敗時は在庫を解放）
        let booking_id = self.booking_repository.next_identity();
        let mut booking = Booking::confirmed(
            booking_id,
            user_id,
            room_type_id,
            stay,
            guests,
            total_price,
            self.clock.now(),
        );

        if let Err(e) = self.booking_repository.insert(&booking).await {
            self.logger.error(
                Self::COMPONENT,
                &format!("Booking persistence failed, releasing reserved inventory: {}", e),
                Some(booking_id.as_uuid()),
                None,
            );
            self.compensate_reservation(room_type_id, &stay).await;
            return Err(e.into());
        }

        self.logger.info(
            Self::COMPONENT,
            "Booking created",
            Some(booking_id.as_uuid()),
            Some(self.booking_context(&booking)),
        );

        self.publish_events(&mut booking).await;

        Ok(booking)
    }

    /// 予約をキャンセル
    ///
    /// 所有者のみがキャンセルでき、所有者が一致しない場合は
    /// 予約の存在を漏らさないためBookingNotFoundを返す
    /// キャンセル成功後に宿泊期間の在庫を解放する
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    /// * `user_id` - 操作する宿泊者ID
    pub async fn cancel_booking(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<Booking, ApplicationError> {
        let now = self.clock.now();
        let mut booking = self
            .modify_booking_with_retry(booking_id, Some(user_id), |booking| booking.cancel(now))
            .await?;

        // キャンセルは確定済み。在庫の解放に失敗した場合は
        // ログに記録してエラーを返す（予約はCancelledのまま）
        if let Err(e) = self
            .inventory_coordinator
            .release(booking.room_type_id(), &booking.stay(), UNITS_PER_BOOKING)
            .await
        {
            self.logger.error(
                Self::COMPONENT,
                &format!("Inventory release after cancellation failed: {}", e),
                Some(booking_id.as_uuid()),
                None,
            );
            return Err(e.into());
        }

        self.logger.info(
            Self::COMPONENT,
            "Booking cancelled",
            Some(booking_id.as_uuid()),
            Some(self.booking_context(&booking)),
        );

        self.publish_events(&mut booking).await;

        Ok(booking)
    }

    /// チェックイン処理
    /// フロント業務として実行されるため所有者チェックは行わない
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    /// * `room_number` - 割り当てる部屋番号
    pub async fn check_in_booking(
        &self,
        booking_id: BookingId,
        room_number: String,
    ) -> Result<Booking, ApplicationError> {
        let room_number = RoomNumber::new(room_number)?;
        let today = self.clock.today();
        let now = self.clock.now();

        let booking = self
            .modify_booking_with_retry(booking_id, None, |booking| {
                booking.check_in(room_number.clone(), today, now)
            })
            .await?;

        self.logger.info(
            Self::COMPONENT,
            "Booking checked in",
            Some(booking_id.as_uuid()),
            Some(self.booking_context(&booking)),
        );

        Ok(booking)
    }

    /// チェックアウト処理
    /// 予定より早いチェックアウトは拒否せず、警告としてログに記録する
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    pub async fn check_out_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<Booking, ApplicationError> {
        let today = self.clock.today();
        let now = self.clock.now();

        let booking = self
            .modify_booking_with_retry(booking_id, None, |booking| booking.check_out(now))
            .await?;

        if today < booking.stay().check_out() {
            self.logger.warn(
                Self::COMPONENT,
                &format!(
                    "Early checkout: scheduled {}, actual {}",
                    booking.stay().check_out(),
                    today
                ),
                Some(booking_id.as_uuid()),
                None,
            );
        }

        self.logger.info(
            Self::COMPONENT,
            "Booking checked out",
            Some(booking_id.as_uuid()),
            Some(self.booking_context(&booking)),
        );

        Ok(booking)
    }

    /// 予約を取得
    /// 所有者が一致しない場合は予約の存在を漏らさないためBookingNotFoundを返す
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    /// * `user_id` - 操作する宿泊者ID
    pub async fn get_booking(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<Booking, ApplicationError> {
        let booking = self
            .booking_repository
            .find_by_id(booking_id)
            .await?
            .filter(|booking| booking.user_id() == user_id)
            .ok_or_else(|| {
                ApplicationError::BookingNotFound(format!("予約が見つかりません: {}", booking_id))
            })?;
        Ok(booking)
    }

    /// リクエストの日付と人数を検証し、宿泊期間を構築する
    fn validate_booking_request(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
    ) -> Result<StayRange, ApplicationError> {
        if guests < 1 {
            return Err(ApplicationError::InvalidRequest(
                "宿泊人数は1人以上である必要があります".to_string(),
            ));
        }

        let stay = StayRange::new(check_in, check_out)?;

        let today = self.clock.today();
        if check_in < today {
            return Err(ApplicationError::InvalidRequest(format!(
                "チェックイン日が過去です: {}",
                check_in
            )));
        }

        if check_in > today + Duration::days(MAX_ADVANCE_DAYS) {
            return Err(ApplicationError::InvalidRequest(format!(
                "チェックイン日は{}日先までしか受け付けません",
                MAX_ADVANCE_DAYS
            )));
        }

        if stay.night_count() > MAX_STAY_NIGHTS {
            return Err(ApplicationError::InvalidRequest(format!(
                "宿泊数は{}泊までです",
                MAX_STAY_NIGHTS
            )));
        }

        Ok(stay)
    }

    /// 予約を読み取り、状態遷移を適用し、楽観的ロック付きで保存する
    /// バージョン競合時は最新の状態を再読み取りしてリトライする
    /// 競合がリトライ上限まで解消しない場合はConcurrentUpdateConflictを返す
    async fn modify_booking_with_retry<F>(
        &self,
        booking_id: BookingId,
        owner: Option<UserId>,
        mut apply: F,
    ) -> Result<Booking, ApplicationError>
    where
        F: FnMut(&mut Booking) -> Result<(), DomainError>,
    {
        let mut attempt: u32 = 1;

        loop {
            let mut booking = self
                .booking_repository
                .find_by_id(booking_id)
                .await?
                .filter(|booking| owner.map_or(true, |owner| booking.user_id() == owner))
                .ok_or_else(|| {
                    ApplicationError::BookingNotFound(format!(
                        "予約が見つかりません: {}",
                        booking_id
                    ))
                })?;

            apply(&mut booking)?;

            match self.booking_repository.update(&booking).await {
                Ok(()) => return Ok(booking),
                Err(RepositoryError::VersionConflict) => {
                    if self.retry_policy.is_last_attempt(attempt) {
                        return Err(ApplicationError::ConcurrentUpdateConflict(format!(
                            "予約の更新が{}回の試行で競合しました: {}",
                            attempt, booking_id
                        )));
                    }

                    self.logger.debug(
                        Self::COMPONENT,
                        &format!("Booking update conflict, retrying (attempt {})", attempt),
                        Some(booking_id.as_uuid()),
                        None,
                    );

                    tokio::time::sleep(self.retry_policy.backoff_delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 予約済み在庫をベストエフォートで解放する
    /// 解放の失敗はログに記録するのみで、元のエラーを隠さない
    async fn compensate_reservation(&self, room_type_id: RoomTypeId, stay: &StayRange) {
        if let Err(e) = self
            .inventory_coordinator
            .release(room_type_id, stay, UNITS_PER_BOOKING)
            .await
        {
            self.logger.error(
                Self::COMPONENT,
                &format!("Compensating inventory release failed: {}", e),
                None,
                None,
            );
        }
    }

    /// 予約集約の未発行イベントをすべて発行する
    /// 発行の失敗はログに記録するのみで呼び出し元の処理を失敗させない
    async fn publish_events(&self, booking: &mut Booking) {
        for event in booking.take_domain_events() {
            let payload = match self.event_serializer.serialize_event(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    self.logger.error(
                        Self::COMPONENT,
                        &format!("Failed to serialize {}: {}", event.event_type(), e),
                        Some(booking.id().as_uuid()),
                        None,
                    );
                    continue;
                }
            };

            if let Err(e) = self.event_publisher.publish(event.topic(), &payload).await {
                self.logger.error(
                    Self::COMPONENT,
                    &format!("Failed to publish {}: {}", event.event_type(), e),
                    Some(booking.id().as_uuid()),
                    None,
                );
            }
        }
    }

    fn booking_context(&self, booking: &Booking) -> HashMap<String, String> {
        let mut context = HashMap::new();
        context.insert("booking_id".to_string(), booking.id().to_string());
        context.insert("room_type_id".to_string(), booking.room_type_id().to_string());
        context.insert("status".to_string(), booking.status().to_string());
        context
    }
}

/// 在庫アプリケーションサービス
/// 客室タイプの販売開始・販売終了と空室照会のユースケースを実装する
pub struct InventoryApplicationService {
    inventory_store: Arc<dyn InventoryStore>,
    logger: Arc<dyn Logger>,
}

impl InventoryApplicationService {
    const COMPONENT: &'static str = "InventoryApplicationService";

    /// 新しい在庫アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `inventory_store` - 在庫ストア
    /// * `logger` - ロガー
    pub fn new(inventory_store: Arc<dyn InventoryStore>, logger: Arc<dyn Logger>) -> Self {
        Self {
            inventory_store,
            logger,
        }
    }

    /// 客室タイプの販売期間を開設する
    /// 既存の在庫レコードは上書きされないため、同じ期間で再実行しても安全
    ///
    /// # Arguments
    /// * `room_type_id` - 客室タイプID
    /// * `total_rooms` - 客室数
    /// * `start_date` - 販売開始日（この日を含む）
    /// * `end_date` - 販売終了日（この日を含まない）
    pub async fn open_inventory(
        &self,
        room_type_id: RoomTypeId,
        total_rooms: u32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), ApplicationError> {
        if end_date <= start_date {
            return Err(ApplicationError::InvalidRequest(format!(
                "販売終了日は販売開始日より後である必要があります: {} .. {}",
                start_date, end_date
            )));
        }

        if total_rooms < 1 {
            return Err(ApplicationError::InvalidRequest(
                "客室数は1以上である必要があります".to_string(),
            ));
        }

        self.inventory_store
            .initialize_range(room_type_id, total_rooms, start_date, end_date)
            .await?;

        self.logger.info(
            Self::COMPONENT,
            &format!(
                "Inventory opened: {} room(s), {} .. {}",
                total_rooms, start_date, end_date
            ),
            None,
            None,
        );

        Ok(())
    }

    /// 客室タイプを販売終了にする
    /// 全日付の在庫レコードを削除する
    ///
    /// # Arguments
    /// * `room_type_id` - 客室タイプID
    pub async fn close_room_type(&self, room_type_id: RoomTypeId) -> Result<(), ApplicationError> {
        self.inventory_store.delete_all(room_type_id).await?;

        self.logger.info(
            Self::COMPONENT,
            &format!("Room type closed: {}", room_type_id),
            None,
            None,
        );

        Ok(())
    }

    /// 期間内の空室状況を取得する
    /// 期間は `[start_date, end_date)`
    /// レコードが存在しない日付が含まれる場合はInventoryNotFoundを返す
    ///
    /// # Arguments
    /// * `room_type_id` - 客室タイプID
    /// * `start_date` - 照会開始日（この日を含む）
    /// * `end_date` - 照会終了日（この日を含まない）
    pub async fn get_availability(
        &self,
        room_type_id: RoomTypeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<InventoryRecord>, ApplicationError> {
        if end_date <= start_date {
            return Err(ApplicationError::InvalidRequest(format!(
                "照会終了日は照会開始日より後である必要があります: {} .. {}",
                start_date, end_date
            )));
        }

        let mut records = Vec::new();
        let mut date = start_date;
        while date < end_date {
            let record = self
                .inventory_store
                .get(room_type_id, date)
                .await?
                .ok_or_else(|| {
                    ApplicationError::InventoryNotFound(format!(
                        "在庫レコードが見つかりません: room_type={}, date={}",
                        room_type_id, date
                    ))
                })?;
            records.push(record);
            date = date.succ_opt().ok_or_else(|| {
                ApplicationError::InvalidRequest(format!("日付が範囲外です: {}", date))
            })?;
        }

        Ok(records)
    }
}
