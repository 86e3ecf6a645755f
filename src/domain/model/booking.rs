use crate::domain::error::DomainError;
use crate::domain::event::{BookingCancelled, BookingCreated, BookingEvent};
use crate::domain::model::{
    BookingId, BookingStatus, Money, RoomNumber, RoomTypeId, StayRange, UserId,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// キャンセル期限: チェックイン24時間前
const CANCELLATION_DEADLINE_HOURS: i64 = 24;

/// Booking集約
/// 予約のライフサイクル（状態機械）を管理し、ビジネスルールを適用する
///
/// 状態遷移: Confirmed → {Cancelled, CheckedIn} → {CheckedOut}
/// Cancelled と CheckedOut は終端状態で、一度離れた状態には戻れない
#[derive(Debug, Clone)]
pub struct Booking {
    id: BookingId,
    user_id: UserId,
    room_type_id: RoomTypeId,
    stay: StayRange,
    guests: u32,
    total_price: Money,
    status: BookingStatus,
    room_number: Option<RoomNumber>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    domain_events: Vec<BookingEvent>,
}

impl Booking {
    /// 在庫予約成功後に確定済み（Confirmed）の予約を作成する
    /// 予約はこのコンストラクタ経由でのみ生まれる（Pending状態は存在しない）
    pub fn confirmed(
        id: BookingId,
        user_id: UserId,
        room_type_id: RoomTypeId,
        stay: StayRange,
        guests: u32,
        total_price: Money,
        now: DateTime<Utc>,
    ) -> Self {
        let event = BookingCreated::new(id, user_id, room_type_id, stay, guests, total_price, now);
        Self {
            id,
            user_id,
            room_type_id,
            stay,
            guests,
            total_price,
            status: BookingStatus::Confirmed,
            room_number: None,
            version: 0,
            created_at: now,
            updated_at: now,
            domain_events: vec![BookingEvent::BookingCreated(event)],
        }
    }

    /// データベースから取得したデータで予約を再構築
    /// リポジトリでの使用を想定
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: BookingId,
        user_id: UserId,
        room_type_id: RoomTypeId,
        stay: StayRange,
        guests: u32,
        total_price: Money,
        status: BookingStatus,
        room_number: Option<RoomNumber>,
        version: u64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            room_type_id,
            stay,
            guests,
            total_price,
            status,
            room_number,
            version,
            created_at,
            updated_at,
            domain_events: Vec::new(),
        }
    }

    /// 予約IDを取得
    pub fn id(&self) -> BookingId {
        self.id
    }

    /// 宿泊者IDを取得
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// 客室タイプIDを取得
    pub fn room_type_id(&self) -> RoomTypeId {
        self.room_type_id
    }

    /// 宿泊期間を取得
    pub fn stay(&self) -> StayRange {
        self.stay
    }

    /// 宿泊人数を取得
    pub fn guests(&self) -> u32 {
        self.guests
    }

    /// 合計金額を取得
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// 予約ステータスを取得
    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// 割り当てられた部屋番号を取得（チェックインまではNone）
    pub fn room_number(&self) -> Option<&RoomNumber> {
        self.room_number.as_ref()
    }

    /// 楽観的バージョンを取得
    pub fn version(&self) -> u64 {
        self.version
    }

    /// 作成日時を取得
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 更新日時を取得
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// ドメインイベントを取得してクリア
    pub fn take_domain_events(&mut self) -> Vec<BookingEvent> {
        std::mem::take(&mut self.domain_events)
    }

    /// チェックイン日の開始時刻（深夜0時 UTC）
    fn check_in_start(&self) -> DateTime<Utc> {
        self.stay.check_in().and_time(NaiveTime::MIN).and_utc()
    }

    /// 予約をキャンセル
    /// 事前条件:
    /// - ステータスがConfirmed
    /// - チェックインまで24時間以上あること
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != BookingStatus::Confirmed {
            return Err(DomainError::BookingConflict(format!(
                "キャンセルできるのはConfirmed状態のみです（現在: {}）",
                self.status
            )));
        }

        if self.check_in_start() - now < Duration::hours(CANCELLATION_DEADLINE_HOURS) {
            return Err(DomainError::BookingConflict(
                "チェックイン24時間前を過ぎた予約はキャンセルできません".to_string(),
            ));
        }

        self.status = BookingStatus::Cancelled;
        self.updated_at = now;

        let event =
            BookingCancelled::new(self.id, self.user_id, self.room_type_id, self.stay, now);
        self.domain_events
            .push(BookingEvent::BookingCancelled(event));

        Ok(())
    }

    /// チェックイン処理
    /// 事前条件:
    /// - ステータスがConfirmed
    /// - 当日（チェックイン日）であること
    pub fn check_in(
        &mut self,
        room_number: RoomNumber,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.status != BookingStatus::Confirmed {
            return Err(DomainError::BookingConflict(format!(
                "チェックインできるのはConfirmed状態のみです（現在: {}）",
                self.status
            )));
        }

        if self.stay.check_in() != today {
            return Err(DomainError::BookingConflict(format!(
                "チェックインはチェックイン日当日のみ可能です（予約日: {}）",
                self.stay.check_in()
            )));
        }

        self.room_number = Some(room_number);
        self.status = BookingStatus::CheckedIn;
        self.updated_at = now;

        Ok(())
    }

    /// チェックアウト処理
    /// 事前条件:
    /// - ステータスがCheckedIn
    /// 予定より早いチェックアウトは許可される（呼び出し側でログに記録）
    pub fn check_out(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != BookingStatus::CheckedIn {
            return Err(DomainError::BookingConflict(format!(
                "チェックアウトできるのはCheckedIn状態のみです（現在: {}）",
                self.status
            )));
        }

        self.status = BookingStatus::CheckedOut;
        self.updated_at = now;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn confirmed_booking() -> Booking {
        let stay = StayRange::new(date(2024, 6, 10), date(2024, 6, 12)).unwrap();
        Booking::confirmed(
            BookingId::new(),
            UserId::new(),
            RoomTypeId::new(),
            stay,
            2,
            Money::jpy(24000),
            at(2024, 6, 1, 12),
        )
    }

    #[test]
    fn test_new_booking_is_confirmed() {
        let booking = confirmed_booking();
        assert_eq!(booking.status(), BookingStatus::Confirmed);
        assert!(booking.room_number().is_none());
        assert_eq!(booking.version(), 0);
    }

    #[test]
    fn test_new_booking_emits_created_event() {
        let mut booking = confirmed_booking();
        let events = booking.take_domain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "BookingCreated");
        // ドレイン後は空
        assert!(booking.take_domain_events().is_empty());
    }

    #[test]
    fn test_cancel_before_deadline() {
        let mut booking = confirmed_booking();
        let result = booking.cancel(at(2024, 6, 8, 12));
        assert!(result.is_ok());
        assert_eq!(booking.status(), BookingStatus::Cancelled);

        let events = booking.take_domain_events();
        assert_eq!(events.len(), 2); // Created + Cancelled
        assert_eq!(events[1].event_type(), "BookingCancelled");
    }

    #[test]
    fn test_cancel_within_24_hours_fails() {
        let mut booking = confirmed_booking();
        // チェックイン日は6/10 00:00、6/9 12:00は24時間未満
        let result = booking.cancel(at(2024, 6, 9, 12));
        assert!(result.is_err());
        assert_eq!(booking.status(), BookingStatus::Confirmed);
    }

    #[test]
    fn test_cancel_on_check_in_day_fails() {
        let mut booking = confirmed_booking();
        let result = booking.cancel(at(2024, 6, 10, 8));
        assert!(result.is_err());
    }

    #[test]
    fn test_cancel_twice_fails() {
        let mut booking = confirmed_booking();
        booking.cancel(at(2024, 6, 1, 12)).unwrap();
        let result = booking.cancel(at(2024, 6, 1, 13));
        assert!(result.is_err());
        assert_eq!(booking.status(), BookingStatus::Cancelled);
    }

    #[test]
    fn test_check_in_on_arrival_day() {
        let mut booking = confirmed_booking();
        let room = RoomNumber::new("305".to_string()).unwrap();
        let result = booking.check_in(room, date(2024, 6, 10), at(2024, 6, 10, 15));
        assert!(result.is_ok());
        assert_eq!(booking.status(), BookingStatus::CheckedIn);
        assert_eq!(booking.room_number().unwrap().as_str(), "305");
    }

    #[test]
    fn test_check_in_on_wrong_day_fails() {
        let mut booking = confirmed_booking();
        let room = RoomNumber::new("305".to_string()).unwrap();
        let result = booking.check_in(room, date(2024, 6, 9), at(2024, 6, 9, 15));
        assert!(result.is_err());
        assert_eq!(booking.status(), BookingStatus::Confirmed);
        assert!(booking.room_number().is_none());
    }

    #[test]
    fn test_check_in_after_cancel_fails() {
        let mut booking = confirmed_booking();
        booking.cancel(at(2024, 6, 1, 12)).unwrap();
        let room = RoomNumber::new("305".to_string()).unwrap();
        let result = booking.check_in(room, date(2024, 6, 10), at(2024, 6, 10, 15));
        assert!(result.is_err());
    }

    #[test]
    fn test_check_out_from_checked_in() {
        let mut booking = confirmed_booking();
        let room = RoomNumber::new("305".to_string()).unwrap();
        booking
            .check_in(room, date(2024, 6, 10), at(2024, 6, 10, 15))
            .unwrap();
        let result = booking.check_out(at(2024, 6, 12, 10));
        assert!(result.is_ok());
        assert_eq!(booking.status(), BookingStatus::CheckedOut);
    }

    #[test]
    fn test_check_out_from_confirmed_fails() {
        let mut booking = confirmed_booking();
        let result = booking.check_out(at(2024, 6, 12, 10));
        assert!(result.is_err());
    }

    #[test]
    fn test_cancel_after_check_out_fails() {
        let mut booking = confirmed_booking();
        let room = RoomNumber::new("305".to_string()).unwrap();
        booking
            .check_in(room, date(2024, 6, 10), at(2024, 6, 10, 15))
            .unwrap();
        booking.check_out(at(2024, 6, 11, 9)).unwrap();
        // 終端状態からの遷移は不可
        assert!(booking.cancel(at(2024, 6, 1, 0)).is_err());
        assert_eq!(booking.status(), BookingStatus::CheckedOut);
    }
}
