use crate::domain::error::DomainError;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// 予約の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// 新しい一意のBookingIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから BookingId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からBookingIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

/// 宿泊者（ゲスト）の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// 新しい一意のUserIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから UserId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からUserIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// 客室タイプの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomTypeId(Uuid);

impl RoomTypeId {
    /// 新しい一意のRoomTypeIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから RoomTypeId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からRoomTypeIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }
}

impl fmt::Display for RoomTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for RoomTypeId {
    fn default() -> Self {
        Self::new()
    }
}

/// 部屋番号を表す値オブジェクト
/// チェックイン時に割り当てられる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomNumber(String);

impl RoomNumber {
    /// 新しい部屋番号を作成
    /// 空文字列は許可しない
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::InvalidValue(
                "部屋番号は空にできません".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// 部屋番号を文字列として取得
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// 日本円
    #[allow(clippy::upper_case_acronyms)]
    JPY,
}

/// 金額を表す値オブジェクト
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// 金額と通貨から作成
    pub fn new(amount: i64, currency: String) -> Result<Self, DomainError> {
        let currency = match currency.as_str() {
            "JPY" => Currency::JPY,
            _ => {
                return Err(DomainError::InvalidValue(format!(
                    "サポートされていない通貨: {}",
                    currency
                )))
            }
        };
        Ok(Self { amount, currency })
    }

    /// 日本円の金額を作成
    pub fn jpy(amount: i64) -> Self {
        Self {
            amount,
            currency: Currency::JPY,
        }
    }

    /// 金額を取得
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// 通貨を文字列として取得
    pub fn currency(&self) -> String {
        match self.currency {
            Currency::JPY => "JPY".to_string(),
        }
    }

    /// 金額を加算
    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch);
        }
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// 金額を乗算
    pub fn multiply(&self, factor: u32) -> Money {
        Money {
            amount: self.amount * factor as i64,
            currency: self.currency,
        }
    }
}

/// 宿泊期間を表す値オブジェクト
/// チェックアウト日は排他的（チェックアウト日の夜は在庫を消費しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    /// 新しい宿泊期間を作成
    /// チェックアウト日はチェックイン日より後である必要がある（最低1泊）
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, DomainError> {
        if check_out <= check_in {
            return Err(DomainError::InvalidRequest(
                "チェックアウト日はチェックイン日より後である必要があります".to_string(),
            ));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// チェックイン日を取得
    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    /// チェックアウト日を取得（排他的）
    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// 泊数を取得
    pub fn night_count(&self) -> u32 {
        (self.check_out - self.check_in).num_days() as u32
    }

    /// 在庫を消費する全日付を列挙する
    /// `[check_in, check_out)` の各日付が1泊に対応する
    pub fn nights(&self) -> Vec<NaiveDate> {
        (0..self.night_count() as i64)
            .map(|offset| self.check_in + Duration::days(offset))
            .collect()
    }
}

impl fmt::Display for StayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 〜 {}", self.check_in, self.check_out)
    }
}

/// 予約のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    /// 確定済み（在庫予約済み、初期状態）
    Confirmed,
    /// キャンセル済み（終端状態）
    Cancelled,
    /// チェックイン済み
    CheckedIn,
    /// チェックアウト済み（終端状態）
    CheckedOut,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::CheckedIn => "CheckedIn",
            BookingStatus::CheckedOut => "CheckedOut",
        };
        write!(f, "{}", status_str)
    }
}

impl BookingStatus {
    /// 文字列からBookingStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            "CheckedIn" => Ok(BookingStatus::CheckedIn),
            "CheckedOut" => Ok(BookingStatus::CheckedOut),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な予約ステータス: {}",
                s
            ))),
        }
    }

    /// 終端状態（これ以上の遷移が許可されない状態）かどうか
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::CheckedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_booking_id_creation() {
        let id1 = BookingId::new();
        let id2 = BookingId::new();
        assert_ne!(id1, id2, "Each BookingId should be unique");
    }

    #[test]
    fn test_booking_id_from_string_round_trip() {
        let id = BookingId::new();
        let parsed = BookingId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_room_number_rejects_empty() {
        assert!(RoomNumber::new("101".to_string()).is_ok());
        assert!(RoomNumber::new("".to_string()).is_err());
        assert!(RoomNumber::new("   ".to_string()).is_err());
    }

    #[test]
    fn test_money_addition() {
        let money1 = Money::jpy(1000);
        let money2 = Money::jpy(500);
        let result = money1.add(&money2).unwrap();
        assert_eq!(result.amount(), 1500);
    }

    #[test]
    fn test_money_multiplication() {
        let money = Money::jpy(100);
        let result = money.multiply(5);
        assert_eq!(result.amount(), 500);
    }

    #[test]
    fn test_stay_range_night_count() {
        let stay = StayRange::new(date(2024, 6, 1), date(2024, 6, 3)).unwrap();
        assert_eq!(stay.night_count(), 2);
    }

    #[test]
    fn test_stay_range_nights_excludes_check_out() {
        let stay = StayRange::new(date(2024, 6, 1), date(2024, 6, 3)).unwrap();
        let nights = stay.nights();
        assert_eq!(nights, vec![date(2024, 6, 1), date(2024, 6, 2)]);
    }

    #[test]
    fn test_stay_range_zero_nights_rejected() {
        let result = StayRange::new(date(2024, 6, 10), date(2024, 6, 10));
        assert!(result.is_err());
    }

    #[test]
    fn test_stay_range_reversed_rejected() {
        let result = StayRange::new(date(2024, 6, 10), date(2024, 6, 9));
        assert!(result.is_err());
    }

    #[test]
    fn test_booking_status_from_string() {
        assert_eq!(
            BookingStatus::from_string("Confirmed").unwrap(),
            BookingStatus::Confirmed
        );
        assert_eq!(
            BookingStatus::from_string("CheckedIn").unwrap(),
            BookingStatus::CheckedIn
        );
        assert!(BookingStatus::from_string("Unknown").is_err());
    }

    #[test]
    fn test_booking_status_terminal_states() {
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert!(!BookingStatus::CheckedIn.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::CheckedOut.is_terminal());
    }
}
