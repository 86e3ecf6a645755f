// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::model::{Booking, BookingId, InventoryRecord, Money, RoomTypeId, StayRange};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// ロガートレイト
/// ログ出力を抽象化するポート
pub trait Logger: Send + Sync {
    /// デバッグレベルのログを出力
    fn debug(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 情報レベルのログを出力
    fn info(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 警告レベルのログを出力
    fn warn(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// エラーレベルのログを出力
    fn error(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );
}

/// 在庫ストアエラー型
/// VersionConflictは常にリトライ可能であり、呼び出し側単独では致命的ではない
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// 対象の在庫レコードが存在しない
    NotFound,
    /// 読み取りと書き込みの間に別の書き込みが割り込んだ（楽観的ロック競合）
    VersionConflict,
    /// ストア操作に失敗
    OperationFailed(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "Inventory record not found"),
            StoreError::VersionConflict => write!(f, "Version conflict"),
            StoreError::OperationFailed(msg) => write!(f, "Store operation failed: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// バージョン付き在庫ストアトレイト
/// (客室タイプ, 日付) → {空室数, バージョン} の永続マップを抽象化する
/// 提供される原子性は単一レコードのcompare-and-swapのみ
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// 在庫レコードを取得する
    ///
    /// # Returns
    /// * `Ok(Some(InventoryRecord))` - レコードが見つかった
    /// * `Ok(None)` - レコードが存在しない
    /// * `Err(StoreError)` - 取得失敗
    async fn get(
        &self,
        room_type_id: RoomTypeId,
        date: NaiveDate,
    ) -> Result<Option<InventoryRecord>, StoreError>;

    /// 空室数を楽観的compare-and-swapで書き換える
    /// 読み取り時のバージョンが一致した場合のみ書き込み、バージョンを1増加させる
    ///
    /// # Returns
    /// * `Ok(())` - 書き込み成功
    /// * `Err(StoreError::VersionConflict)` - 別の書き込みが先行した（リトライ可能）
    /// * `Err(StoreError::NotFound)` - レコードが存在しない
    async fn compare_and_swap(
        &self,
        room_type_id: RoomTypeId,
        date: NaiveDate,
        expected_version: u64,
        new_available_units: u32,
    ) -> Result<(), StoreError>;

    /// 期間内の全日付の在庫レコードを初期化する（冪等）
    /// レコードが存在しない日付のみ `available_units = total_rooms`、
    /// `version = 0` で作成し、既存レコードは上書きしない
    /// 期間は `[start_date, end_date)`
    async fn initialize_range(
        &self,
        room_type_id: RoomTypeId,
        total_rooms: u32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), StoreError>;

    /// 客室タイプの全在庫レコードを削除する（客室タイプ廃止時）
    async fn delete_all(&self, room_type_id: RoomTypeId) -> Result<(), StoreError>;
}

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryError {
    /// データベース接続に失敗
    ConnectionFailed(String),
    /// 操作に失敗
    OperationFailed(String),
    /// データの取得に失敗
    FetchFailed(String),
    /// 楽観的ロック競合（別の更新が先行した、リトライ可能）
    VersionConflict,
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
            RepositoryError::VersionConflict => write!(f, "Version conflict"),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// 予約リポジトリトレイト
/// 予約集約の永続化を抽象化する
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// 新しい予約を保存する
    ///
    /// # Returns
    /// * `Ok(())` - 保存成功
    /// * `Err(RepositoryError)` - 保存失敗
    async fn insert(&self, booking: &Booking) -> Result<(), RepositoryError>;

    /// 予約を楽観的ロック付きで更新する
    /// 集約のバージョンが永続化済みバージョンと一致した場合のみ更新し、
    /// バージョンを1増加させる
    ///
    /// # Returns
    /// * `Ok(())` - 更新成功
    /// * `Err(RepositoryError::VersionConflict)` - 別の更新が先行した（リトライ可能）
    async fn update(&self, booking: &Booking) -> Result<(), RepositoryError>;

    /// 予約IDで予約を検索する
    ///
    /// # Returns
    /// * `Ok(Some(Booking))` - 予約が見つかった
    /// * `Ok(None)` - 予約が見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError>;

    /// 新しい一意の予約IDを生成する
    fn next_identity(&self) -> BookingId;
}

/// 料金計算エラー
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Pricing unavailable: {0}")]
    Unavailable(String),
}

/// 料金プロバイダートレイト
/// 客室タイプと宿泊期間から合計金額を計算する外部コラボレーター
/// 予約作成ごとに1回、永続化の前に照会される
#[async_trait]
pub trait PricingProvider: Send + Sync {
    /// 宿泊の合計金額を計算する
    async fn price(&self, room_type_id: RoomTypeId, stay: &StayRange)
        -> Result<Money, PricingError>;
}

/// イベント発行エラー
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Event publishing failed: {0}")]
    PublishingFailed(String),
}

/// イベント発行者トレイト
/// 予約の事実（作成・キャンセル）を外部へ通知するポート
/// at-least-onceのfire-and-forget配信であり、発行失敗は
/// ログに記録されるのみで呼び出し元の処理を失敗させない
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// シリアライズ済みペイロードをトピックへ発行する
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError>;
}

/// 時計トレイト
/// 日付に依存するビジネスルールをテスト可能にするため注入される
pub trait Clock: Send + Sync {
    /// 今日の日付を取得
    fn today(&self) -> NaiveDate;

    /// 現在日時を取得
    fn now(&self) -> DateTime<Utc>;
}
