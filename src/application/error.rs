use crate::domain::error::DomainError;
use crate::domain::port::{PricingError, RepositoryError, StoreError};
use crate::domain::service::InventoryError;

/// アプリケーション層のエラー型
/// ドメインエラー、在庫調整エラー、永続化エラーをラップする
#[derive(Debug)]
pub enum ApplicationError {
    /// リクエストが不正（日付範囲、宿泊人数など）
    InvalidRequest(String),
    /// 在庫不足
    InsufficientInventory(String),
    /// 在庫レコードが見つからない
    InventoryNotFound(String),
    /// 予約が見つからない（所有者の不一致を含む）
    BookingNotFound(String),
    /// 予約の状態がこの操作を許可しない
    BookingConflict(String),
    /// 並行更新の競合がリトライ上限まで解消しなかった
    ConcurrentUpdateConflict(String),
    /// 料金プロバイダーが利用不可
    PricingUnavailable(String),
    /// リポジトリエラー（予約永続化の失敗）
    RepositoryError(RepositoryError),
    /// 在庫ストアエラー
    StoreError(StoreError),
}

impl std::fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApplicationError::InsufficientInventory(msg) => {
                write!(f, "Insufficient inventory: {}", msg)
            }
            ApplicationError::InventoryNotFound(msg) => {
                write!(f, "Inventory not found: {}", msg)
            }
            ApplicationError::BookingNotFound(msg) => write!(f, "Booking not found: {}", msg),
            ApplicationError::BookingConflict(msg) => write!(f, "Booking conflict: {}", msg),
            ApplicationError::ConcurrentUpdateConflict(msg) => {
                write!(f, "Concurrent update conflict: {}", msg)
            }
            ApplicationError::PricingUnavailable(msg) => {
                write!(f, "Pricing unavailable: {}", msg)
            }
            ApplicationError::RepositoryError(err) => write!(f, "Repository error: {}", err),
            ApplicationError::StoreError(err) => write!(f, "Store error: {}", err),
        }
    }
}

impl std::error::Error for ApplicationError {}

// From実装でエラー変換を簡潔に
impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidRequest(msg) => ApplicationError::InvalidRequest(msg),
            DomainError::InsufficientInventory => {
                ApplicationError::InsufficientInventory("insufficient inventory".to_string())
            }
            DomainError::BookingConflict(msg) => ApplicationError::BookingConflict(msg),
            DomainError::CurrencyMismatch => {
                ApplicationError::InvalidRequest("currency mismatch".to_string())
            }
            DomainError::InvalidValue(msg) => ApplicationError::InvalidRequest(msg),
        }
    }
}

impl From<InventoryError> for ApplicationError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::InventoryNotFound { .. } => {
                ApplicationError::InventoryNotFound(err.to_string())
            }
            InventoryError::InsufficientInventory { .. } => {
                ApplicationError::InsufficientInventory(err.to_string())
            }
            InventoryError::ConflictRetriesExhausted { .. } => {
                ApplicationError::ConcurrentUpdateConflict(err.to_string())
            }
            InventoryError::Store(store_err) => ApplicationError::StoreError(store_err),
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::VersionConflict => {
                ApplicationError::ConcurrentUpdateConflict(err.to_string())
            }
            _ => ApplicationError::RepositoryError(err),
        }
    }
}

impl From<StoreError> for ApplicationError {
    fn from(err: StoreError) -> Self {
        ApplicationError::StoreError(err)
    }
}

impl From<PricingError> for ApplicationError {
    fn from(err: PricingError) -> Self {
        ApplicationError::PricingUnavailable(err.to_string())
    }
}
