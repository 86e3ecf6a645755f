/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 無効なリクエスト（例: 日付ルール違反）
    InvalidRequest(String),
    /// 在庫不足
    InsufficientInventory,
    /// 予約の状態遷移違反（例: キャンセル済みの予約をチェックインしようとした）
    BookingConflict(String),
    /// 通貨の不一致
    CurrencyMismatch,
    /// 無効な値
    InvalidValue(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            DomainError::InsufficientInventory => write!(f, "Insufficient inventory"),
            DomainError::BookingConflict(msg) => write!(f, "Booking conflict: {}", msg),
            DomainError::CurrencyMismatch => write!(f, "Currency mismatch"),
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
