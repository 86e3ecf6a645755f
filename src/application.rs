// アプリケーション層
// ユースケースの実装とエラー変換を担当

pub mod error;
pub mod service;

pub use error::ApplicationError;
