// ドメイン層
// 予約・在庫のモデル、ポート、ドメインサービスを定義

pub mod error;
pub mod event;
pub mod model;
pub mod port;
pub mod retry;
pub mod serialization;
pub mod service;
