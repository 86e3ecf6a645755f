// ホテル予約管理システム
// 在庫予約と予約ライフサイクルのコアドメイン
// HTTP層などの外部インターフェースからインプロセスAPIとして利用される

pub mod adapter;
pub mod application;
pub mod domain;
