use std::time::Duration;

/// 楽観的ロック競合に対する有界リトライポリシー
/// 在庫レコードごとのcompare-and-swapと予約行の永続化に一様に適用される
/// 試行回数を使い切った競合はビジネスルール違反とは別のエラーとして表面化する
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大試行回数（初回を含む）
    max_attempts: u32,
    /// 初回リトライまでの待機時間
    initial_delay: Duration,
    /// 待機時間の倍率
    multiplier: u32,
}

impl Default for RetryPolicy {
    /// 3回試行、初期待機100ms、倍率2（待機は100ms、200msの順）
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// 新しいリトライポリシーを作成
    pub fn new(max_attempts: u32, initial_delay: Duration, multiplier: u32) -> Self {
        Self {
            max_attempts,
            initial_delay,
            multiplier,
        }
    }

    /// テスト用: 待機なしのポリシー
    pub fn without_delay(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// 最大試行回数を取得
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 指定された試行の失敗後に待機すべき時間を計算する
    /// attempt は1始まり（1回目の失敗後は initial_delay）
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }

    /// 指定された試行が最後の試行かどうか
    pub fn is_last_attempt(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}
