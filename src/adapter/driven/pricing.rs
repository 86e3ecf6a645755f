use crate::domain::model::{Money, RoomTypeId, StayRange};
use crate::domain::port::{PricingError, PricingProvider};
use async_trait::async_trait;
use std::collections::HashMap;

/// 固定料金プロバイダー
/// 客室タイプごとに設定された1泊あたりの料金に宿泊数を掛けて合計金額を返す
/// 外部の料金サービスへの接続を持たない環境向けの実装
pub struct FlatRatePricingProvider {
    nightly_rates: HashMap<RoomTypeId, Money>,
    default_rate: Money,
}

impl FlatRatePricingProvider {
    /// 新しい固定料金プロバイダーを作成
    ///
    /// # Arguments
    /// * `default_rate` - 料金が登録されていない客室タイプに適用する1泊あたりの料金
    pub fn new(default_rate: Money) -> Self {
        Self {
            nightly_rates: HashMap::new(),
            default_rate,
        }
    }

    /// 客室タイプごとの1泊あたりの料金を登録
    pub fn with_rate(mut self, room_type_id: RoomTypeId, nightly_rate: Money) -> Self {
        self.nightly_rates.insert(room_type_id, nightly_rate);
        self
    }
}

#[async_trait]
impl PricingProvider for FlatRatePricingProvider {
    async fn price(
        &self,
        room_type_id: RoomTypeId,
        stay: &StayRange,
    ) -> Result<Money, PricingError> {
        let nightly_rate = self
            .nightly_rates
            .get(&room_type_id)
            .unwrap_or(&self.default_rate);

        Ok(nightly_rate.multiply(stay.night_count()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stay(nights: u64) -> StayRange {
        let check_in = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        StayRange::new(check_in, check_in + chrono::Duration::days(nights as i64)).unwrap()
    }

    #[tokio::test]
    async fn test_price_uses_registered_rate() {
        let room_type_id = RoomTypeId::new();
        let provider =
            FlatRatePricingProvider::new(Money::jpy(10000)).with_rate(room_type_id, Money::jpy(15000));

        let price = provider.price(room_type_id, &stay(3)).await.unwrap();
        assert_eq!(price, Money::jpy(45000));
    }

    #[tokio::test]
    async fn test_price_falls_back_to_default_rate() {
        let provider = FlatRatePricingProvider::new(Money::jpy(10000));

        let price = provider.price(RoomTypeId::new(), &stay(2)).await.unwrap();
        assert_eq!(price, Money::jpy(20000));
    }
}
