use chrono::{Duration, NaiveDate};
use hotel_booking_management::domain::model::{InventoryRecord, Money, RoomTypeId, StayRange};
use hotel_booking_management::domain::retry::RetryPolicy;
use proptest::prelude::*;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

// Money のプロパティベーステスト
proptest! {
    /// Money の加算は交換法則を満たす (a + b = b + a)
    #[test]
    fn test_money_addition_is_commutative(
        amount1 in 0i64..1_000_000,
        amount2 in 0i64..1_000_000,
    ) {
        let money1 = Money::jpy(amount1);
        let money2 = Money::jpy(amount2);

        let result1 = money1.add(&money2).unwrap();
        let result2 = money2.add(&money1).unwrap();

        prop_assert_eq!(result1, result2);
    }

    /// Money の乗算は分配法則を満たす (a * (b + c) = a * b + a * c)
    #[test]
    fn test_money_multiplication_distributive(
        base_amount in 1i64..10_000,
        factor1 in 1u32..100,
        factor2 in 1u32..100,
    ) {
        let money = Money::jpy(base_amount);

        let left_side = money.multiply(factor1 + factor2);
        let right_side = money.multiply(factor1).add(&money.multiply(factor2)).unwrap();

        prop_assert_eq!(left_side, right_side);
    }

    /// 1泊あたりの料金に宿泊数を掛けた金額は泊数に対して単調増加する
    #[test]
    fn test_money_total_price_monotonic_in_nights(
        nightly_rate in 1i64..100_000,
        nights in 1u32..30,
    ) {
        let rate = Money::jpy(nightly_rate);

        prop_assert!(rate.multiply(nights + 1).amount() > rate.multiply(nights).amount());
    }
}

// StayRange のプロパティベーステスト
proptest! {
    /// 宿泊期間の泊数はチェックアウト日とチェックイン日の差と等しい
    #[test]
    fn test_stay_range_night_count(
        start_offset in 0i64..1000,
        nights in 1i64..365,
    ) {
        let check_in = base_date() + Duration::days(start_offset);
        let check_out = check_in + Duration::days(nights);
        let stay = StayRange::new(check_in, check_out).unwrap();

        prop_assert_eq!(stay.night_count() as i64, nights);
    }

    /// 宿泊する夜のリストはチェックイン日を含みチェックアウト日を含まない
    #[test]
    fn test_stay_range_nights_are_half_open(
        start_offset in 0i64..1000,
        nights in 1i64..365,
    ) {
        let check_in = base_date() + Duration::days(start_offset);
        let check_out = check_in + Duration::days(nights);
        let stay = StayRange::new(check_in, check_out).unwrap();

        let night_dates = stay.nights();
        prop_assert_eq!(night_dates.len() as i64, nights);
        prop_assert_eq!(night_dates.first().copied(), Some(check_in));
        prop_assert!(night_dates.iter().all(|d| *d < check_out));
    }

    /// 宿泊する夜は連続していて重複しない
    #[test]
    fn test_stay_range_nights_are_consecutive(
        start_offset in 0i64..1000,
        nights in 1i64..365,
    ) {
        let check_in = base_date() + Duration::days(start_offset);
        let check_out = check_in + Duration::days(nights);
        let stay = StayRange::new(check_in, check_out).unwrap();

        let night_dates = stay.nights();
        for pair in night_dates.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
    }

    /// チェックアウト日がチェックイン日以前の宿泊期間は作成できない
    #[test]
    fn test_stay_range_rejects_non_positive_length(
        start_offset in 0i64..1000,
        negative_nights in 0i64..100,
    ) {
        let check_in = base_date() + Duration::days(start_offset);
        let check_out = check_in - Duration::days(negative_nights);

        prop_assert!(StayRange::new(check_in, check_out).is_err());
    }
}

// InventoryRecord のプロパティベーステスト
proptest! {
    /// 予約してから解放すると空室数は元に戻る
    #[test]
    fn test_inventory_reserve_then_release_restores_units(
        available in 0u32..1000,
        units in 0u32..1000,
    ) {
        let mut record = InventoryRecord::new(RoomTypeId::new(), base_date(), available);

        if record.reserve(units).is_ok() {
            record.release(units);
            prop_assert_eq!(record.available_units(), available);
        } else {
            // 在庫不足での失敗は空室数を変更しない
            prop_assert_eq!(record.available_units(), available);
        }
    }

    /// 予約は空室数が足りる場合のみ成功する
    #[test]
    fn test_inventory_reserve_succeeds_iff_capacity(
        available in 0u32..1000,
        units in 0u32..1000,
    ) {
        let mut record = InventoryRecord::new(RoomTypeId::new(), base_date(), available);

        let result = record.reserve(units);
        if units <= available {
            prop_assert!(result.is_ok());
            prop_assert_eq!(record.available_units(), available - units);
        } else {
            prop_assert!(result.is_err());
        }
    }
}

// RetryPolicy のプロパティベーステスト
proptest! {
    /// バックオフ遅延は試行ごとに倍率どおり増加する
    #[test]
    fn test_retry_backoff_grows_by_multiplier(
        initial_ms in 1u64..1000,
        multiplier in 2u32..5,
        attempt in 1u32..8,
    ) {
        let policy = RetryPolicy::new(10, std::time::Duration::from_millis(initial_ms), multiplier);

        let current = policy.backoff_delay(attempt);
        let next = policy.backoff_delay(attempt + 1);

        prop_assert_eq!(next, current * multiplier);
    }

    /// 最終試行の判定は最大試行回数と一致する
    #[test]
    fn test_retry_last_attempt_boundary(max_attempts in 1u32..10) {
        let policy = RetryPolicy::without_delay(max_attempts);

        prop_assert!(!policy.is_last_attempt(max_attempts - 1));
        prop_assert!(policy.is_last_attempt(max_attempts));
        prop_assert!(policy.is_last_attempt(max_attempts + 1));
    }
}
