//! 엔진 수치 불변식 속성 테스트.
//!
//! 임의 가격 시계열에 대해 자본 보존, 낙폭 상한, 승/패 분류,
//! 단일 포지션 불변식을 검증합니다.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use signal_core::{FixedPerturbation, PricePoint};
use signal_engine::{BacktestConfig, BacktestEngine, ExitReason, TradeOutcome};

const HOUR_MILLIS: i64 = 3_600_000;

/// 센트 단위 정수로 가격을 생성해 Decimal 연산을 정확하게 유지합니다.
fn price_series_strategy() -> impl Strategy<Value = Vec<PricePoint>> {
    prop::collection::vec(1_000i64..10_000_000, 2..120).prop_map(|cents| {
        cents
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint::new(i as i64 * HOUR_MILLIS, Decimal::new(*c, 2)))
            .collect()
    })
}

fn test_config() -> BacktestConfig {
    // 낮은 임계값 + 높은 섭동으로 거래가 실제로 발생하도록 유도
    BacktestConfig::new(dec!(10000))
        .with_entry_threshold(75)
        .with_investment_ratio(dec!(40))
        .with_multipliers(dec!(1.03), dec!(0.97))
}

proptest! {
    /// 자본 보존: 최종 자본 = 초기 자본 + 모든 거래 손익의 합.
    ///
    /// 강제 청산이 원장에 기록되므로 실행 종료 시 모든 가치 이동이
    /// 거래로 설명되어야 합니다. 수량 계산의 나눗셈이 28자리에서
    /// 반올림되므로 1e-18 허용 오차로 비교합니다.
    #[test]
    fn capital_is_conserved(prices in price_series_strategy()) {
        let engine = BacktestEngine::new(test_config());
        let mut stub = FixedPerturbation(10.0);
        let report = engine.run(&prices, &mut stub).unwrap();

        let pnl_sum: Decimal = report.trades.iter().map(|t| t.pnl_absolute).sum();
        let residue = (report.summary.final_capital - (dec!(10000) + pnl_sum)).abs();
        prop_assert!(residue <= dec!(0.000000000000000001), "residue = {}", residue);
    }

    /// 최대 낙폭은 곡선에서 재계산한 모든 틱별 낙폭 이상이어야 합니다.
    #[test]
    fn max_drawdown_bounds_every_tick(prices in price_series_strategy()) {
        let engine = BacktestEngine::new(test_config());
        let mut stub = FixedPerturbation(10.0);
        let report = engine.run(&prices, &mut stub).unwrap();

        let mut running_max = Decimal::ZERO;
        for point in &report.equity_curve {
            if point.total_equity > running_max {
                running_max = point.total_equity;
            }
            if running_max > Decimal::ZERO {
                let drawdown = (running_max - point.total_equity) / running_max
                    * Decimal::ONE_HUNDRED;
                prop_assert!(report.summary.max_drawdown_pct >= drawdown);
            }
        }
    }

    /// 승/패 분류는 청산 사유와 일치해야 합니다.
    #[test]
    fn outcome_matches_exit_reason(prices in price_series_strategy()) {
        let config = test_config();
        let engine = BacktestEngine::new(config.clone());
        let mut stub = FixedPerturbation(10.0);
        let report = engine.run(&prices, &mut stub).unwrap();

        for trade in &report.trades {
            match trade.exit_reason {
                ExitReason::TargetHit => {
                    prop_assert_eq!(trade.outcome, TradeOutcome::Win);
                    prop_assert!(
                        trade.exit_price >= trade.entry_price * config.target_multiplier
                    );
                }
                ExitReason::StopHit => {
                    prop_assert_eq!(trade.outcome, TradeOutcome::Loss);
                    prop_assert!(
                        trade.exit_price <= trade.entry_price * config.stop_loss_multiplier
                    );
                }
                ExitReason::EndOfData => {
                    let expected = if trade.exit_price >= trade.entry_price {
                        TradeOutcome::Win
                    } else {
                        TradeOutcome::Loss
                    };
                    prop_assert_eq!(trade.outcome, expected);
                }
            }
        }
    }

    /// 동시 보유 포지션 ≤ 1: 거래 구간은 서로 겹치지 않습니다.
    #[test]
    fn at_most_one_open_position(prices in price_series_strategy()) {
        let engine = BacktestEngine::new(test_config());
        let mut stub = FixedPerturbation(10.0);
        let report = engine.run(&prices, &mut stub).unwrap();

        for pair in report.trades.windows(2) {
            prop_assert!(pair[1].entry_timestamp >= pair[0].exit_timestamp);
        }

        // EndOfData 거래는 마지막에 최대 1개
        let eod_count = report
            .trades
            .iter()
            .filter(|t| t.exit_reason == ExitReason::EndOfData)
            .count();
        prop_assert!(eod_count <= 1);
        if eod_count == 1 {
            prop_assert_eq!(
                report.trades.last().unwrap().exit_reason,
                ExitReason::EndOfData
            );
        }
    }

    /// 자산 곡선은 틱당 1포인트, timestamp 비감소.
    #[test]
    fn equity_curve_aligned_with_input(prices in price_series_strategy()) {
        let engine = BacktestEngine::new(test_config());
        let mut stub = FixedPerturbation(10.0);
        let report = engine.run(&prices, &mut stub).unwrap();

        prop_assert_eq!(report.equity_curve.len(), prices.len());
        for (point, price) in report.equity_curve.iter().zip(prices.iter()) {
            prop_assert_eq!(point.timestamp, price.timestamp);
        }
    }
}
