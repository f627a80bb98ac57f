//! 통계 집계기.
//!
//! 거래 원장과 자산 곡선으로부터 요약 지표와 월별 수익률을
//! 계산하는 순수 함수 모음입니다. 원장은 항상 전체 정밀도로
//! 유지되며, 표시용 절단(최근 50건, ~100 포인트 샘플링)은
//! 직렬화 경계에서만 적용합니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::position::{Trade, TradeOutcome};

/// 자산 곡선의 단일 포인트.
///
/// 리샘플링 이후의 입력 가격 포인트당 1개 생성됩니다.
/// `total_equity`는 해당 틱 처리 후의 `현금 + 보유 포지션 평가액`입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct EquityPoint {
    /// 틱 시각 (epoch millis)
    pub timestamp: i64,
    /// 총 자산
    pub total_equity: Decimal,
}

/// 월별 수익률 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct MonthlyReturn {
    /// 월 키 (UTC, "YYYY-MM")
    pub month: String,
    /// 직전 월 마지막 자산 대비 수익률 (%)
    pub return_pct: Decimal,
}

/// 백테스트 요약 지표.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct BacktestSummary {
    /// 총 거래 수
    pub total_trades: usize,
    /// 승리 거래 수
    pub wins: usize,
    /// 패배 거래 수
    pub losses: usize,
    /// 승률 (%)
    pub win_rate_pct: Decimal,
    /// 총 수익률 (%)
    pub total_return_pct: Decimal,
    /// 승리 거래 평균 수익률 (%)
    pub avg_win_pct: Decimal,
    /// 패배 거래 평균 손실률 (%, 절대값)
    pub avg_loss_pct: Decimal,
    /// 프로핏 팩터 (패배 거래가 없으면 avg_win_pct 그대로)
    pub profit_factor: Decimal,
    /// 최대 낙폭 (%)
    pub max_drawdown_pct: Decimal,
    /// 초기 자본
    pub initial_capital: Decimal,
    /// 최종 자본
    pub final_capital: Decimal,
}

impl BacktestSummary {
    /// 거래 원장에서 요약 지표를 계산합니다.
    pub fn compute(
        trades: &[Trade],
        initial_capital: Decimal,
        final_capital: Decimal,
        max_drawdown_pct: Decimal,
    ) -> Self {
        let total_trades = trades.len();
        let wins = trades
            .iter()
            .filter(|t| t.outcome == TradeOutcome::Win)
            .count();
        let losses = total_trades - wins;

        let win_rate_pct = if total_trades > 0 {
            Decimal::from(wins) / Decimal::from(total_trades) * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        let total_return_pct = if initial_capital.is_zero() {
            Decimal::ZERO
        } else {
            (final_capital - initial_capital) / initial_capital * Decimal::ONE_HUNDRED
        };

        let avg_win_pct = mean_pnl_pct(trades, TradeOutcome::Win);
        // 패배 거래는 절대값 평균
        let avg_loss_pct = mean_pnl_pct(trades, TradeOutcome::Loss).abs();

        // 패배 거래가 없으면 비율이 정의되지 않으므로 avg_win_pct로 수렴
        let profit_factor = if losses > 0 && !avg_loss_pct.is_zero() {
            avg_win_pct / avg_loss_pct
        } else {
            avg_win_pct
        };

        Self {
            total_trades,
            wins,
            losses,
            win_rate_pct,
            total_return_pct,
            avg_win_pct,
            avg_loss_pct,
            profit_factor,
            max_drawdown_pct,
            initial_capital,
            final_capital,
        }
    }
}

fn mean_pnl_pct(trades: &[Trade], outcome: TradeOutcome) -> Decimal {
    let matching: Vec<Decimal> = trades
        .iter()
        .filter(|t| t.outcome == outcome)
        .map(|t| t.pnl_percent)
        .collect();

    if matching.is_empty() {
        Decimal::ZERO
    } else {
        matching.iter().sum::<Decimal>() / Decimal::from(matching.len())
    }
}

/// 자산 곡선을 UTC 달력 월로 분할해 월별 수익률을 계산합니다.
///
/// 각 월의 마지막 관측 자산을 기준으로, 직전 월 대비 변화율을
/// 기록합니다. 처음 등장한 월은 기준선만 수립하고 행을 만들지
/// 않습니다 (월이 N개면 행은 N-1개).
pub fn monthly_returns(equity_curve: &[EquityPoint]) -> Vec<MonthlyReturn> {
    // (월 키, 해당 월 마지막 자산) 순서 보존 수집
    let mut month_closes: Vec<(String, Decimal)> = Vec::new();

    for point in equity_curve {
        let key = month_key(point.timestamp);
        match month_closes.last_mut() {
            Some((last_key, last_equity)) if *last_key == key => {
                *last_equity = point.total_equity;
            }
            _ => month_closes.push((key, point.total_equity)),
        }
    }

    month_closes
        .windows(2)
        .filter_map(|pair| {
            let (_, prev_equity) = &pair[0];
            let (month, equity) = &pair[1];
            if prev_equity.is_zero() {
                return None;
            }
            Some(MonthlyReturn {
                month: month.clone(),
                return_pct: (*equity - *prev_equity) / *prev_equity * Decimal::ONE_HUNDRED,
            })
        })
        .collect()
}

fn month_key(timestamp_millis: i64) -> String {
    let dt: DateTime<Utc> = DateTime::from_timestamp_millis(timestamp_millis)
        .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC);
    dt.format("%Y-%m").to_string()
}

/// 자산 곡선을 ~`target` 개의 균등 간격 포인트로 다운샘플링합니다.
///
/// 표시 전용 헬퍼입니다. 곡선이 이미 `target` 이하면 그대로
/// 반환하고, 그렇지 않으면 처음과 마지막 포인트를 포함한
/// 균등 간격 부분 수열을 고릅니다.
pub fn downsample_equity(equity_curve: &[EquityPoint], target: usize) -> Vec<EquityPoint> {
    if target < 2 || equity_curve.len() <= target {
        return equity_curve.to_vec();
    }

    let last_index = equity_curve.len() - 1;
    let mut sampled = Vec::with_capacity(target);
    let mut previous_index = usize::MAX;

    for i in 0..target {
        let index = i * last_index / (target - 1);
        if index != previous_index {
            sampled.push(equity_curve[index].clone());
            previous_index = index;
        }
    }

    sampled
}
