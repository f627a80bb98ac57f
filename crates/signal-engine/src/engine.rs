//! 백테스트 엔진.
//!
//! 가격 시계열에 대해 체크리스트 점수 기반 진입/청산 규칙을
//! 틱 단위로 평가합니다.
//!
//! # 실행 모델
//!
//! 전체 시뮬레이션은 메모리 내 배열에 대한 단일 동기 순방향
//! 패스입니다. 실행마다 새 지역 상태로 시작하므로 동시 호출 간
//! 잠금이 필요 없습니다.
//!
//! # 틱 처리 순서
//!
//! 1. 청산 판정 (목표가 → 손절가 순서, 같은 틱에서 진입+청산 불가)
//! 2. 진입 판정 (FLAT이고 이력 5포인트 이상일 때 점수 평가)
//! 3. 자산/낙폭 기록 (포지션 유무와 무관하게 매 틱)
//!
//! 시계열 종료 시 미청산 포지션은 마지막 가격으로 강제 청산되고
//! `ExitReason::EndOfData` 거래로 원장에 기록됩니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use signal_core::{checklist_score, PerturbationSource, PricePoint, Timeframe, SCORE_MAX, SCORE_MIN};

use crate::position::{ExitReason, OpenPosition, PositionState, Trade};
use crate::stats::{monthly_returns, BacktestSummary, EquityPoint, MonthlyReturn};

/// 진입 판정에 필요한 최소 누적 이력 포인트 수.
pub const MIN_HISTORY_FOR_ENTRY: usize = 5;

/// 백테스트 오류.
#[derive(Debug, Error)]
pub enum BacktestError {
    /// 설정 오류
    #[error("백테스트 설정 오류: {0}")]
    ConfigError(String),
}

/// 백테스트 결과 타입.
pub type BacktestResult<T> = Result<T, BacktestError>;

/// 백테스트 설정.
///
/// 실행당 1회 주어지며 이후 변경되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct BacktestConfig {
    /// 초기 자본금
    #[serde(default = "default_initial_capital")]
    pub initial_capital: Decimal,

    /// 진입 점수 임계값 (40 ~ 140)
    #[serde(default = "default_entry_threshold")]
    pub entry_threshold: i32,

    /// 진입 시 투자 비율 (%, 예: 30 = 자본의 30%)
    #[serde(default = "default_investment_ratio")]
    pub investment_ratio_pct: Decimal,

    /// 목표가 배수 (예: 1.05 = +5%)
    #[serde(default = "default_target_multiplier")]
    pub target_multiplier: Decimal,

    /// 손절가 배수 (예: 0.97 = -3%)
    #[serde(default = "default_stop_loss_multiplier")]
    pub stop_loss_multiplier: Decimal,

    /// 타임프레임
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
}

fn default_initial_capital() -> Decimal {
    Decimal::new(10_000, 0)
}
fn default_entry_threshold() -> i32 {
    105
}
fn default_investment_ratio() -> Decimal {
    Decimal::new(30, 0)
}
fn default_target_multiplier() -> Decimal {
    Decimal::new(105, 2)
} // 1.05
fn default_stop_loss_multiplier() -> Decimal {
    Decimal::new(97, 2)
} // 0.97
fn default_timeframe() -> Timeframe {
    Timeframe::H1
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: default_initial_capital(),
            entry_threshold: default_entry_threshold(),
            investment_ratio_pct: default_investment_ratio(),
            target_multiplier: default_target_multiplier(),
            stop_loss_multiplier: default_stop_loss_multiplier(),
            timeframe: default_timeframe(),
        }
    }
}

impl BacktestConfig {
    /// 초기 자본으로 새 설정을 생성합니다.
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            initial_capital,
            ..Default::default()
        }
    }

    /// 진입 임계값 설정.
    pub fn with_entry_threshold(mut self, threshold: i32) -> Self {
        self.entry_threshold = threshold;
        self
    }

    /// 투자 비율 설정.
    pub fn with_investment_ratio(mut self, pct: Decimal) -> Self {
        self.investment_ratio_pct = pct;
        self
    }

    /// 목표가/손절가 배수 설정.
    pub fn with_multipliers(mut self, target: Decimal, stop_loss: Decimal) -> Self {
        self.target_multiplier = target;
        self.stop_loss_multiplier = stop_loss;
        self
    }

    /// 타임프레임 설정.
    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = timeframe;
        self
    }

    /// 설정 검증.
    pub fn validate(&self) -> BacktestResult<()> {
        if self.initial_capital <= Decimal::ZERO {
            return Err(BacktestError::ConfigError(
                "초기 자본은 0보다 커야 합니다".to_string(),
            ));
        }
        if self.entry_threshold < SCORE_MIN || self.entry_threshold > SCORE_MAX {
            return Err(BacktestError::ConfigError(format!(
                "진입 임계값은 {} ~ {} 범위여야 합니다",
                SCORE_MIN, SCORE_MAX
            )));
        }
        if self.investment_ratio_pct <= Decimal::ZERO
            || self.investment_ratio_pct > Decimal::ONE_HUNDRED
        {
            return Err(BacktestError::ConfigError(
                "투자 비율은 0 초과 100 이하여야 합니다".to_string(),
            ));
        }
        if self.target_multiplier <= Decimal::ONE {
            return Err(BacktestError::ConfigError(
                "목표가 배수는 1보다 커야 합니다".to_string(),
            ));
        }
        if self.stop_loss_multiplier <= Decimal::ZERO || self.stop_loss_multiplier >= Decimal::ONE {
            return Err(BacktestError::ConfigError(
                "손절가 배수는 0과 1 사이여야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}

/// 백테스트 실행 결과.
///
/// 거래 원장과 자산 곡선은 전체 정밀도로 담깁니다.
/// 표시용 절단은 호출자(API 직렬화 경계)의 몫입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct BacktestReport {
    /// 실행 설정
    pub config: BacktestConfig,
    /// 요약 지표
    pub summary: BacktestSummary,
    /// 전체 거래 원장 (시간순)
    pub trades: Vec<Trade>,
    /// 전체 자산 곡선 (틱당 1포인트)
    pub equity_curve: Vec<EquityPoint>,
    /// 월별 수익률
    pub monthly_returns: Vec<MonthlyReturn>,
    /// 시뮬레이션에 투입된 가격 포인트 수
    pub data_points: usize,
}

/// 백테스트 엔진.
///
/// 포지션 슬롯은 1개이며 상태 전이는 `PositionState`로 표현됩니다.
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    /// 새 엔진을 생성합니다.
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    /// 설정 참조.
    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// 시뮬레이션을 실행합니다.
    ///
    /// `prices`는 timestamp 오름차순이어야 하며 (공급자 계약),
    /// 2포인트 미만의 시계열은 거래 없는 no-op 실행으로 처리됩니다.
    pub fn run(
        &self,
        prices: &[PricePoint],
        perturbation: &mut dyn PerturbationSource,
    ) -> BacktestResult<BacktestReport> {
        self.config.validate()?;

        let mut capital = self.config.initial_capital;
        let mut state = PositionState::Flat;
        let mut history: Vec<Decimal> = Vec::with_capacity(prices.len());
        let mut trades: Vec<Trade> = Vec::new();
        let mut equity_curve: Vec<EquityPoint> = Vec::with_capacity(prices.len());

        let mut max_equity = Decimal::ZERO;
        let mut max_drawdown_pct = Decimal::ZERO;

        for (i, point) in prices.iter().enumerate() {
            let price = point.price;
            history.push(price);

            // 1. 청산 판정 — 목표가가 손절가보다 우선 (갭 이동 재현성)
            if let PositionState::Long(position) = &state {
                let exit_reason = if price >= position.target_price {
                    Some(ExitReason::TargetHit)
                } else if price <= position.stop_loss {
                    Some(ExitReason::StopHit)
                } else {
                    None
                };

                if let Some(reason) = exit_reason {
                    capital += position.amount * price;
                    trades.push(Trade::from_close(position, price, point.timestamp, reason));
                    state = PositionState::Flat;
                }
            }

            // 2. 진입 판정 — 같은 틱에서 진입+청산이 불가능하도록 청산 이후 평가
            if !state.is_open()
                && i > 0
                && history.len() >= MIN_HISTORY_FOR_ENTRY
                && price > Decimal::ZERO
            {
                let score = checklist_score(price, prices[i - 1].price, &history, perturbation);

                if score >= self.config.entry_threshold {
                    let invested =
                        capital * self.config.investment_ratio_pct / Decimal::ONE_HUNDRED;
                    let amount = invested / price;
                    capital -= invested;

                    state = PositionState::Long(OpenPosition {
                        entry_price: price,
                        target_price: price * self.config.target_multiplier,
                        stop_loss: price * self.config.stop_loss_multiplier,
                        amount,
                        entry_timestamp: point.timestamp,
                        score_at_entry: score,
                    });
                }
            }

            // 3. 자산/낙폭 기록 — 포지션 유무와 무관하게 매 틱
            let position_value = match &state {
                PositionState::Long(position) => position.amount * price,
                PositionState::Flat => Decimal::ZERO,
            };
            let equity = capital + position_value;

            if equity > max_equity {
                max_equity = equity;
            }
            if max_equity > Decimal::ZERO {
                let drawdown = (max_equity - equity) / max_equity * Decimal::ONE_HUNDRED;
                if drawdown > max_drawdown_pct {
                    max_drawdown_pct = drawdown;
                }
            }

            equity_curve.push(EquityPoint {
                timestamp: point.timestamp,
                total_equity: equity,
            });
        }

        // 시계열 종료: 미청산 포지션 강제 청산 (EndOfData 거래로 기록)
        if let PositionState::Long(position) = &state {
            let last = prices[prices.len() - 1];
            capital += position.amount * last.price;
            trades.push(Trade::from_close(
                position,
                last.price,
                last.timestamp,
                ExitReason::EndOfData,
            ));
            debug!(
                exit_price = %last.price,
                "시계열 종료, 미청산 포지션 강제 청산"
            );
        }

        let summary = BacktestSummary::compute(
            &trades,
            self.config.initial_capital,
            capital,
            max_drawdown_pct,
        );
        let monthly = monthly_returns(&equity_curve);

        debug!(
            data_points = prices.len(),
            trades = trades.len(),
            final_capital = %capital,
            "백테스트 완료"
        );

        Ok(BacktestReport {
            config: self.config.clone(),
            summary,
            trades,
            equity_curve,
            monthly_returns: monthly,
            data_points: prices.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use signal_core::FixedPerturbation;

    fn series(prices: &[(i64, Decimal)]) -> Vec<PricePoint> {
        prices
            .iter()
            .map(|(h, p)| PricePoint::new(h * 3_600_000, *p))
            .collect()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BacktestConfig::new(dec!(-1));
        assert!(config.validate().is_err());

        let config = BacktestConfig::default().with_multipliers(dec!(0.9), dec!(0.97));
        assert!(config.validate().is_err());

        let config = BacktestConfig::default().with_entry_threshold(30);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_degenerate_series_is_noop() {
        let engine = BacktestEngine::new(BacktestConfig::default());
        let mut stub = FixedPerturbation(0.0);

        let empty = engine.run(&[], &mut stub).unwrap();
        assert!(empty.trades.is_empty());
        assert!(empty.equity_curve.is_empty());
        assert_eq!(empty.summary.final_capital, dec!(10000));

        let single = engine
            .run(&series(&[(0, dec!(100))]), &mut stub)
            .unwrap();
        assert!(single.trades.is_empty());
        assert_eq!(single.equity_curve.len(), 1);
        assert_eq!(single.equity_curve[0].total_equity, dec!(10000));
    }

    #[test]
    fn test_equity_curve_one_point_per_tick() {
        let engine = BacktestEngine::new(BacktestConfig::default());
        let mut stub = FixedPerturbation(0.0);

        let prices = series(&[
            (0, dec!(100)),
            (1, dec!(101)),
            (2, dec!(102)),
            (3, dec!(101)),
            (4, dec!(103)),
        ]);
        let report = engine.run(&prices, &mut stub).unwrap();
        assert_eq!(report.equity_curve.len(), prices.len());
        assert_eq!(report.data_points, prices.len());
    }

    #[test]
    fn test_no_entry_below_threshold_preserves_capital() {
        // 임계값 140은 고정 섭동 0으로는 도달 불가
        let config = BacktestConfig::new(dec!(10000)).with_entry_threshold(140);
        let engine = BacktestEngine::new(config);
        let mut stub = FixedPerturbation(0.0);

        let prices = series(&[
            (0, dec!(100)),
            (1, dec!(100)),
            (2, dec!(100)),
            (3, dec!(100)),
            (4, dec!(100)),
            (5, dec!(100)),
        ]);
        let report = engine.run(&prices, &mut stub).unwrap();

        assert!(report.trades.is_empty());
        assert_eq!(report.summary.final_capital, dec!(10000));
        assert_eq!(report.summary.max_drawdown_pct, Decimal::ZERO);
    }
}
