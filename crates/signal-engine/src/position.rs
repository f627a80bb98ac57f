//! 포지션 상태 기계와 거래 원장 타입.
//!
//! 시뮬레이터는 동시에 최대 1개의 포지션만 보유합니다.
//! nullable 필드 대신 태그드 열거형(`Flat | Long`)으로 표현해
//! 도달 가능한 상태와 전이를 명시적으로 만듭니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 청산 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub enum ExitReason {
    /// 목표가 도달
    TargetHit,
    /// 손절가 도달
    StopHit,
    /// 시계열 종료 시 강제 청산
    EndOfData,
}

/// 거래 결과 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub enum TradeOutcome {
    Win,
    Loss,
}

/// 보유 중인 롱 포지션.
///
/// 개설 이후 모든 필드는 불변입니다. 청산은 포지션을 소멸시키고
/// `Trade` 원장 항목을 생성합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct OpenPosition {
    /// 진입 가격
    pub entry_price: Decimal,
    /// 목표가 (`entry_price × target_multiplier`)
    pub target_price: Decimal,
    /// 손절가 (`entry_price × stop_loss_multiplier`)
    pub stop_loss: Decimal,
    /// 보유 수량 (자산 단위)
    pub amount: Decimal,
    /// 진입 시각 (epoch millis)
    pub entry_timestamp: i64,
    /// 진입 시점 체크리스트 점수
    pub score_at_entry: i32,
}

/// 단일 슬롯 포지션 상태.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    /// 포지션 없음
    #[default]
    Flat,
    /// 롱 포지션 보유 중
    Long(OpenPosition),
}

impl PositionState {
    /// 포지션 보유 여부.
    pub fn is_open(&self) -> bool {
        matches!(self, PositionState::Long(_))
    }
}

/// 체결 완료된 거래 (append-only 원장 항목).
///
/// 포지션 청산마다 정확히 1개 생성됩니다. 시계열 종료 시
/// 강제 청산된 포지션도 `ExitReason::EndOfData`로 기록되며,
/// 이때 outcome은 청산가가 진입가 이상인지로 분류됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Trade {
    /// 진입 시각 (epoch millis)
    pub entry_timestamp: i64,
    /// 청산 시각 (epoch millis)
    pub exit_timestamp: i64,
    /// 진입 가격
    pub entry_price: Decimal,
    /// 청산 가격
    pub exit_price: Decimal,
    /// 보유 수량
    pub amount: Decimal,
    /// 진입 시점 체크리스트 점수
    pub score_at_entry: i32,
    /// 절대 손익 (`amount × (exit - entry)`)
    pub pnl_absolute: Decimal,
    /// 손익률 (%)
    pub pnl_percent: Decimal,
    /// 승/패 분류
    pub outcome: TradeOutcome,
    /// 청산 사유
    pub exit_reason: ExitReason,
}

impl Trade {
    /// 포지션 청산으로부터 거래 기록을 생성합니다.
    pub fn from_close(
        position: &OpenPosition,
        exit_price: Decimal,
        exit_timestamp: i64,
        exit_reason: ExitReason,
    ) -> Self {
        let pnl_absolute = position.amount * (exit_price - position.entry_price);
        let pnl_percent = if position.entry_price.is_zero() {
            Decimal::ZERO
        } else {
            (exit_price - position.entry_price) / position.entry_price * Decimal::ONE_HUNDRED
        };

        let outcome = match exit_reason {
            ExitReason::TargetHit => TradeOutcome::Win,
            ExitReason::StopHit => TradeOutcome::Loss,
            // 강제 청산: 진입가 대비 방향으로 분류
            ExitReason::EndOfData => {
                if exit_price >= position.entry_price {
                    TradeOutcome::Win
                } else {
                    TradeOutcome::Loss
                }
            }
        };

        Self {
            entry_timestamp: position.entry_timestamp,
            exit_timestamp,
            entry_price: position.entry_price,
            exit_price,
            amount: position.amount,
            score_at_entry: position.score_at_entry,
            pnl_absolute,
            pnl_percent,
            outcome,
            exit_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position() -> OpenPosition {
        OpenPosition {
            entry_price: dec!(100),
            target_price: dec!(104),
            stop_loss: dec!(97),
            amount: dec!(2),
            entry_timestamp: 1_000,
            score_at_entry: 120,
        }
    }

    #[test]
    fn test_target_close_is_win() {
        let trade = Trade::from_close(&position(), dec!(104.5), 2_000, ExitReason::TargetHit);
        assert_eq!(trade.outcome, TradeOutcome::Win);
        assert_eq!(trade.pnl_absolute, dec!(9.0));
        assert_eq!(trade.pnl_percent, dec!(4.5));
    }

    #[test]
    fn test_stop_close_is_loss() {
        let trade = Trade::from_close(&position(), dec!(96.5), 2_000, ExitReason::StopHit);
        assert_eq!(trade.outcome, TradeOutcome::Loss);
        assert!(trade.pnl_absolute < Decimal::ZERO);
    }

    #[test]
    fn test_end_of_data_classified_by_direction() {
        let above = Trade::from_close(&position(), dec!(101), 2_000, ExitReason::EndOfData);
        assert_eq!(above.outcome, TradeOutcome::Win);

        let below = Trade::from_close(&position(), dec!(99), 2_000, ExitReason::EndOfData);
        assert_eq!(below.outcome, TradeOutcome::Loss);
    }

    #[test]
    fn test_default_state_is_flat() {
        assert!(!PositionState::default().is_open());
    }
}
