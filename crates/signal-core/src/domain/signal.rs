//! 체크리스트 점수 기반 매매 시그널.
//!
//! 이 모듈은 대시보드에 노출되는 시그널 타입을 정의합니다:
//! - `SignalAction` - 점수에서 유도되는 매수/보유/매도 액션
//! - `ScoreSnapshot` - 코인별 현재 점수 스냅샷

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 체크리스트 점수가 가리키는 매매 액션.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "ts-rs-support", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts-rs-support", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    /// 강력 매수 (점수 110 이상)
    StrongBuy,
    /// 매수 (점수 90 이상)
    Buy,
    /// 보유 (점수 60 이상)
    Hold,
    /// 매도 (점수 45 이상)
    Sell,
    /// 강력 매도 (점수 45 미만)
    StrongSell,
}

impl SignalAction {
    /// 체크리스트 점수에서 액션을 유도합니다.
    ///
    /// 기준점 70점(점수 시뮬레이터의 베이스)이 Hold 중앙에 오도록
    /// 구간을 배치했습니다.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 110 => SignalAction::StrongBuy,
            s if s >= 90 => SignalAction::Buy,
            s if s >= 60 => SignalAction::Hold,
            s if s >= 45 => SignalAction::Sell,
            _ => SignalAction::StrongSell,
        }
    }

    /// 매수 방향 액션 여부.
    pub fn is_bullish(&self) -> bool {
        matches!(self, SignalAction::StrongBuy | SignalAction::Buy)
    }
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalAction::StrongBuy => write!(f, "STRONG_BUY"),
            SignalAction::Buy => write!(f, "BUY"),
            SignalAction::Hold => write!(f, "HOLD"),
            SignalAction::Sell => write!(f, "SELL"),
            SignalAction::StrongSell => write!(f, "STRONG_SELL"),
        }
    }
}

/// 코인별 현재 점수 스냅샷.
///
/// 대시보드 카드와 알림 메시지가 공유하는 단위입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "ts-rs-support", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts-rs-support", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ScoreSnapshot {
    /// 코인 식별자 (예: "bitcoin")
    pub coin: String,
    /// 체크리스트 점수 (40 ~ 140)
    pub score: i32,
    /// 유도된 매매 액션
    pub action: SignalAction,
    /// 점수 계산 시점의 가격
    #[cfg_attr(feature = "ts-rs-support", ts(type = "string"))]
    pub price: Decimal,
    /// 계산 시각
    pub computed_at: DateTime<Utc>,
}

impl ScoreSnapshot {
    /// 점수에서 스냅샷을 생성합니다 (액션 자동 유도).
    pub fn new(coin: impl Into<String>, score: i32, price: Decimal) -> Self {
        Self {
            coin: coin.into(),
            score,
            action: SignalAction::from_score(score),
            price,
            computed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_boundaries() {
        assert_eq!(SignalAction::from_score(140), SignalAction::StrongBuy);
        assert_eq!(SignalAction::from_score(110), SignalAction::StrongBuy);
        assert_eq!(SignalAction::from_score(109), SignalAction::Buy);
        assert_eq!(SignalAction::from_score(90), SignalAction::Buy);
        assert_eq!(SignalAction::from_score(70), SignalAction::Hold);
        assert_eq!(SignalAction::from_score(59), SignalAction::Sell);
        assert_eq!(SignalAction::from_score(44), SignalAction::StrongSell);
        assert_eq!(SignalAction::from_score(40), SignalAction::StrongSell);
    }

    #[test]
    fn test_bullish() {
        assert!(SignalAction::Buy.is_bullish());
        assert!(!SignalAction::Hold.is_bullish());
    }
}
