//! 백테스트 API 라우트.
//!
//! 과거 시세를 조회해 체크리스트 점수 전략 시뮬레이션을 실행하고
//! 요약/거래/자산곡선/월별 수익률을 반환합니다.
//!
//! # 흐름
//!
//! 검증 → 시세 조회 (실패 시 시뮬레이션 없이 종료) →
//! 타임프레임 리샘플링 → 엔진 실행 → 직렬화 경계에서 절단
//! (최근 거래 50건, 자산 곡선 ~100 포인트)

use axum::{extract::State, routing::post, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;
use validator::Validate;

use signal_core::{RandomPerturbation, Timeframe};
use signal_engine::{
    downsample_equity, resample, BacktestConfig, BacktestEngine, BacktestSummary, EquityPoint,
    MonthlyReturn, Trade,
};

use crate::error::{bad_request, internal, upstream, ApiResult};
use crate::state::AppState;

/// 응답에 포함할 최대 거래 수 (최근 순).
const MAX_TRADES_IN_RESPONSE: usize = 50;
/// 응답 자산 곡선의 목표 포인트 수.
const EQUITY_CURVE_TARGET_POINTS: usize = 100;

// ==================== Request/Response 타입 ====================

/// 백테스트 실행 요청.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    /// 코인 식별자 (예: "bitcoin")
    #[validate(length(min = 1, max = 64))]
    pub symbol: String,

    /// 조회 기간 (일)
    #[serde(default = "default_days")]
    #[validate(range(min = 1, max = 365))]
    pub days: u32,

    /// 타임프레임 ("15m" | "1h" | "4h" | "1d")
    #[serde(default = "default_timeframe")]
    pub timeframe: String,

    /// 초기 자본
    #[serde(default = "default_initial_capital")]
    #[schema(value_type = f64)]
    pub initial_capital: Decimal,

    /// 진입 점수 임계값
    #[serde(default = "default_entry_threshold")]
    #[validate(range(min = 40, max = 140))]
    pub entry_threshold: i32,

    /// 진입 시 투자 비율 (%)
    #[serde(default = "default_investment_ratio")]
    #[schema(value_type = f64)]
    pub investment_ratio: Decimal,

    /// 목표가 배수
    #[serde(default = "default_target_multiplier")]
    #[schema(value_type = f64)]
    pub target_multiplier: Decimal,

    /// 손절가 배수
    #[serde(default = "default_stop_loss_multiplier")]
    #[schema(value_type = f64)]
    pub stop_loss_multiplier: Decimal,
}

fn default_days() -> u32 {
    30
}
fn default_timeframe() -> String {
    "1h".to_string()
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
}
fn default_stop_loss_multiplier() -> Decimal {
    Decimal::new(97, 2)
}

/// 백테스트 실행 응답.
///
/// 전체 원장은 서버 내부에서 집계에 사용되고, 응답에는
/// 표시용으로 절단된 목록만 담깁니다.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResponse {
    /// 요약 지표 (전체 원장 기준으로 계산됨)
    pub summary: BacktestSummary,
    /// 최근 거래 (최대 50건, 시간순)
    pub trades: Vec<Trade>,
    /// 다운샘플링된 자산 곡선 (~100 포인트)
    pub equity_curve: Vec<EquityPoint>,
    /// 월별 수익률
    pub monthly_returns: Vec<MonthlyReturn>,
    /// 시뮬레이션에 투입된 가격 포인트 수
    pub data_points: usize,
}

// ==================== 핸들러 ====================

/// 백테스트 실행.
#[utoipa::path(
    post,
    path = "/api/backtest",
    tag = "backtest",
    request_body = BacktestRequest,
    responses(
        (status = 200, description = "백테스트 결과", body = BacktestResponse),
        (status = 400, description = "잘못된 요청 파라미터"),
        (status = 404, description = "알 수 없는 코인"),
        (status = 500, description = "업스트림 시세 조회 실패"),
    )
)]
pub async fn run_backtest(
    State(state): State<AppState>,
    Json(request): Json<BacktestRequest>,
) -> ApiResult<BacktestResponse> {
    // 시뮬레이션 작업 전에 요청을 거부 (MalformedInput 정책)
    request
        .validate()
        .map_err(|e| bad_request(e.to_string()))?;

    let timeframe: Timeframe = request
        .timeframe
        .parse()
        .map_err(|e: String| bad_request(e))?;

    let config = BacktestConfig::new(request.initial_capital)
        .with_entry_threshold(request.entry_threshold)
        .with_investment_ratio(request.investment_ratio)
        .with_multipliers(request.target_multiplier, request.stop_loss_multiplier)
        .with_timeframe(timeframe);
    config.validate().map_err(|e| bad_request(e.to_string()))?;

    // 시세 조회는 시뮬레이션 루프 시작 전 단 한 번 — 실패 시 부분 결과 없음
    let raw_prices = state
        .market
        .price_history(&request.symbol, request.days)
        .await
        .map_err(upstream)?;

    let prices = match timeframe.bucket_hours() {
        Some(hours) => resample(&raw_prices, hours),
        None => raw_prices,
    };

    debug!(
        symbol = %request.symbol,
        timeframe = %timeframe,
        points = prices.len(),
        "백테스트 시작"
    );

    let engine = BacktestEngine::new(config);
    let mut perturbation = RandomPerturbation::thread_local();
    let report = engine
        .run(&prices, &mut perturbation)
        .map_err(|e| internal(e.to_string()))?;

    info!(
        symbol = %request.symbol,
        trades = report.trades.len(),
        total_return_pct = %report.summary.total_return_pct,
        "백테스트 완료"
    );

    Ok(Json(BacktestResponse {
        summary: report.summary,
        trades: truncate_recent(report.trades, MAX_TRADES_IN_RESPONSE),
        equity_curve: downsample_equity(&report.equity_curve, EQUITY_CURVE_TARGET_POINTS),
        monthly_returns: report.monthly_returns,
        data_points: report.data_points,
    }))
}

/// 최근 `limit`건만 남깁니다 (시간순 유지).
fn truncate_recent(trades: Vec<Trade>, limit: usize) -> Vec<Trade> {
    if trades.len() <= limit {
        return trades;
    }
    let start = trades.len() - limit;
    trades[start..].to_vec()
}

/// 백테스트 라우터.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/backtest", post(run_backtest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use signal_engine::{ExitReason, TradeOutcome};

    fn trade(i: i64) -> Trade {
        Trade {
            entry_timestamp: i,
            exit_timestamp: i + 1,
            entry_price: dec!(100),
            exit_price: dec!(104),
            amount: dec!(1),
            score_at_entry: 110,
            pnl_absolute: dec!(4),
            pnl_percent: dec!(4),
            outcome: TradeOutcome::Win,
            exit_reason: ExitReason::TargetHit,
        }
    }

    #[test]
    fn test_truncate_keeps_most_recent_in_order() {
        let trades: Vec<Trade> = (0..80).map(trade).collect();
        let truncated = truncate_recent(trades, 50);

        assert_eq!(truncated.len(), 50);
        assert_eq!(truncated.first().unwrap().entry_timestamp, 30);
        assert_eq!(truncated.last().unwrap().entry_timestamp, 79);
    }

    #[test]
    fn test_truncate_short_list_untouched() {
        let trades: Vec<Trade> = (0..10).map(trade).collect();
        assert_eq!(truncate_recent(trades, 50).len(), 10);
    }

    #[test]
    fn test_request_validation_bounds() {
        let request = BacktestRequest {
            symbol: "bitcoin".to_string(),
            days: 400,
            timeframe: "1h".to_string(),
            initial_capital: dec!(10000),
            entry_threshold: 105,
            investment_ratio: dec!(30),
            target_multiplier: dec!(1.05),
            stop_loss_multiplier: dec!(0.97),
        };
        assert!(request.validate().is_err());

        let request = BacktestRequest {
            days: 30,
            entry_threshold: 20,
            ..request
        };
        assert!(request.validate().is_err());
    }
}
