//! 시그널 점수 API 라우트.
//!
//! 코인별 현재 체크리스트 점수와 매수/보유/매도 액션을 계산합니다.
//! 대시보드 카드(단건)와 워치리스트(배치) 양쪽에서 사용합니다.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use utoipa::{IntoParams, ToSchema};

use signal_core::{checklist_score, PricePoint, RandomPerturbation, ScoreSnapshot};

use crate::error::{bad_request, internal, upstream, ApiResult};
use crate::state::AppState;

/// 배치 요청당 최대 코인 수.
const MAX_BATCH_COINS: usize = 50;

// ==================== Request/Response 타입 ====================

/// 단건 점수 조회 쿼리.
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreQuery {
    /// 점수 계산에 사용할 lookback (일, 기본 30)
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    30
}

/// 배치 점수 응답.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchScoreResponse {
    /// 계산 성공한 스냅샷
    pub snapshots: Vec<ScoreSnapshot>,
    /// 조회/계산에 실패한 코인
    pub failed: Vec<String>,
}

// ==================== 점수 계산 ====================

/// 가격 이력에서 점수 스냅샷을 계산합니다.
///
/// 이력이 1포인트뿐이면 직전 가격을 현재 가격으로 간주합니다
/// (변화율 0). 빈 이력은 None.
fn snapshot_from_history(coin: &str, history: &[PricePoint]) -> Option<ScoreSnapshot> {
    let current = history.last()?;
    let previous = if history.len() >= 2 {
        history[history.len() - 2].price
    } else {
        current.price
    };

    let prices: Vec<Decimal> = history.iter().map(|p| p.price).collect();
    let mut perturbation = RandomPerturbation::thread_local();
    let score = checklist_score(current.price, previous, &prices, &mut perturbation);

    Some(ScoreSnapshot::new(coin, score, current.price))
}

// ==================== 핸들러 ====================

/// 코인의 현재 점수 조회.
#[utoipa::path(
    get,
    path = "/api/signals/{coin}",
    tag = "signals",
    params(
        ("coin" = String, Path, description = "코인 식별자"),
        ScoreQuery,
    ),
    responses(
        (status = 200, description = "점수 스냅샷", body = ScoreSnapshot),
        (status = 404, description = "알 수 없는 코인"),
        (status = 500, description = "업스트림 시세 조회 실패"),
    )
)]
pub async fn get_score(
    State(state): State<AppState>,
    Path(coin): Path<String>,
    Query(query): Query<ScoreQuery>,
) -> ApiResult<ScoreSnapshot> {
    let history = state
        .market
        .price_history(&coin, query.days)
        .await
        .map_err(upstream)?;

    let snapshot = snapshot_from_history(&coin, &history)
        .ok_or_else(|| internal("시세 데이터가 비어 있습니다"))?;

    debug!(coin = %coin, score = snapshot.score, action = %snapshot.action, "점수 계산 완료");
    Ok(Json(snapshot))
}

/// 여러 코인의 점수를 한 번에 조회.
///
/// 본문은 `{ "coins": ["bitcoin", "ethereum"] }` 형태여야 하며,
/// `coins`가 배열이 아니거나 비어 있으면 시뮬레이션 작업 없이
/// 400으로 거부됩니다. 개별 코인의 조회 실패는 `failed` 목록에
/// 담기고 나머지 코인 처리는 계속됩니다.
#[utoipa::path(
    post,
    path = "/api/signals/batch",
    tag = "signals",
    responses(
        (status = 200, description = "배치 점수", body = BatchScoreResponse),
        (status = 400, description = "coins 필드가 배열이 아니거나 비어 있음"),
    )
)]
pub async fn batch_scores(
    State(state): State<AppState>,
    Json(body): Json<JsonValue>,
) -> ApiResult<BatchScoreResponse> {
    let coins = body
        .get("coins")
        .and_then(|v| v.as_array())
        .ok_or_else(|| bad_request("coins 필드는 배열이어야 합니다"))?;

    if coins.is_empty() {
        return Err(bad_request("coins 배열이 비어 있습니다"));
    }
    if coins.len() > MAX_BATCH_COINS {
        return Err(bad_request(format!(
            "coins는 최대 {}개까지 허용됩니다",
            MAX_BATCH_COINS
        )));
    }

    let mut snapshots = Vec::with_capacity(coins.len());
    let mut failed = Vec::new();

    for coin_value in coins {
        let Some(coin) = coin_value.as_str() else {
            return Err(bad_request("coins 배열 원소는 문자열이어야 합니다"));
        };

        match state.market.price_history(coin, default_days()).await {
            Ok(history) => match snapshot_from_history(coin, &history) {
                Some(snapshot) => snapshots.push(snapshot),
                None => {
                    warn!(coin = coin, "시세 데이터 없음, 배치에서 제외");
                    failed.push(coin.to_string());
                }
            },
            Err(e) => {
                warn!(coin = coin, error = %e, "배치 점수 조회 실패, 제외");
                failed.push(coin.to_string());
            }
        }
    }

    Ok(Json(BatchScoreResponse { snapshots, failed }))
}

/// 시그널 라우터.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/signals/batch", post(batch_scores))
        .route("/api/signals/{coin}", get(get_score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_snapshot_from_empty_history() {
        assert!(snapshot_from_history("bitcoin", &[]).is_none());
    }

    #[test]
    fn test_snapshot_single_point_uses_zero_change() {
        let history = [PricePoint::new(0, dec!(42000))];
        let snapshot = snapshot_from_history("bitcoin", &history).unwrap();

        assert_eq!(snapshot.coin, "bitcoin");
        assert_eq!(snapshot.price, dec!(42000));
        assert!((40..=140).contains(&snapshot.score));
    }
}
