//! 포트폴리오 API 라우트.
//!
//! 사용자 보유 내역 CRUD와 시세 공급자를 통한 평가액 계산을
//! 제공합니다. 개별 코인의 시세 조회 실패는 해당 포지션의
//! 평가액을 비워둘 뿐 전체 응답을 실패시키지 않습니다.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::warn;
use utoipa::ToSchema;

use crate::error::{bad_request, database, ApiResult};
use crate::repository::{AuditRepository, PortfolioPosition, PortfolioRepository, UpsertPosition};
use crate::routes::favorites::UserQuery;
use crate::state::AppState;

// ==================== Response 타입 ====================

/// 평가액이 붙은 보유 포지션.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValuedPosition {
    /// 보유 내역 원본
    #[serde(flatten)]
    pub position: PortfolioPosition,
    /// 현재 가격 (시세 조회 실패 시 None)
    #[schema(value_type = Option<f64>)]
    pub current_price: Option<Decimal>,
    /// 평가액 (`amount × current_price`)
    #[schema(value_type = Option<f64>)]
    pub market_value: Option<Decimal>,
    /// 평가 손익
    #[schema(value_type = Option<f64>)]
    pub unrealized_pnl: Option<Decimal>,
    /// 평가 손익률 (%)
    #[schema(value_type = Option<f64>)]
    pub unrealized_pnl_pct: Option<Decimal>,
}

/// 포트폴리오 평가 응답.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    pub positions: Vec<ValuedPosition>,
    /// 평가 가능한 포지션들의 평가액 합
    #[schema(value_type = f64)]
    pub total_value: Decimal,
    /// 취득 원가 합 (`amount × avg_buy_price`)
    #[schema(value_type = f64)]
    pub total_cost: Decimal,
}

// ==================== 핸들러 ====================

/// 포트폴리오 조회 (평가액 포함).
#[utoipa::path(
    get,
    path = "/api/portfolio",
    tag = "portfolio",
    params(UserQuery),
    responses((status = 200, description = "평가된 포트폴리오", body = PortfolioResponse))
)]
pub async fn get_portfolio(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<PortfolioResponse> {
    let positions = PortfolioRepository::list(&state.db, &query.user_id)
        .await
        .map_err(database)?;

    let mut valued = Vec::with_capacity(positions.len());
    let mut total_value = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;

    for position in positions {
        total_cost += position.amount * position.avg_buy_price;

        let priced = match state.market.current_price(&position.coin).await {
            Ok(price) => {
                let market_value = position.amount * price;
                let cost = position.amount * position.avg_buy_price;
                let pnl = market_value - cost;
                let pnl_pct = if cost.is_zero() {
                    Decimal::ZERO
                } else {
                    pnl / cost * Decimal::ONE_HUNDRED
                };
                total_value += market_value;

                ValuedPosition {
                    position,
                    current_price: Some(price),
                    market_value: Some(market_value),
                    unrealized_pnl: Some(pnl),
                    unrealized_pnl_pct: Some(pnl_pct),
                }
            }
            Err(e) => {
                warn!(coin = %position.coin, error = %e, "시세 조회 실패, 평가액 생략");
                ValuedPosition {
                    position,
                    current_price: None,
                    market_value: None,
                    unrealized_pnl: None,
                    unrealized_pnl_pct: None,
                }
            }
        };
        valued.push(priced);
    }

    Ok(Json(PortfolioResponse {
        positions: valued,
        total_value,
        total_cost,
    }))
}

/// 보유 포지션 추가/수정.
#[utoipa::path(
    post,
    path = "/api/portfolio",
    tag = "portfolio",
    request_body = UpsertPosition,
    responses(
        (status = 200, description = "저장된 포지션", body = PortfolioPosition),
        (status = 400, description = "잘못된 수량/가격"),
    )
)]
pub async fn upsert_position(
    State(state): State<AppState>,
    Json(request): Json<UpsertPosition>,
) -> ApiResult<PortfolioPosition> {
    if request.amount <= Decimal::ZERO {
        return Err(bad_request("amount는 0보다 커야 합니다"));
    }
    if request.avg_buy_price <= Decimal::ZERO {
        return Err(bad_request("avgBuyPrice는 0보다 커야 합니다"));
    }

    let position = PortfolioRepository::upsert(&state.db, &request)
        .await
        .map_err(database)?;

    AuditRepository::record(
        &state.db,
        &request.user_id,
        "portfolio.upsert",
        json!({ "coin": request.coin, "amount": request.amount }),
    )
    .await;

    Ok(Json(position))
}

/// 보유 포지션 삭제.
#[utoipa::path(
    delete,
    path = "/api/portfolio/{coin}",
    tag = "portfolio",
    params(
        ("coin" = String, Path, description = "코인 식별자"),
        UserQuery,
    ),
    responses((status = 200, description = "삭제 결과"))
)]
pub async fn remove_position(
    State(state): State<AppState>,
    Path(coin): Path<String>,
    Query(query): Query<UserQuery>,
) -> ApiResult<serde_json::Value> {
    let removed = PortfolioRepository::remove(&state.db, &query.user_id, &coin)
        .await
        .map_err(database)?;

    AuditRepository::record(
        &state.db,
        &query.user_id,
        "portfolio.remove",
        json!({ "coin": coin, "removed": removed }),
    )
    .await;

    Ok(Json(json!({ "removed": removed })))
}

/// 포트폴리오 라우터.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/portfolio", get(get_portfolio).post(upsert_position))
        .route("/api/portfolio/{coin}", delete(remove_position))
}
