//! OpenAPI 문서 정의.
//!
//! `/docs`에서 Swagger UI를, `/api-docs/openapi.json`에서
//! OpenAPI 스펙을 제공합니다.

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::{ApiError, ApiErrorDetail};
use crate::repository::{
    AlertDirection, AlertHistoryEntry, AlertRule, CreateAlertRule, Favorite, PortfolioPosition,
    UpdateAlertRule, UpsertPosition,
};
use crate::routes;
use signal_core::{ScoreSnapshot, SignalAction, Timeframe};
use signal_engine::{
    BacktestSummary, EquityPoint, ExitReason, MonthlyReturn, Trade, TradeOutcome,
};

/// API 문서 집계.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Coin Signal Dashboard API",
        description = "체크리스트 점수 기반 시그널 대시보드 백엔드 API"
    ),
    paths(
        routes::backtest::run_backtest,
        routes::signals::get_score,
        routes::signals::batch_scores,
        routes::favorites::list_favorites,
        routes::favorites::add_favorite,
        routes::favorites::remove_favorite,
        routes::portfolio::get_portfolio,
        routes::portfolio::upsert_position,
        routes::portfolio::remove_position,
        routes::alerts::list_rules,
        routes::alerts::create_rule,
        routes::alerts::update_rule,
        routes::alerts::delete_rule,
        routes::alerts::get_history,
    ),
    components(schemas(
        routes::backtest::BacktestRequest,
        routes::backtest::BacktestResponse,
        routes::signals::BatchScoreResponse,
        routes::favorites::FavoriteRequest,
        routes::favorites::FavoritesResponse,
        routes::portfolio::ValuedPosition,
        routes::portfolio::PortfolioResponse,
        routes::alerts::AlertRulesResponse,
        routes::alerts::AlertHistoryResponse,
        BacktestSummary,
        Trade,
        EquityPoint,
        MonthlyReturn,
        ExitReason,
        TradeOutcome,
        Timeframe,
        ScoreSnapshot,
        SignalAction,
        Favorite,
        PortfolioPosition,
        UpsertPosition,
        AlertRule,
        AlertDirection,
        CreateAlertRule,
        UpdateAlertRule,
        AlertHistoryEntry,
        ApiError,
        ApiErrorDetail,
    )),
    tags(
        (name = "backtest", description = "백테스트 시뮬레이터"),
        (name = "signals", description = "체크리스트 점수 시그널"),
        (name = "favorites", description = "즐겨찾기"),
        (name = "portfolio", description = "포트폴리오 트래커"),
        (name = "alerts", description = "알림 규칙 및 이력"),
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터.
pub fn swagger_ui_router() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
