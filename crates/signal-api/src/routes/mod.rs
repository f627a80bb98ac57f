//! API 라우트 모듈.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub mod alerts;
pub mod backtest;
pub mod favorites;
pub mod portfolio;
pub mod signals;

/// 헬스 체크.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// 전체 API 라우터 조립.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(backtest::router())
        .merge(signals::router())
        .merge(favorites::router())
        .merge(portfolio::router())
        .merge(alerts::router())
}
