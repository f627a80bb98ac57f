//! 알림 규칙/이력 API 라우트.
//!
//! 사용자 알림 규칙 CRUD와 발송 이력 조회를 제공합니다.
//! 규칙의 실제 평가와 발송은 워처 데몬(`signal-watcher`)이
//! 수행합니다.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use signal_core::{SCORE_MAX, SCORE_MIN};

use crate::error::{bad_request, database, not_found, ApiResult};
use crate::repository::{
    AlertDirection, AlertHistoryEntry, AlertHistoryRepository, AlertRule, AlertRulesRepository,
    AuditRepository, CreateAlertRule, UpdateAlertRule,
};
use crate::routes::favorites::UserQuery;
use crate::state::AppState;

/// 지원 알림 채널.
const SUPPORTED_CHANNELS: &[&str] = &["telegram", "webhook"];

// ==================== Request/Response 타입 ====================

/// 알림 규칙 목록 응답.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertRulesResponse {
    pub rules: Vec<AlertRule>,
}

/// 알림 이력 조회 쿼리.
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    /// 최대 결과 개수 (기본 50)
    #[serde(default = "default_history_limit")]
    pub limit: i64,
    /// 특정 규칙으로 필터 (선택)
    #[serde(default)]
    pub rule_id: Option<Uuid>,
}

fn default_history_limit() -> i64 {
    50
}

/// 알림 이력 응답.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertHistoryResponse {
    pub alerts: Vec<AlertHistoryEntry>,
}

// ==================== 검증 헬퍼 ====================

fn validate_threshold(threshold: i32) -> Result<(), String> {
    if (SCORE_MIN..=SCORE_MAX).contains(&threshold) {
        Ok(())
    } else {
        Err(format!(
            "threshold는 {} ~ {} 범위여야 합니다",
            SCORE_MIN, SCORE_MAX
        ))
    }
}

fn validate_direction(direction: &str) -> Result<(), String> {
    direction.parse::<AlertDirection>().map(|_| ())
}

// ==================== 핸들러 ====================

/// 사용자의 알림 규칙 목록 조회.
#[utoipa::path(
    get,
    path = "/api/alerts/rules",
    tag = "alerts",
    params(UserQuery),
    responses((status = 200, description = "알림 규칙 목록", body = AlertRulesResponse))
)]
pub async fn list_rules(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<AlertRulesResponse> {
    let rules = AlertRulesRepository::list_by_user(&state.db, &query.user_id)
        .await
        .map_err(database)?;

    Ok(Json(AlertRulesResponse { rules }))
}

/// 알림 규칙 생성.
#[utoipa::path(
    post,
    path = "/api/alerts/rules",
    tag = "alerts",
    request_body = CreateAlertRule,
    responses(
        (status = 200, description = "생성된 규칙", body = AlertRule),
        (status = 400, description = "잘못된 임계값/방향/채널"),
    )
)]
pub async fn create_rule(
    State(state): State<AppState>,
    Json(request): Json<CreateAlertRule>,
) -> ApiResult<AlertRule> {
    validate_threshold(request.threshold).map_err(bad_request)?;
    validate_direction(&request.direction).map_err(bad_request)?;
    if !SUPPORTED_CHANNELS.contains(&request.channel.as_str()) {
        return Err(bad_request(format!(
            "지원하지 않는 채널: {} (telegram | webhook)",
            request.channel
        )));
    }
    if request.coin.trim().is_empty() {
        return Err(bad_request("coin이 비어 있습니다"));
    }

    let rule = AlertRulesRepository::create(&state.db, &request)
        .await
        .map_err(database)?;

    AuditRepository::record(
        &state.db,
        &request.user_id,
        "alert_rule.create",
        json!({ "rule_id": rule.id, "coin": rule.coin, "threshold": rule.threshold }),
    )
    .await;

    Ok(Json(rule))
}

/// 알림 규칙 부분 수정.
#[utoipa::path(
    patch,
    path = "/api/alerts/rules/{id}",
    tag = "alerts",
    params(("id" = Uuid, Path, description = "규칙 ID")),
    request_body = UpdateAlertRule,
    responses(
        (status = 200, description = "수정된 규칙", body = AlertRule),
        (status = 404, description = "규칙 없음"),
    )
)]
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAlertRule>,
) -> ApiResult<AlertRule> {
    if let Some(threshold) = request.threshold {
        validate_threshold(threshold).map_err(bad_request)?;
    }
    if let Some(direction) = &request.direction {
        validate_direction(direction).map_err(bad_request)?;
    }

    let rule = AlertRulesRepository::update(&state.db, id, &request)
        .await
        .map_err(database)?
        .ok_or_else(|| not_found("알림 규칙을 찾을 수 없습니다"))?;

    AuditRepository::record(
        &state.db,
        &rule.user_id,
        "alert_rule.update",
        json!({ "rule_id": rule.id }),
    )
    .await;

    Ok(Json(rule))
}

/// 알림 규칙 삭제.
#[utoipa::path(
    delete,
    path = "/api/alerts/rules/{id}",
    tag = "alerts",
    params(("id" = Uuid, Path, description = "규칙 ID")),
    responses(
        (status = 200, description = "삭제 결과"),
        (status = 404, description = "규칙 없음"),
    )
)]
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let rule = AlertRulesRepository::get_by_id(&state.db, id)
        .await
        .map_err(database)?
        .ok_or_else(|| not_found("알림 규칙을 찾을 수 없습니다"))?;

    let removed = AlertRulesRepository::delete(&state.db, id)
        .await
        .map_err(database)?;

    AuditRepository::record(
        &state.db,
        &rule.user_id,
        "alert_rule.delete",
        json!({ "rule_id": id, "coin": rule.coin }),
    )
    .await;

    Ok(Json(json!({ "removed": removed })))
}

/// 알림 발송 이력 조회.
#[utoipa::path(
    get,
    path = "/api/alerts/history",
    tag = "alerts",
    params(HistoryQuery),
    responses((status = 200, description = "알림 이력", body = AlertHistoryResponse))
)]
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<AlertHistoryResponse> {
    let limit = query.limit.clamp(1, 500);

    let alerts = match query.rule_id {
        Some(rule_id) => AlertHistoryRepository::by_rule(&state.db, rule_id, limit)
            .await
            .map_err(database)?,
        None => AlertHistoryRepository::recent(&state.db, limit)
            .await
            .map_err(database)?,
    };

    Ok(Json(AlertHistoryResponse { alerts }))
}

/// 알림 라우터.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/alerts/rules", get(list_rules).post(create_rule))
        .route(
            "/api/alerts/rules/{id}",
            axum::routing::patch(update_rule).delete(delete_rule),
        )
        .route("/api/alerts/history", get(get_history))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_validation() {
        assert!(validate_threshold(40).is_ok());
        assert!(validate_threshold(140).is_ok());
        assert!(validate_threshold(39).is_err());
        assert!(validate_threshold(141).is_err());
    }

    #[test]
    fn test_direction_validation() {
        assert!(validate_direction("above").is_ok());
        assert!(validate_direction("BELOW").is_ok());
        assert!(validate_direction("sideways").is_err());
    }
}
