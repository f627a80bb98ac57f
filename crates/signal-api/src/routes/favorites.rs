//! 즐겨찾기 API 라우트.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::error::{bad_request, database, ApiResult};
use crate::repository::{AuditRepository, Favorite, FavoritesRepository};
use crate::state::AppState;

// ==================== Request/Response 타입 ====================

/// 사용자 식별 쿼리.
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    /// 사용자 ID
    pub user_id: String,
}

/// 즐겨찾기 추가/삭제 요청.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub user_id: String,
    pub coin: String,
}

/// 즐겨찾기 목록 응답.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesResponse {
    pub favorites: Vec<Favorite>,
}

// ==================== 핸들러 ====================

/// 즐겨찾기 목록 조회.
#[utoipa::path(
    get,
    path = "/api/favorites",
    tag = "favorites",
    params(UserQuery),
    responses((status = 200, description = "즐겨찾기 목록", body = FavoritesResponse))
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<FavoritesResponse> {
    let favorites = FavoritesRepository::list(&state.db, &query.user_id)
        .await
        .map_err(database)?;

    Ok(Json(FavoritesResponse { favorites }))
}

/// 즐겨찾기 추가.
#[utoipa::path(
    post,
    path = "/api/favorites",
    tag = "favorites",
    request_body = FavoriteRequest,
    responses((status = 200, description = "추가된 즐겨찾기", body = Favorite))
)]
pub async fn add_favorite(
    State(state): State<AppState>,
    Json(request): Json<FavoriteRequest>,
) -> ApiResult<Favorite> {
    if request.coin.trim().is_empty() {
        return Err(bad_request("coin이 비어 있습니다"));
    }

    let favorite = FavoritesRepository::upsert(&state.db, &request.user_id, &request.coin)
        .await
        .map_err(database)?;

    AuditRepository::record(
        &state.db,
        &request.user_id,
        "favorite.add",
        json!({ "coin": request.coin }),
    )
    .await;

    Ok(Json(favorite))
}

/// 즐겨찾기 삭제.
#[utoipa::path(
    delete,
    path = "/api/favorites",
    tag = "favorites",
    request_body = FavoriteRequest,
    responses((status = 200, description = "삭제 결과"))
)]
pub async fn remove_favorite(
    State(state): State<AppState>,
    Json(request): Json<FavoriteRequest>,
) -> ApiResult<serde_json::Value> {
    let removed = FavoritesRepository::remove(&state.db, &request.user_id, &request.coin)
        .await
        .map_err(database)?;

    AuditRepository::record(
        &state.db,
        &request.user_id,
        "favorite.remove",
        json!({ "coin": request.coin, "removed": removed }),
    )
    .await;

    Ok(Json(json!({ "removed": removed })))
}

/// 즐겨찾기 라우터.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/favorites",
        get(list_favorites).post(add_favorite).delete(remove_favorite),
    )
}
