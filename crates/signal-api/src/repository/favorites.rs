//! 즐겨찾기 Repository.
//!
//! 사용자별 관심 코인 목록을 관리합니다 (flat upsert/select).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use ts_rs::TS;
use utoipa::ToSchema;

/// 즐겨찾기 엔티티.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export, export_to = "favorites/")]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub user_id: String,
    pub coin: String,
    pub created_at: DateTime<Utc>,
}

/// 즐겨찾기 Repository.
pub struct FavoritesRepository;

impl FavoritesRepository {
    /// 사용자의 즐겨찾기 목록 조회.
    pub async fn list(pool: &PgPool, user_id: &str) -> Result<Vec<Favorite>, sqlx::Error> {
        sqlx::query_as::<_, Favorite>(
            r#"
            SELECT * FROM favorites
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// 즐겨찾기 추가 (이미 있으면 기존 행 유지).
    pub async fn upsert(
        pool: &PgPool,
        user_id: &str,
        coin: &str,
    ) -> Result<Favorite, sqlx::Error> {
        let favorite = sqlx::query_as::<_, Favorite>(
            r#"
            INSERT INTO favorites (user_id, coin)
            VALUES ($1, $2)
            ON CONFLICT (user_id, coin) DO UPDATE SET coin = EXCLUDED.coin
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(coin)
        .fetch_one(pool)
        .await?;

        debug!(user_id = user_id, coin = coin, "즐겨찾기 추가");
        Ok(favorite)
    }

    /// 즐겨찾기 제거.
    pub async fn remove(pool: &PgPool, user_id: &str, coin: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM favorites
            WHERE user_id = $1 AND coin = $2
            "#,
        )
        .bind(user_id)
        .bind(coin)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
