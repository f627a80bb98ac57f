//! 포트폴리오 보유 내역 Repository.
//!
//! 사용자별 코인 보유 수량과 평균 매수가를 관리합니다.
//! 평가액 계산은 라우트 계층에서 시세 공급자로 수행합니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// 보유 포지션 엔티티.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export, export_to = "portfolio/")]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPosition {
    pub id: Uuid,
    pub user_id: String,
    pub coin: String,
    #[ts(type = "string")]
    pub amount: Decimal,
    #[ts(type = "string")]
    pub avg_buy_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 보유 포지션 upsert 요청.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPosition {
    pub user_id: String,
    pub coin: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[schema(value_type = f64)]
    pub avg_buy_price: Decimal,
}

/// 포트폴리오 Repository.
pub struct PortfolioRepository;

impl PortfolioRepository {
    /// 사용자의 보유 내역 조회.
    pub async fn list(pool: &PgPool, user_id: &str) -> Result<Vec<PortfolioPosition>, sqlx::Error> {
        sqlx::query_as::<_, PortfolioPosition>(
            r#"
            SELECT * FROM portfolio_positions
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// 보유 포지션 upsert (코인별 1행).
    pub async fn upsert(
        pool: &PgPool,
        request: &UpsertPosition,
    ) -> Result<PortfolioPosition, sqlx::Error> {
        let position = sqlx::query_as::<_, PortfolioPosition>(
            r#"
            INSERT INTO portfolio_positions (user_id, coin, amount, avg_buy_price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, coin) DO UPDATE
            SET amount = EXCLUDED.amount,
                avg_buy_price = EXCLUDED.avg_buy_price,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&request.user_id)
        .bind(&request.coin)
        .bind(request.amount)
        .bind(request.avg_buy_price)
        .fetch_one(pool)
        .await?;

        debug!(
            user_id = %request.user_id,
            coin = %request.coin,
            "포트폴리오 포지션 upsert"
        );
        Ok(position)
    }

    /// 보유 포지션 삭제.
    pub async fn remove(pool: &PgPool, user_id: &str, coin: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM portfolio_positions
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
