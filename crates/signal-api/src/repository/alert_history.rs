//! 알림 발송 이력 Repository.
//!
//! 워처가 발송한(또는 실패한) 알림 기록을 관리합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// 알림 이력 엔티티.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export, export_to = "alerts/")]
#[serde(rename_all = "camelCase")]
pub struct AlertHistoryEntry {
    pub id: Uuid,
    pub rule_id: Option<Uuid>,
    pub coin: String,
    /// 발송 시점 점수
    pub score: i32,
    /// 유도된 액션 ("BUY" 등)
    pub action: String,
    pub channel: String,
    /// "SENT" | "FAILED"
    pub status: String,
    pub message: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 알림 이력 생성 값.
#[derive(Debug, Clone)]
pub struct NewAlertHistory {
    pub rule_id: Option<Uuid>,
    pub coin: String,
    pub score: i32,
    pub action: String,
    pub channel: String,
    pub status: String,
    pub message: String,
    pub error_message: Option<String>,
}

/// 알림 이력 Repository.
pub struct AlertHistoryRepository;

impl AlertHistoryRepository {
    /// 이력 행 추가.
    pub async fn insert(
        pool: &PgPool,
        entry: &NewAlertHistory,
    ) -> Result<AlertHistoryEntry, sqlx::Error> {
        let row = sqlx::query_as::<_, AlertHistoryEntry>(
            r#"
            INSERT INTO alert_history (
                rule_id, coin, score, action, channel, status, message, error_message
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(entry.rule_id)
        .bind(&entry.coin)
        .bind(entry.score)
        .bind(&entry.action)
        .bind(&entry.channel)
        .bind(&entry.status)
        .bind(&entry.message)
        .bind(&entry.error_message)
        .fetch_one(pool)
        .await?;

        debug!(history_id = %row.id, coin = %row.coin, status = %row.status, "알림 이력 기록");
        Ok(row)
    }

    /// 최근 이력 조회.
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<AlertHistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, AlertHistoryEntry>(
            r#"
            SELECT * FROM alert_history
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// 특정 규칙의 이력 조회.
    pub async fn by_rule(
        pool: &PgPool,
        rule_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AlertHistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, AlertHistoryEntry>(
            r#"
            SELECT * FROM alert_history
            WHERE rule_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(rule_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
