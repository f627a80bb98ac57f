//! 알림 규칙 Repository.
//!
//! 사용자가 설정한 점수 임계값 알림 규칙을 관리합니다.
//! 워처 데몬이 주기적으로 활성 규칙을 스윕하며, 임계값 교차
//! 감지를 위해 `last_score`를 규칙에 함께 저장합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// ================================================================================================
// Enums
// ================================================================================================

/// 알림 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "alerts/")]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    /// 점수가 임계값 이상으로 상승 교차
    Above,
    /// 점수가 임계값 이하로 하락 교차
    Below,
}

impl std::fmt::Display for AlertDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertDirection::Above => write!(f, "above"),
            AlertDirection::Below => write!(f, "below"),
        }
    }
}

impl std::str::FromStr for AlertDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "above" => Ok(AlertDirection::Above),
            "below" => Ok(AlertDirection::Below),
            _ => Err(format!("Invalid alert direction: {}", s)),
        }
    }
}

// ================================================================================================
// Entities
// ================================================================================================

/// 알림 규칙 엔티티.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, TS)]
#[ts(export, export_to = "alerts/")]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    pub id: Uuid,
    pub user_id: String,
    pub coin: String,
    /// 임계 점수 (40 ~ 140)
    pub threshold: i32,
    /// "above" | "below"
    pub direction: String,
    /// "telegram" | "webhook"
    pub channel: String,
    /// 채널별 수신 주소 (Telegram 채팅 ID, 웹훅 URL 등)
    pub target: Option<String>,
    pub enabled: bool,
    /// 직전 스윕에서 계산된 점수 (교차 감지 기준)
    pub last_score: Option<i32>,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// 알림 규칙 생성 요청.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRule {
    pub user_id: String,
    pub coin: String,
    pub threshold: i32,
    #[serde(default = "default_direction")]
    pub direction: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default)]
    pub target: Option<String>,
}

fn default_direction() -> String {
    "above".to_string()
}

fn default_channel() -> String {
    "telegram".to_string()
}

/// 알림 규칙 수정 요청 (부분 업데이트).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertRule {
    #[serde(default)]
    pub threshold: Option<i32>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

// ================================================================================================
// Repository
// ================================================================================================

/// 알림 규칙 Repository.
pub struct AlertRulesRepository;

impl AlertRulesRepository {
    /// 규칙 생성.
    pub async fn create(
        pool: &PgPool,
        request: &CreateAlertRule,
    ) -> Result<AlertRule, sqlx::Error> {
        let rule = sqlx::query_as::<_, AlertRule>(
            r#"
            INSERT INTO alert_rules (user_id, coin, threshold, direction, channel, target)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&request.user_id)
        .bind(&request.coin)
        .bind(request.threshold)
        .bind(&request.direction)
        .bind(&request.channel)
        .bind(&request.target)
        .fetch_one(pool)
        .await?;

        info!(rule_id = %rule.id, coin = %rule.coin, "알림 규칙 생성");
        Ok(rule)
    }

    /// ID로 규칙 조회.
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AlertRule>, sqlx::Error> {
        sqlx::query_as::<_, AlertRule>(r#"SELECT * FROM alert_rules WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// 사용자의 규칙 목록 조회.
    pub async fn list_by_user(pool: &PgPool, user_id: &str) -> Result<Vec<AlertRule>, sqlx::Error> {
        sqlx::query_as::<_, AlertRule>(
            r#"
            SELECT * FROM alert_rules
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// 활성 규칙 전체 조회 (워처 스윕용).
    pub async fn list_enabled(pool: &PgPool) -> Result<Vec<AlertRule>, sqlx::Error> {
        sqlx::query_as::<_, AlertRule>(
            r#"
            SELECT * FROM alert_rules
            WHERE enabled = TRUE
            ORDER BY coin ASC, created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// 규칙 부분 업데이트.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        request: &UpdateAlertRule,
    ) -> Result<Option<AlertRule>, sqlx::Error> {
        let rule = sqlx::query_as::<_, AlertRule>(
            r#"
            UPDATE alert_rules
            SET threshold = COALESCE($2, threshold),
                direction = COALESCE($3, direction),
                enabled = COALESCE($4, enabled)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.threshold)
        .bind(&request.direction)
        .bind(request.enabled)
        .fetch_optional(pool)
        .await?;

        if rule.is_some() {
            debug!(rule_id = %id, "알림 규칙 업데이트");
        }
        Ok(rule)
    }

    /// 규칙 삭제.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM alert_rules WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// 스윕 결과 기록: 마지막 점수와 (발화 시) 발화 시각 갱신.
    pub async fn record_sweep(
        pool: &PgPool,
        id: Uuid,
        score: i32,
        triggered: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE alert_rules
            SET last_score = $2,
                last_triggered_at = CASE WHEN $3 THEN NOW() ELSE last_triggered_at END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(score)
        .bind(triggered)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
